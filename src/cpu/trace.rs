use std::fmt;

/// CPU state captured at an opcode fetch, before the instruction runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraceEntry {
    pub cycles: u64,
    pub pc: u16,
    pub opcode: u8,
    pub mnemonic: &'static str,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub status: u8,
    pub sp: u8,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04X}  {:02X}  {:<3}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            self.pc,
            self.opcode,
            self.mnemonic,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            self.cycles
        )
    }
}
