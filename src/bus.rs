//! Shared address/data bus.
//!
//! The bus is only a register set: the CPU (or any master) posts a transaction with
//! [`Bus::read`] or [`Bus::write`], and every attached device inspects `addr`, `data` and
//! `rw_flag` when it is clocked. The bus performs no address decoding of its own, and the
//! 16-bit address / 8-bit data widths are carried by the register types.

/// Direction of the most recent bus transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadWrite {
    Read,
    Write,
}

/// Address/data/read-write register set shared by the CPU and memory-mapped devices.
#[derive(Debug, Clone)]
pub struct Bus {
    addr: u16,
    data: u8,
    rw_flag: ReadWrite,
    serial: u64,
}

impl Bus {
    pub fn new() -> Self {
        Self {
            addr: 0,
            data: 0,
            rw_flag: ReadWrite::Read,
            serial: 0,
        }
    }

    /// Post a read of `addr`. The addressed device places its byte in `data` when clocked.
    pub fn read(&mut self, addr: u16) {
        self.addr = addr;
        self.rw_flag = ReadWrite::Read;
        self.serial = self.serial.wrapping_add(1);
    }

    /// Post a write of `data` to `addr`.
    pub fn write(&mut self, addr: u16, data: u8) {
        self.addr = addr;
        self.data = data;
        self.rw_flag = ReadWrite::Write;
        self.serial = self.serial.wrapping_add(1);
    }

    pub fn addr(&self) -> u16 {
        self.addr
    }

    pub fn data(&self) -> u8 {
        self.data
    }

    /// Drive the data lines. Used by devices answering a read.
    pub fn set_data(&mut self, data: u8) {
        self.data = data;
    }

    pub fn rw_flag(&self) -> ReadWrite {
        self.rw_flag
    }

    pub fn is_read(&self) -> bool {
        self.rw_flag == ReadWrite::Read
    }

    /// Counter bumped by every `read`/`write`; lets devices with side effects react once per
    /// transaction even when clocked several times while it is on the bus.
    pub fn serial(&self) -> u64 {
        self.serial
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

/// A device attached to a bus. Devices observe the current transaction only when clocked.
pub trait BusDevice {
    fn clock(&mut self, bus: &mut Bus);
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn new_bus_is_idle_read() {
        let bus = Bus::new();
        assert_eq!(bus.addr(), 0);
        assert_eq!(bus.data(), 0);
        assert_eq!(bus.rw_flag(), ReadWrite::Read);
    }

    #[test]
    fn read_keeps_previous_data() {
        let mut bus = Bus::new();
        bus.write(0x10, 0x42);
        bus.read(0x11);
        assert_eq!(bus.data(), 0x42);
        assert_eq!(bus.addr(), 0x11);
        assert!(bus.is_read());
    }

    #[test]
    fn every_transaction_bumps_serial() {
        let mut bus = Bus::new();
        bus.read(0);
        bus.read(0);
        bus.write(0, 0);
        assert_eq!(bus.serial(), 3);
        bus.set_data(7);
        assert_eq!(bus.serial(), 3);
    }

    proptest! {
        #[test]
        fn read_latches_address(addr in any::<u32>()) {
            let mut bus = Bus::new();
            bus.read(addr as u16);
            prop_assert_eq!(bus.addr() as u32, addr % 0x10000);
            prop_assert_eq!(bus.rw_flag(), ReadWrite::Read);
        }

        #[test]
        fn write_latches_address_and_data(addr in any::<u32>(), data in any::<u32>()) {
            let mut bus = Bus::new();
            bus.write(addr as u16, data as u8);
            prop_assert_eq!(bus.addr() as u32, addr % 0x10000);
            prop_assert_eq!(bus.data() as u32, data % 0x100);
            prop_assert_eq!(bus.rw_flag(), ReadWrite::Write);
        }
    }
}
