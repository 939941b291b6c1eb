//! 6502 processor status register (P) flag bits.

pub const FLAG_CARRY: u8 = 1 << 0;
pub const FLAG_ZERO: u8 = 1 << 1;
pub const FLAG_INTERRUPT_DISABLE: u8 = 1 << 2;
pub const FLAG_DECIMAL: u8 = 1 << 3; // 2A03 has no BCD; stored but never consulted
pub const FLAG_BREAK: u8 = 1 << 4; // Only meaningful in pushed copies of P
pub const FLAG_UNUSED: u8 = 1 << 5; // Forced to 1 on every status write
pub const FLAG_OVERFLOW: u8 = 1 << 6;
pub const FLAG_NEGATIVE: u8 = 1 << 7;

const LETTERS: [(u8, char); 8] = [
    (FLAG_NEGATIVE, 'N'),
    (FLAG_OVERFLOW, 'V'),
    (FLAG_UNUSED, 'U'),
    (FLAG_BREAK, 'B'),
    (FLAG_DECIMAL, 'D'),
    (FLAG_INTERRUPT_DISABLE, 'I'),
    (FLAG_ZERO, 'Z'),
    (FLAG_CARRY, 'C'),
];

/// Render P as `NVUBDIZC`, upper case for set bits and lower case for clear ones.
pub fn describe(status: u8) -> String {
    LETTERS
        .iter()
        .map(|&(flag, letter)| {
            if status & flag != 0 {
                letter
            } else {
                letter.to_ascii_lowercase()
            }
        })
        .collect()
}
