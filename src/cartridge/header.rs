//! iNES / NES 2.0 header parsing.
//!
//! Layout (one byte per row unless noted):
//!
//! | byte | contents                                                            |
//! |------|---------------------------------------------------------------------|
//! | 0-3  | id string, `"NES\x1A"`                                              |
//! | 4    | PRG-ROM size, low byte                                              |
//! | 5    | CHR-ROM size, low byte                                              |
//! | 6    | mirroring, battery, trainer, four-screen, mapper D0..D3             |
//! | 7    | console type, NES 2.0 id, mapper D4..D7                             |
//! | 8    | mapper D8..D11, submapper                                           |
//! | 9    | PRG-ROM size high nibble, CHR-ROM size high nibble                  |
//! | 10   | PRG-RAM shift, PRG-NVRAM shift                                      |
//! | 11   | CHR-RAM shift, CHR-NVRAM shift                                      |
//! | 12   | CPU/PPU timing                                                      |
//! | 14   | misc ROM count                                                      |
//! | 15   | default expansion device                                            |

use crate::cartridge::{Mirroring, cartridge::CartridgeError};

pub const HEADER_LEN: usize = 16;
pub const INES_ID: [u8; 4] = *b"NES\x1A";

const PRG_ROM_UNIT: usize = 0x4000;
const CHR_ROM_UNIT: usize = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleType {
    /// Nintendo Entertainment System / Family Computer
    Nes,
    VsSystem,
    Playchoice10,
    Extended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuTiming {
    /// RP2C02, NTSC NES
    Ntsc,
    /// RP2C07, PAL NES
    Pal,
    MultipleRegion,
    /// UA6538
    Dendy,
}

/// Header byte 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags6 {
    pub vertical_mirroring: bool,
    pub has_battery: bool,
    pub has_trainer: bool,
    pub four_screen: bool,
    pub mapper_nibble: u8,
}

impl From<u8> for Flags6 {
    fn from(byte: u8) -> Self {
        Self {
            vertical_mirroring: byte & 0x01 != 0,
            has_battery: byte & 0x02 != 0,
            has_trainer: byte & 0x04 != 0,
            four_screen: byte & 0x08 != 0,
            mapper_nibble: byte >> 4,
        }
    }
}

/// Header byte 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags7 {
    pub console_type: ConsoleType,
    pub nes2_id: u8,
    pub mapper_nibble: u8,
}

impl From<u8> for Flags7 {
    fn from(byte: u8) -> Self {
        let console_type = match byte & 0x03 {
            0 => ConsoleType::Nes,
            1 => ConsoleType::VsSystem,
            2 => ConsoleType::Playchoice10,
            _ => ConsoleType::Extended,
        };
        Self {
            console_type,
            nes2_id: (byte >> 2) & 0x03,
            mapper_nibble: byte >> 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub id: [u8; 4],
    pub flags6: Flags6,
    pub flags7: Flags7,
    pub mapper_hi: u8,
    pub submapper: u8,
    pub prg_ram_shift: u8,
    pub prg_nvram_shift: u8,
    pub chr_ram_shift: u8,
    pub chr_nvram_shift: u8,
    pub cpu_timing: CpuTiming,
    pub misc_roms: u8,
    pub default_expansion_device: u8,
    prg_rom_size_lo: u8,
    prg_rom_size_hi: u8,
    chr_rom_size_lo: u8,
    chr_rom_size_hi: u8,
}

impl Header {
    /// Parse the first 16 bytes of `rom`. Field values are not checked against the image length.
    pub fn parse(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_LEN {
            return Err(CartridgeError::HeaderTooShort(rom.len()));
        }

        let cpu_timing = match rom[12] & 0x03 {
            0 => CpuTiming::Ntsc,
            1 => CpuTiming::Pal,
            2 => CpuTiming::MultipleRegion,
            _ => CpuTiming::Dendy,
        };

        Ok(Self {
            id: [rom[0], rom[1], rom[2], rom[3]],
            flags6: Flags6::from(rom[6]),
            flags7: Flags7::from(rom[7]),
            mapper_hi: rom[8] & 0x0F,
            submapper: rom[8] >> 4,
            prg_ram_shift: rom[10] & 0x0F,
            prg_nvram_shift: rom[10] >> 4,
            chr_ram_shift: rom[11] & 0x0F,
            chr_nvram_shift: rom[11] >> 4,
            cpu_timing,
            misc_roms: rom[14] & 0x03,
            default_expansion_device: rom[15] & 0x3F,
            prg_rom_size_lo: rom[4],
            prg_rom_size_hi: rom[9] & 0x0F,
            chr_rom_size_lo: rom[5],
            chr_rom_size_hi: rom[9] >> 4,
        })
    }

    pub fn has_valid_id(&self) -> bool {
        self.id == INES_ID
    }

    /// Header identifies itself as NES 2.0 (byte 7 bits 2-3 == 0b10).
    pub fn is_nes2(&self) -> bool {
        self.flags7.nes2_id == 2
    }

    pub fn prg_rom_size(&self) -> usize {
        rom_size(self.prg_rom_size_lo, self.prg_rom_size_hi, PRG_ROM_UNIT)
    }

    pub fn chr_rom_size(&self) -> usize {
        rom_size(self.chr_rom_size_lo, self.chr_rom_size_hi, CHR_ROM_UNIT)
    }

    pub fn mapper_number(&self) -> u16 {
        ((self.mapper_hi as u16) << 8)
            | ((self.flags7.mapper_nibble as u16) << 4)
            | self.flags6.mapper_nibble as u16
    }

    pub fn mirroring(&self) -> Mirroring {
        if self.flags6.four_screen {
            Mirroring::FourScreen
        } else if self.flags6.vertical_mirroring {
            Mirroring::Vertical
        } else {
            Mirroring::Horizontal
        }
    }

    pub fn trainer_len(&self) -> usize {
        if self.flags6.has_trainer { 512 } else { 0 }
    }

    pub fn prg_ram_size(&self) -> usize {
        shifted_size(self.prg_ram_shift)
    }

    pub fn prg_nvram_size(&self) -> usize {
        shifted_size(self.prg_nvram_shift)
    }

    pub fn chr_ram_size(&self) -> usize {
        shifted_size(self.chr_ram_shift)
    }

    pub fn chr_nvram_size(&self) -> usize {
        shifted_size(self.chr_nvram_shift)
    }
}

/// A high nibble of 0xF switches the low byte to exponent-multiplier form `EEEEEEMM`.
fn rom_size(lo: u8, hi: u8, unit: usize) -> usize {
    if hi == 0x0F {
        let exponent = (lo >> 2) as u32;
        let multiplier = (lo & 0x03) as usize * 2 + 1;
        return 1usize
            .checked_shl(exponent)
            .unwrap_or(usize::MAX)
            .saturating_mul(multiplier)
            .saturating_mul(unit);
    }
    (((hi as usize) << 8) | lo as usize) * unit
}

/// RAM sizes are stored as shift counts: 0 means none, otherwise `64 << shift` bytes.
fn shifted_size(shift: u8) -> usize {
    if shift == 0 { 0 } else { 64 << shift }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes() -> [u8; 16] {
        let mut bytes = [0u8; 16];
        bytes[..4].copy_from_slice(&INES_ID);
        bytes
    }

    #[test]
    fn sizes_in_units() {
        let mut bytes = header_bytes();
        bytes[4] = 2;
        bytes[5] = 1;
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.prg_rom_size(), 32768);
        assert_eq!(header.chr_rom_size(), 8192);
    }

    #[test]
    fn high_nibbles_extend_sizes() {
        let mut bytes = header_bytes();
        bytes[4] = 0x01;
        bytes[5] = 0x02;
        bytes[9] = 0x21;
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.prg_rom_size(), 0x101 * 0x4000);
        assert_eq!(header.chr_rom_size(), 0x202 * 0x2000);
    }

    #[test]
    fn exponent_multiplier_form() {
        let mut bytes = header_bytes();
        // exponent 3, multiplier 1 -> 2^3 * 3
        bytes[4] = (3 << 2) | 1;
        bytes[9] = 0x0F;
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.prg_rom_size(), 8 * 3 * 0x4000);
        assert_eq!(header.chr_rom_size(), 0);
    }

    #[test]
    fn mapper_number_combines_three_nibbles() {
        let mut bytes = header_bytes();
        bytes[6] = 0x40;
        bytes[7] = 0x10;
        bytes[8] = 0x32;
        let header = Header::parse(&bytes).unwrap();
        assert_eq!(header.mapper_number(), 0x214);
        assert_eq!(header.submapper, 3);
    }

    #[test]
    fn flag_bytes() {
        let mut bytes = header_bytes();
        bytes[6] = 0b0000_0111;
        bytes[7] = 0b0000_1001;
        bytes[10] = 0x70;
        bytes[11] = 0x07;
        bytes[12] = 0x01;
        bytes[14] = 0x02;
        bytes[15] = 0xFF;
        let header = Header::parse(&bytes).unwrap();

        assert!(header.flags6.has_trainer);
        assert!(header.flags6.has_battery);
        assert_eq!(header.mirroring(), Mirroring::Vertical);
        assert_eq!(header.flags7.console_type, ConsoleType::VsSystem);
        assert!(header.is_nes2());
        assert_eq!(header.prg_ram_size(), 0);
        assert_eq!(header.prg_nvram_size(), 64 << 7);
        assert_eq!(header.chr_ram_size(), 64 << 7);
        assert_eq!(header.cpu_timing, CpuTiming::Pal);
        assert_eq!(header.misc_roms, 2);
        assert_eq!(header.default_expansion_device, 0x3F);
        assert_eq!(header.trainer_len(), 512);
    }

    #[test]
    fn short_header_is_rejected() {
        assert!(matches!(
            Header::parse(&[0x4E, 0x45, 0x53]),
            Err(CartridgeError::HeaderTooShort(3))
        ));
    }

    #[test]
    fn id_string_checked() {
        let header = Header::parse(&header_bytes()).unwrap();
        assert!(header.has_valid_id());
        let header = Header::parse(&[0u8; 16]).unwrap();
        assert!(!header.has_valid_id());
    }
}
