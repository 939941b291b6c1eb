//! NES cartridge loading.
//!
//! - **header**: the 16-byte [iNES](https://www.nesdev.org/wiki/INES) /
//!   [NES 2.0](https://www.nesdev.org/wiki/NES_2.0) header and the sizes derived from it.
//! - **cartridge**: splits an image into trainer, PRG-ROM and CHR-ROM memory devices bound to
//!   the main and graphics buses (fixed NROM layout; bank-switching mappers are not modelled).

pub mod cartridge;
pub mod header;

/// Nametable mirroring selected by the board (header byte 6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mirroring {
    Horizontal,
    Vertical,
    FourScreen,
}
