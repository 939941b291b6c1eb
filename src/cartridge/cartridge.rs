//! NES cartridge built from an iNES (.nes) image.
//!
//! Implements the [iNES](https://www.nesdev.org/wiki/INES) image layout: 16-byte header, optional
//! 512-byte trainer, PRG-ROM, CHR-ROM, then any misc ROM. Each region becomes a [`Ram`] device:
//! trainer at $7000-$71FF and PRG-ROM at $8000-$FFFF on the CPU bus, CHR-ROM at $0000-$1FFF on
//! the graphics bus. Only the fixed NROM layout is modelled; other mapper numbers load with the
//! same layout and a warning.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    bus::{Bus, BusDevice},
    cartridge::header::{HEADER_LEN, Header},
    ram::Ram,
};

const TRAINER_START: u16 = 0x7000;
const TRAINER_END: u16 = 0x71FF;
const PRG_START: u16 = 0x8000;
const PRG_END: u16 = 0xFFFF;
const CHR_START: u16 = 0x0000;
const CHR_END: u16 = 0x1FFF;

#[derive(Debug, Error)]
pub enum CartridgeError {
    #[error("image is {0} bytes, shorter than the 16-byte header")]
    HeaderTooShort(usize),

    #[error("{region} needs {needed} bytes but only {available} remain in the image")]
    Truncated {
        region: &'static str,
        needed: usize,
        available: usize,
    },
}

/// Cartridge: parsed header plus the memory devices derived from it.
#[derive(Default)]
pub struct Cartridge {
    header: Option<Header>,
    trainer: Option<Ram>,
    prg_rom: Option<Ram>,
    chr_rom: Option<Ram>,
    misc_rom: Vec<u8>,
}

impl Cartridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `rom` and replace the current contents. On error the cartridge is left empty.
    pub fn load(&mut self, rom: &[u8]) -> Result<(), CartridgeError> {
        *self = Self::default();

        let header = Header::parse(rom)?;
        if !header.has_valid_id() {
            warn!(id = ?header.id, "image does not start with the iNES id string");
        }
        if header.mapper_number() != 0 {
            warn!(
                mapper = header.mapper_number(),
                "mapper not supported, using the fixed NROM layout"
            );
        }

        let mut offset = HEADER_LEN;

        let trainer = if header.flags6.has_trainer {
            let bytes = take(rom, &mut offset, header.trainer_len(), "trainer")?;
            Some(Ram::new(TRAINER_START, TRAINER_END, bytes, 0x01FF))
        } else {
            None
        };

        let prg_size = header.prg_rom_size();
        let prg = take(rom, &mut offset, prg_size, "PRG-ROM")?;
        let prg_mask = if prg_size <= 0x4000 { 0x3FFF } else { 0x7FFF };
        let prg_rom = Ram::new(PRG_START, PRG_END, prg, prg_mask);

        let chr_size = header.chr_rom_size();
        let chr_rom = if chr_size > 0 {
            let chr = take(rom, &mut offset, chr_size, "CHR-ROM")?;
            // Up to 8 KiB the first pattern table repeats across $0000-$1FFF.
            let chr_mask = if chr_size > 0x2000 { 0x1FFF } else { 0x0FFF };
            Some(Ram::new(CHR_START, CHR_END, chr, chr_mask))
        } else {
            None
        };

        let misc_rom = rom[offset..].to_vec();

        debug!(
            prg_size,
            prg_mask,
            chr_size,
            trainer = trainer.is_some(),
            misc = misc_rom.len(),
            mirroring = ?header.mirroring(),
            "cartridge loaded"
        );

        *self = Self {
            header: Some(header),
            trainer,
            prg_rom: Some(prg_rom),
            chr_rom,
            misc_rom,
        };
        Ok(())
    }

    /// Clock every loaded device in load order: trainer and PRG-ROM watch the main bus, CHR-ROM
    /// the graphics bus.
    pub fn clock(&mut self, main: &mut Bus, graphics: &mut Bus) {
        if let Some(trainer) = self.trainer.as_mut() {
            trainer.clock(main);
        }
        if let Some(prg) = self.prg_rom.as_mut() {
            prg.clock(main);
        }
        if let Some(chr) = self.chr_rom.as_mut() {
            chr.clock(graphics);
        }
    }

    pub fn header(&self) -> Option<&Header> {
        self.header.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.header.is_some()
    }

    pub fn prg_rom(&self) -> Option<&Ram> {
        self.prg_rom.as_ref()
    }

    pub fn chr_rom(&self) -> Option<&Ram> {
        self.chr_rom.as_ref()
    }

    pub fn trainer(&self) -> Option<&Ram> {
        self.trainer.as_ref()
    }

    /// Bytes left after CHR-ROM. Not mapped onto either bus.
    pub fn misc_rom(&self) -> &[u8] {
        &self.misc_rom
    }
}

fn take<'a>(
    rom: &'a [u8],
    offset: &mut usize,
    len: usize,
    region: &'static str,
) -> Result<&'a [u8], CartridgeError> {
    let available = rom.len().saturating_sub(*offset);
    if len > available {
        warn!(region, needed = len, available, "image is truncated");
        return Err(CartridgeError::Truncated {
            region,
            needed: len,
            available,
        });
    }
    let bytes = &rom[*offset..*offset + len];
    *offset += len;
    Ok(bytes)
}
