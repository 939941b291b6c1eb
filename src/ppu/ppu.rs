//! NES PPU register file and frame timing.
//!
//! Registers $2000-$2007 are mirrored through $3FFF. Pattern table accesses ($0000-$1FFF) go
//! out over the graphics bus; nametables and palette RAM live here.

use tracing::trace;

use crate::{
    bus::{Bus, ReadWrite},
    cartridge::Mirroring,
};

/// OAM (Object Attribute Memory): 64 sprites × 4 bytes. Each entry: Y, tile, attr, X.
pub const OAM_LEN: usize = 256;

const DOTS_PER_SCANLINE: u16 = 341;
const VBLANK_SCANLINE: i16 = 241;
const PRE_RENDER_SCANLINE: i16 = -1;
const LAST_SCANLINE: i16 = 260;

const CTRL_INCREMENT_32: u8 = 0x04;
const CTRL_NMI_ENABLE: u8 = 0x80;
const STATUS_VBLANK: u8 = 0x80;

pub struct PPU {
    pub cycle: u16,
    pub scanline: i16,
    pub vblank: bool,
    /// NMI raised at vblank start, waiting for the emulator to forward it.
    nmi: bool,
    pub ctrl: u8,
    pub mask: u8,
    /// Current VRAM address ($2006/$2007).
    pub addr: u16,
    pub addr_latch: bool,
    pub scroll_x: u8,
    pub scroll_y: u8,
    pub scroll_latch: bool,
    /// Four 1 KiB nametables; only two are used unless the cartridge is four-screen.
    pub nametable: [u8; 0x1000],
    /// Palette RAM $3F00-$3F1F.
    pub palette: [u8; 32],
    pub oam: [u8; OAM_LEN],
    pub oam_addr: u8,
    pub mirroring: Mirroring,
    /// $2007 read buffer.
    read_buffer: u8,
    /// A pattern-table read is out on the graphics bus; its byte refills the read buffer.
    pending_chr_read: bool,
    /// Last value written to any register; write-only registers read back as this.
    open_bus: u8,
    last_serial: u64,
}

impl PPU {
    /// Create PPU in initial state (pre-render scanline -1, cycle 0).
    pub fn new() -> Self {
        Self {
            cycle: 0,
            scanline: PRE_RENDER_SCANLINE,
            vblank: false,
            nmi: false,
            ctrl: 0,
            mask: 0,
            addr: 0,
            addr_latch: false,
            scroll_x: 0,
            scroll_y: 0,
            scroll_latch: false,
            nametable: [0; 0x1000],
            palette: [0; 32],
            oam: [0; OAM_LEN],
            oam_addr: 0,
            mirroring: Mirroring::Horizontal,
            read_buffer: 0,
            pending_chr_read: false,
            open_bus: 0,
            last_serial: 0,
        }
    }

    pub fn set_mirroring(&mut self, mirroring: Mirroring) {
        self.mirroring = mirroring;
    }

    /// One PPU dot. Answers a register access on the main bus once per transaction, then
    /// advances the frame timing.
    pub fn clock(&mut self, main: &mut Bus, graphics: &mut Bus) {
        if self.pending_chr_read {
            self.read_buffer = graphics.data();
            self.pending_chr_read = false;
        }

        if main.serial() != self.last_serial {
            self.last_serial = main.serial();
            if (0x2000..=0x3FFF).contains(&main.addr()) {
                self.access_register(main, graphics);
            }
        }

        self.tick();
    }

    fn access_register(&mut self, main: &mut Bus, graphics: &mut Bus) {
        let register = main.addr() & 0x0007;
        match main.rw_flag() {
            ReadWrite::Read => {
                let data = match register {
                    2 => self.read_status(),
                    4 => self.read_oam_data(),
                    7 => self.read_data(graphics),
                    _ => self.open_bus,
                };
                main.set_data(data);
            }
            ReadWrite::Write => {
                let data = main.data();
                self.open_bus = data;
                match register {
                    0 => self.write_ctrl(data),
                    1 => self.mask = data,
                    3 => self.oam_addr = data,
                    4 => self.write_oam_data(data),
                    5 => self.write_scroll(data),
                    6 => self.write_addr(data),
                    7 => self.write_data(graphics, data),
                    _ => {}
                }
            }
        }
    }

    /// Advance by one dot (341 per scanline, scanlines -1..=260). Sets vblank at scanline 241
    /// dot 1 and clears it on the pre-render line.
    pub fn tick(&mut self) {
        self.cycle += 1;

        if self.scanline == VBLANK_SCANLINE && self.cycle == 1 {
            self.vblank = true;
            if self.ctrl & CTRL_NMI_ENABLE != 0 {
                self.nmi = true;
            }
        }

        if self.scanline == PRE_RENDER_SCANLINE && self.cycle == 1 {
            self.vblank = false;
        }

        if self.cycle == DOTS_PER_SCANLINE {
            self.cycle = 0;
            self.scanline += 1;
            if self.scanline > LAST_SCANLINE {
                self.scanline = PRE_RENDER_SCANLINE;
            }
        }
    }

    /// Take a pending vblank NMI, clearing it.
    pub fn take_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }

    /// Read PPUSTATUS ($2002); clears vblank and both write toggles.
    pub fn read_status(&mut self) -> u8 {
        let mut status = self.open_bus & 0x1F;
        if self.vblank {
            status |= STATUS_VBLANK;
        }

        self.vblank = false;
        self.addr_latch = false;
        self.scroll_latch = false;
        status
    }

    /// Write PPUCTRL ($2000). Enabling NMI during vblank raises one immediately.
    pub fn write_ctrl(&mut self, data: u8) {
        let enabling = self.ctrl & CTRL_NMI_ENABLE == 0 && data & CTRL_NMI_ENABLE != 0;
        self.ctrl = data;
        if enabling && self.vblank {
            self.nmi = true;
        }
    }

    /// Read OAMDATA ($2004); does not increment OAMADDR.
    pub fn read_oam_data(&mut self) -> u8 {
        self.oam[self.oam_addr as usize]
    }

    pub fn write_oam_data(&mut self, data: u8) {
        self.oam[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    /// Write PPUSCROLL ($2005): X on the first write, Y on the second.
    pub fn write_scroll(&mut self, data: u8) {
        if !self.scroll_latch {
            self.scroll_x = data;
        } else {
            self.scroll_y = data;
        }
        self.scroll_latch = !self.scroll_latch;
    }

    /// Write PPUADDR ($2006): high byte first, then low.
    pub fn write_addr(&mut self, data: u8) {
        if !self.addr_latch {
            self.addr = (((data as u16) & 0x3F) << 8) | (self.addr & 0x00FF);
        } else {
            self.addr = (self.addr & 0xFF00) | data as u16;
        }
        self.addr_latch = !self.addr_latch;
    }

    /// Read PPUDATA ($2007). Returns the buffered byte and refills the buffer from the current
    /// address; palette reads bypass the buffer.
    pub fn read_data(&mut self, graphics: &mut Bus) -> u8 {
        let addr = self.addr & 0x3FFF;
        let data = match addr {
            0x0000..=0x1FFF => {
                graphics.read(addr);
                self.pending_chr_read = true;
                self.read_buffer
            }
            0x2000..=0x3EFF => {
                let data = self.read_buffer;
                self.read_buffer = self.nametable[self.nametable_index(addr)];
                data
            }
            _ => {
                // The buffer picks up the nametable byte underneath the palette.
                self.read_buffer = self.nametable[self.nametable_index(addr)];
                self.palette[palette_index(addr)]
            }
        };
        trace!(addr, data, "PPUDATA read");
        self.increment_addr();
        data
    }

    /// Write PPUDATA ($2007). Pattern-table writes are forwarded to the graphics bus.
    pub fn write_data(&mut self, graphics: &mut Bus, data: u8) {
        let addr = self.addr & 0x3FFF;
        match addr {
            0x0000..=0x1FFF => graphics.write(addr, data),
            0x2000..=0x3EFF => {
                let index = self.nametable_index(addr);
                self.nametable[index] = data;
            }
            _ => self.palette[palette_index(addr)] = data & 0x3F,
        }
        self.increment_addr();
    }

    fn increment_addr(&mut self) {
        let step = if self.ctrl & CTRL_INCREMENT_32 != 0 { 32 } else { 1 };
        self.addr = self.addr.wrapping_add(step) & 0x3FFF;
    }

    fn nametable_index(&self, addr: u16) -> usize {
        map_nametable_addr(addr, self.mirroring) as usize
    }
}

impl Default for PPU {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a nametable address ($2000-$3EFF) to an index into the 4 KiB nametable store.
pub fn map_nametable_addr(addr: u16, mirroring: Mirroring) -> u16 {
    let addr = addr & 0x0FFF;
    let table = addr / 0x400;
    let offset = addr & 0x3FF;

    match mirroring {
        Mirroring::Vertical => (table & 1) * 0x400 + offset,
        Mirroring::Horizontal => (table >> 1) * 0x400 + offset,
        Mirroring::FourScreen => addr,
    }
}

/// Resolve a palette address ($3F00-$3FFF) to a 32-byte index. $3F10/$3F14/$3F18/$3F1C
/// mirror $3F00/$3F04/$3F08/$3F0C.
fn palette_index(addr: u16) -> usize {
    let i = (addr & 0x1F) as usize;
    match i {
        0x10 | 0x14 | 0x18 | 0x1C => i - 0x10,
        _ => i,
    }
}
