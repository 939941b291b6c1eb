//! PPU (Picture Processing Unit) register contract.
//!
//! See [PPU registers](https://www.nesdev.org/wiki/PPU_registers) and
//! [PPU memory map](https://www.nesdev.org/wiki/PPU_memory_map). Covers the CPU-facing register
//! file, VRAM/palette access, and 341-dot × 262-scanline timing with the vblank NMI. Pixel
//! rendering is not modelled.

pub mod ppu;
