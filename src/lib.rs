//! Microcycle: a cycle-stepped 6502 / NES bus core written in Rust.
//!
//! The CPU runs one micro-op per clock against a shared bus instead of one instruction per
//! step, so every dummy read, page-fix cycle and read-modify-write double write reaches the
//! devices in hardware order. References are to the
//! [NESdev Wiki](https://www.nesdev.org/wiki/NES_reference_guide).
//!
//! ## Modules
//!
//! - **bus** – address/data/read-write register set shared by the CPU and devices
//! - **ram** – bus-attached memory with a [mirroring](https://www.nesdev.org/wiki/Mirroring) mask
//! - **cartridge** – [iNES](https://www.nesdev.org/wiki/INES) /
//!   [NES 2.0](https://www.nesdev.org/wiki/NES_2.0) headers, fixed NROM layout
//! - **cpu** – [6502](https://www.nesdev.org/wiki/CPU): micro-op queue, full + undocumented
//!   opcodes, [NMI](https://www.nesdev.org/wiki/NMI)/IRQ, nestest-style trace
//! - **ppu** – [PPU registers](https://www.nesdev.org/wiki/PPU_registers) and vblank timing
//! - **emulator** – clock dividers, device ordering, BRK diagnostics

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod emulator;
pub mod ppu;
pub mod ram;
