//! Cycle-stepped 6502 core.
//!
//! Every instruction is decoded into a queue of micro-ops, one per clock cycle, built from an
//! addressing-mode sequence followed by an operation sequence. The CPU never owns memory: each
//! [`CPU::clock`](cpu::CPU::clock) call receives the shared [`Bus`](crate::bus::Bus), posts at
//! most one transaction on it and leaves it to the devices to answer before the next clock.
//! Legal and undocumented opcodes are covered; decimal mode is not (the 2A03 lacks it).

mod addressing;
pub mod cpu;
pub mod flags;
pub mod opcodes;
mod operations;
pub mod trace;
