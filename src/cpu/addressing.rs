//! Addressing-mode micro-op sequences.
//!
//! Each mode queues the cycles that resolve the operand. After a read mode's last step the
//! operand read is on the bus, so the operation's first step finds the byte in `bus.data()`.
//! Write modes end by writing `store_value()` to the effective address. Read-modify-write modes
//! end with the dummy write of the unmodified byte, which is also latched in `t`.
//!
//! Indexed read modes insert the page-fix cycle with `push_front` only when the index carries
//! into the high byte; the write and read-modify-write variants always take that cycle.

use crate::{
    bus::Bus,
    cpu::{
        cpu::{CPU, MicroOp},
        opcodes::AddressingMode::{self, *},
        operations::store_value,
    },
};

pub(super) fn schedule(cpu: &mut CPU, mode: AddressingMode) {
    let steps: &[MicroOp] = match mode {
        Nul => &[],
        Imp => &[dummy_read_pc],
        Imm | Rel => &[fetch_pc],
        AbsJmp => &[fetch_pc, fetch_hi],
        Ind => &[fetch_pc, fetch_hi, abs_read, indirect_hi],

        Zp0 => &[fetch_pc, zp_read],
        Zp0W => &[fetch_pc, zp_store],
        Zp0Rw => &[fetch_pc, zp_read, rmw_dummy_write],
        Zpx => &[fetch_pc, zp_index_x, read_addr],
        ZpxW => &[fetch_pc, zp_index_x, store],
        ZpxRw => &[fetch_pc, zp_index_x, read_addr, rmw_dummy_write],
        Zpy => &[fetch_pc, zp_index_y, read_addr],
        ZpyW => &[fetch_pc, zp_index_y, store],

        Abs => &[fetch_pc, fetch_hi, abs_read],
        AbsW => &[fetch_pc, fetch_hi, abs_store],
        AbsRw => &[fetch_pc, fetch_hi, abs_read, rmw_dummy_write],
        Abx => &[fetch_pc, fetch_hi, abx_read],
        AbxW => &[fetch_pc, fetch_hi, abx_fix, store],
        AbxRw => &[fetch_pc, fetch_hi, abx_fix, read_addr, rmw_dummy_write],
        Aby => &[fetch_pc, fetch_hi, aby_read],
        AbyW => &[fetch_pc, fetch_hi, aby_fix, store],
        AbyRw => &[fetch_pc, fetch_hi, aby_fix, read_addr, rmw_dummy_write],

        Izx => &[fetch_pc, zp_index_x, read_addr, pointer_hi, abs_read],
        IzxW => &[fetch_pc, zp_index_x, read_addr, pointer_hi, abs_store],
        IzxRw => &[
            fetch_pc,
            zp_index_x,
            read_addr,
            pointer_hi,
            abs_read,
            rmw_dummy_write,
        ],
        Izy => &[fetch_pc, zp_read, pointer_hi, izy_read],
        IzyW => &[fetch_pc, zp_read, pointer_hi, izy_fix, store],
        IzyRw => &[
            fetch_pc,
            zp_read,
            pointer_hi,
            izy_fix,
            read_addr,
            rmw_dummy_write,
        ],
    };
    cpu.queue_steps(steps);
}

pub(super) fn fetch_pc(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.pc);
    cpu.pc = cpu.pc.wrapping_add(1);
}

/// Latch the low operand byte and fetch the high one.
fn fetch_hi(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    fetch_pc(cpu, bus);
}

pub(super) fn dummy_read_pc(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.pc);
}

pub(super) fn read_addr(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.addr);
}

fn store(cpu: &mut CPU, bus: &mut Bus) {
    let value = store_value(cpu);
    bus.write(cpu.addr, value);
}

fn zp_read(cpu: &mut CPU, bus: &mut Bus) {
    cpu.addr = bus.data() as u16;
    read_addr(cpu, bus);
}

fn zp_store(cpu: &mut CPU, bus: &mut Bus) {
    cpu.addr = bus.data() as u16;
    store(cpu, bus);
}

/// The unindexed zero-page address is read while the index is added; the sum wraps in page 0.
fn zp_index(cpu: &mut CPU, bus: &mut Bus, index: u8) {
    let base = bus.data();
    bus.read(base as u16);
    cpu.addr = base.wrapping_add(index) as u16;
}

fn zp_index_x(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.x;
    zp_index(cpu, bus, index);
}

fn zp_index_y(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.y;
    zp_index(cpu, bus, index);
}

fn abs_read(cpu: &mut CPU, bus: &mut Bus) {
    cpu.addr = ((bus.data() as u16) << 8) | cpu.t;
    read_addr(cpu, bus);
}

fn abs_store(cpu: &mut CPU, bus: &mut Bus) {
    cpu.addr = ((bus.data() as u16) << 8) | cpu.t;
    store(cpu, bus);
}

/// Add `index` to the 16-bit base in `data:t` and read the address with the high byte not yet
/// carried. Returns whether the carry was needed.
fn index_base(cpu: &mut CPU, bus: &mut Bus, index: u8) -> bool {
    let base = ((bus.data() as u16) << 8) | cpu.t;
    cpu.addr = base.wrapping_add(index as u16);
    bus.read((base & 0xFF00) | (cpu.addr & 0x00FF));
    base & 0xFF00 != cpu.addr & 0xFF00
}

fn indexed_read(cpu: &mut CPU, bus: &mut Bus, index: u8) {
    if index_base(cpu, bus, index) {
        // Re-read at the carried address before the queued operation cycle.
        cpu.queue.push_front(read_addr);
    }
}

fn abx_read(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.x;
    indexed_read(cpu, bus, index);
}

fn aby_read(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.y;
    indexed_read(cpu, bus, index);
}

fn abx_fix(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.x;
    index_base(cpu, bus, index);
}

fn aby_fix(cpu: &mut CPU, bus: &mut Bus) {
    let index = cpu.y;
    index_base(cpu, bus, index);
}

/// Second pointer byte, fetched from zero page with wrap-around.
fn pointer_hi(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    bus.read((cpu.addr.wrapping_add(1)) & 0x00FF);
}

fn izy_read(cpu: &mut CPU, bus: &mut Bus) {
    aby_read(cpu, bus);
}

fn izy_fix(cpu: &mut CPU, bus: &mut Bus) {
    aby_fix(cpu, bus);
}

/// JMP ($xxFF) takes its high byte from $xx00, not the next page.
fn indirect_hi(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    bus.read((cpu.addr & 0xFF00) | (cpu.addr.wrapping_add(1) & 0x00FF));
}

fn rmw_dummy_write(cpu: &mut CPU, bus: &mut Bus) {
    let value = bus.data();
    cpu.t = value as u16;
    bus.write(cpu.addr, value);
}
