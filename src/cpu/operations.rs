//! Operation micro-op sequences and the arithmetic behind them.
//!
//! An operation's steps run after its addressing mode's steps. Read operations take their
//! operand from `bus.data()`; read-modify-write operations take it from `t` and write the
//! result back to `addr`. A write is never the last step of an instruction, because the
//! opcode prefetch issued when the queue drains would replace it on the bus; those sequences
//! end with `nop`.

use crate::{
    bus::Bus,
    cpu::{
        addressing::{dummy_read_pc, fetch_pc},
        cpu::{CPU, IRQ_VECTOR, MicroOp, Signal},
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{AddressingMode, Operation::{self, *}},
    },
};

pub(super) fn schedule(cpu: &mut CPU, operation: Operation) {
    match operation {
        Lda => cpu.queue_steps(&[lda]),
        Ldx => cpu.queue_steps(&[ldx]),
        Ldy => cpu.queue_steps(&[ldy]),
        Lax => cpu.queue_steps(&[lax]),
        Las => cpu.queue_steps(&[las]),
        And => cpu.queue_steps(&[and]),
        Ora => cpu.queue_steps(&[ora]),
        Eor => cpu.queue_steps(&[eor]),
        Adc => cpu.queue_steps(&[adc]),
        Sbc => cpu.queue_steps(&[sbc]),
        Cmp => cpu.queue_steps(&[cmp]),
        Cpx => cpu.queue_steps(&[cpx]),
        Cpy => cpu.queue_steps(&[cpy]),
        Bit => cpu.queue_steps(&[bit]),
        Anc => cpu.queue_steps(&[anc]),
        Alr => cpu.queue_steps(&[alr]),
        Arr => cpu.queue_steps(&[arr]),
        Xaa => cpu.queue_steps(&[xaa]),
        Axs => cpu.queue_steps(&[axs]),
        Nop => cpu.queue_steps(&[nop]),

        Asl => shift(cpu, asl_accumulator, asl_memory),
        Lsr => shift(cpu, lsr_accumulator, lsr_memory),
        Rol => shift(cpu, rol_accumulator, rol_memory),
        Ror => shift(cpu, ror_accumulator, ror_memory),
        Inc => cpu.queue_steps(&[inc_memory, nop]),
        Dec => cpu.queue_steps(&[dec_memory, nop]),

        // The addressing mode already wrote `store_value()`.
        Sta | Stx | Sty | Sax | Shx | Shy | Ahx | Tas => cpu.queue_steps(&[nop]),

        Tax => cpu.queue_steps(&[tax]),
        Tay => cpu.queue_steps(&[tay]),
        Txa => cpu.queue_steps(&[txa]),
        Tya => cpu.queue_steps(&[tya]),
        Tsx => cpu.queue_steps(&[tsx]),
        Txs => cpu.queue_steps(&[txs]),
        Inx => cpu.queue_steps(&[inx]),
        Iny => cpu.queue_steps(&[iny]),
        Dex => cpu.queue_steps(&[dex]),
        Dey => cpu.queue_steps(&[dey]),
        Clc => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_CARRY, false)]),
        Sec => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_CARRY, true)]),
        Cli => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_INTERRUPT_DISABLE, false)]),
        Sei => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_INTERRUPT_DISABLE, true)]),
        Clv => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_OVERFLOW, false)]),
        Cld => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_DECIMAL, false)]),
        Sed => cpu.queue_steps(&[|cpu, _| cpu.set_flag(FLAG_DECIMAL, true)]),

        Bcc => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_CARRY, false)]),
        Bcs => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_CARRY, true)]),
        Bne => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_ZERO, false)]),
        Beq => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_ZERO, true)]),
        Bpl => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_NEGATIVE, false)]),
        Bmi => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_NEGATIVE, true)]),
        Bvc => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_OVERFLOW, false)]),
        Bvs => cpu.queue_steps(&[|cpu, bus| branch(cpu, bus, FLAG_OVERFLOW, true)]),

        Pha => cpu.queue_steps(&[|cpu, bus| cpu.push_stack(bus, cpu.a), nop]),
        Php => cpu.queue_steps(&[php, nop]),
        Pla => cpu.queue_steps(&[stack_dummy_read, pull, pla]),
        Plp => cpu.queue_steps(&[stack_dummy_read, pull, plp]),

        Jmp => cpu.queue_steps(&[jmp]),
        Jsr => cpu.queue_steps(&[
            fetch_pc,
            jsr_latch,
            push_pch,
            push_pcl,
            dummy_read_pc,
            jmp,
        ]),
        Rts => cpu.queue_steps(&[stack_dummy_read, pull, pull_pcl, rts_jump, rts_increment]),
        Rti => cpu.queue_steps(&[stack_dummy_read, pull, pull_status, pull_pcl, jmp]),
        Brk => {
            cpu.addr = IRQ_VECTOR;
            cpu.queue_steps(&[
                push_pch,
                push_pcl,
                brk_push_status,
                vector_lo,
                vector_hi,
                brk_jump,
            ]);
        }

        Stp => cpu.queue_steps(&[stp]),

        Slo => chain(cpu, Asl, Ora),
        Rla => chain(cpu, Rol, And),
        Sre => chain(cpu, Lsr, Eor),
        Rra => chain(cpu, Ror, Adc),
        Dcp => chain(cpu, Dec, Cmp),
        Isb => chain(cpu, Inc, Sbc),
    }
}

/// Run `second` on the byte `first` wrote back. Both sequences end as if they own the tail of
/// the queue, so the trailing `nop` of the first is dropped.
fn chain(cpu: &mut CPU, first: Operation, second: Operation) {
    schedule(cpu, first);
    cpu.queue.pop_back();
    schedule(cpu, second);
}

fn shift(cpu: &mut CPU, accumulator: MicroOp, memory: MicroOp) {
    if cpu.fetch_mode() == Some(AddressingMode::Imp) {
        cpu.queue_steps(&[accumulator]);
    } else {
        cpu.queue_steps(&[memory, nop]);
    }
}

/// Value a write-mode addressing sequence stores, chosen by the executing operation.
pub(super) fn store_value(cpu: &mut CPU) -> u8 {
    // SHX/SHY/AHX/TAS AND the value with the target's high byte plus one.
    let high = ((cpu.addr >> 8) as u8).wrapping_add(1);
    match cpu.fetch.map(|instruction| instruction.operation) {
        Some(Stx) => cpu.x,
        Some(Sty) => cpu.y,
        Some(Sax) => cpu.a & cpu.x,
        Some(Shx) => cpu.x & high,
        Some(Shy) => cpu.y & high,
        Some(Ahx) => cpu.a & cpu.x & high,
        Some(Tas) => {
            cpu.sp = cpu.a & cpu.x;
            cpu.sp & high
        }
        _ => cpu.a,
    }
}

pub(super) fn nop(_cpu: &mut CPU, _bus: &mut Bus) {}

fn stp(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.queue.push_back(stp);
}

fn lda(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a = bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn ldx(cpu: &mut CPU, bus: &mut Bus) {
    cpu.x = bus.data();
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn ldy(cpu: &mut CPU, bus: &mut Bus) {
    cpu.y = bus.data();
    cpu.update_zero_and_negative_flags(cpu.y);
}

fn lax(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a = bus.data();
    cpu.x = cpu.a;
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn las(cpu: &mut CPU, bus: &mut Bus) {
    let value = bus.data() & cpu.sp;
    cpu.a = value;
    cpu.x = value;
    cpu.sp = value;
    cpu.update_zero_and_negative_flags(value);
}

fn and(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a &= bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn ora(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a |= bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn eor(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a ^= bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

pub(super) fn add_with_carry(cpu: &mut CPU, value: u8) {
    let a = cpu.a as u16;
    let m = value as u16;
    let result = a + m + cpu.get_flag(FLAG_CARRY) as u16;

    cpu.set_flag(FLAG_CARRY, result & 0x100 != 0);
    cpu.set_flag(FLAG_OVERFLOW, (a ^ result) & (m ^ result) & 0x80 != 0);
    cpu.a = result as u8;
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn adc(cpu: &mut CPU, bus: &mut Bus) {
    add_with_carry(cpu, bus.data());
}

fn sbc(cpu: &mut CPU, bus: &mut Bus) {
    add_with_carry(cpu, !bus.data());
}

/// `register + !value + 1`; C is the carry out, N and Z come from the low byte.
pub(super) fn compare(cpu: &mut CPU, register: u8, value: u8) {
    let result = register as u16 + (!value) as u16 + 1;
    cpu.set_flag(FLAG_CARRY, result > 0xFF);
    cpu.update_zero_and_negative_flags(result as u8);
}

fn cmp(cpu: &mut CPU, bus: &mut Bus) {
    let register = cpu.a;
    compare(cpu, register, bus.data());
}

fn cpx(cpu: &mut CPU, bus: &mut Bus) {
    let register = cpu.x;
    compare(cpu, register, bus.data());
}

fn cpy(cpu: &mut CPU, bus: &mut Bus) {
    let register = cpu.y;
    compare(cpu, register, bus.data());
}

fn bit(cpu: &mut CPU, bus: &mut Bus) {
    let value = bus.data();
    cpu.set_flag(FLAG_ZERO, cpu.a & value == 0);
    cpu.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    cpu.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
}

fn anc(cpu: &mut CPU, bus: &mut Bus) {
    and(cpu, bus);
    cpu.set_flag(FLAG_CARRY, cpu.a & 0x80 != 0);
}

fn alr(cpu: &mut CPU, bus: &mut Bus) {
    and(cpu, bus);
    lsr_accumulator(cpu, bus);
}

fn arr(cpu: &mut CPU, bus: &mut Bus) {
    let carry = cpu.get_flag(FLAG_CARRY);
    cpu.a = ((cpu.a & bus.data()) >> 1) | (carry << 7);
    cpu.update_zero_and_negative_flags(cpu.a);

    let bit6 = (cpu.a >> 6) & 1;
    let bit5 = (cpu.a >> 5) & 1;
    cpu.set_flag(FLAG_CARRY, bit6 != 0);
    cpu.set_flag(FLAG_OVERFLOW, bit6 ^ bit5 != 0);
}

fn xaa(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a = cpu.x & bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

/// X = (A & X) - value, flags as for CMP.
fn axs(cpu: &mut CPU, bus: &mut Bus) {
    let result = (cpu.a & cpu.x) as u16 + (!bus.data()) as u16 + 1;
    cpu.set_flag(FLAG_CARRY, result > 0xFF);
    cpu.x = result as u8;
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn asl(cpu: &mut CPU, value: u8) -> u8 {
    cpu.set_flag(FLAG_CARRY, value & 0x80 != 0);
    let result = value << 1;
    cpu.update_zero_and_negative_flags(result);
    result
}

fn lsr(cpu: &mut CPU, value: u8) -> u8 {
    cpu.set_flag(FLAG_CARRY, value & 0x01 != 0);
    let result = value >> 1;
    cpu.update_zero_and_negative_flags(result);
    result
}

fn rol(cpu: &mut CPU, value: u8) -> u8 {
    let carry_in = cpu.get_flag(FLAG_CARRY);
    cpu.set_flag(FLAG_CARRY, value & 0x80 != 0);
    let result = (value << 1) | carry_in;
    cpu.update_zero_and_negative_flags(result);
    result
}

fn ror(cpu: &mut CPU, value: u8) -> u8 {
    let carry_in = cpu.get_flag(FLAG_CARRY);
    cpu.set_flag(FLAG_CARRY, value & 0x01 != 0);
    let result = (value >> 1) | (carry_in << 7);
    cpu.update_zero_and_negative_flags(result);
    result
}

fn modify_accumulator(cpu: &mut CPU, modify: fn(&mut CPU, u8) -> u8) {
    let value = cpu.a;
    cpu.a = modify(cpu, value);
}

/// Write back the modified copy of the byte latched by the dummy write.
fn modify_memory(cpu: &mut CPU, bus: &mut Bus, modify: fn(&mut CPU, u8) -> u8) {
    let value = cpu.t as u8;
    let result = modify(cpu, value);
    bus.write(cpu.addr, result);
}

fn asl_accumulator(cpu: &mut CPU, _bus: &mut Bus) {
    modify_accumulator(cpu, asl);
}

fn lsr_accumulator(cpu: &mut CPU, _bus: &mut Bus) {
    modify_accumulator(cpu, lsr);
}

fn rol_accumulator(cpu: &mut CPU, _bus: &mut Bus) {
    modify_accumulator(cpu, rol);
}

fn ror_accumulator(cpu: &mut CPU, _bus: &mut Bus) {
    modify_accumulator(cpu, ror);
}

fn asl_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, asl);
}

fn lsr_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, lsr);
}

fn rol_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, rol);
}

fn ror_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, ror);
}

fn inc_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, |cpu, value| {
        let result = value.wrapping_add(1);
        cpu.update_zero_and_negative_flags(result);
        result
    });
}

fn dec_memory(cpu: &mut CPU, bus: &mut Bus) {
    modify_memory(cpu, bus, |cpu, value| {
        let result = value.wrapping_sub(1);
        cpu.update_zero_and_negative_flags(result);
        result
    });
}

fn tax(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.x = cpu.a;
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn tay(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.y = cpu.a;
    cpu.update_zero_and_negative_flags(cpu.y);
}

fn txa(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.a = cpu.x;
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn tya(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.a = cpu.y;
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn tsx(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.x = cpu.sp;
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn txs(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.sp = cpu.x;
}

fn inx(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.x = cpu.x.wrapping_add(1);
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn iny(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.y = cpu.y.wrapping_add(1);
    cpu.update_zero_and_negative_flags(cpu.y);
}

fn dex(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.x = cpu.x.wrapping_sub(1);
    cpu.update_zero_and_negative_flags(cpu.x);
}

fn dey(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.y = cpu.y.wrapping_sub(1);
    cpu.update_zero_and_negative_flags(cpu.y);
}

/// Taken branches cost one cycle, two when the target is on another page.
fn branch(cpu: &mut CPU, bus: &mut Bus, flag: u8, expected: bool) {
    let offset = bus.data() as i8;
    if (cpu.get_flag(flag) != 0) == expected {
        cpu.addr = cpu.pc.wrapping_add(offset as u16);
        cpu.queue.push_back(branch_taken);
    }
}

fn branch_taken(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.pc);
    if cpu.pc & 0xFF00 != cpu.addr & 0xFF00 {
        // Low byte lands first, the carry into PCH costs the extra cycle.
        cpu.pc = (cpu.pc & 0xFF00) | (cpu.addr & 0x00FF);
        cpu.queue.push_back(branch_page_fix);
    } else {
        cpu.pc = cpu.addr;
    }
}

fn branch_page_fix(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.pc);
    cpu.pc = cpu.addr;
}

fn jmp(cpu: &mut CPU, bus: &mut Bus) {
    cpu.pc = ((bus.data() as u16) << 8) | cpu.t;
}

fn jsr_latch(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    stack_dummy_read(cpu, bus);
}

fn stack_dummy_read(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(0x0100 | cpu.sp as u16);
}

fn pull(cpu: &mut CPU, bus: &mut Bus) {
    cpu.pop_stack(bus);
}

fn pull_pcl(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    cpu.pop_stack(bus);
}

fn pull_status(cpu: &mut CPU, bus: &mut Bus) {
    cpu.set_status(bus.data() & !FLAG_BREAK);
    cpu.pop_stack(bus);
}

fn rts_jump(cpu: &mut CPU, bus: &mut Bus) {
    jmp(cpu, bus);
    bus.read(cpu.pc);
}

fn rts_increment(cpu: &mut CPU, _bus: &mut Bus) {
    cpu.pc = cpu.pc.wrapping_add(1);
}

fn pla(cpu: &mut CPU, bus: &mut Bus) {
    cpu.a = bus.data();
    cpu.update_zero_and_negative_flags(cpu.a);
}

fn plp(cpu: &mut CPU, bus: &mut Bus) {
    cpu.set_status(bus.data() & !FLAG_BREAK);
}

fn php(cpu: &mut CPU, bus: &mut Bus) {
    let status = cpu.status() | FLAG_BREAK | FLAG_UNUSED;
    cpu.push_stack(bus, status);
}

pub(super) fn push_pch(cpu: &mut CPU, bus: &mut Bus) {
    cpu.push_stack(bus, (cpu.pc >> 8) as u8);
}

pub(super) fn push_pcl(cpu: &mut CPU, bus: &mut Bus) {
    cpu.push_stack(bus, cpu.pc as u8);
}

fn brk_push_status(cpu: &mut CPU, bus: &mut Bus) {
    php(cpu, bus);
    cpu.set_flag(FLAG_INTERRUPT_DISABLE, true);
}

pub(super) fn vector_lo(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(cpu.addr);
}

pub(super) fn vector_hi(cpu: &mut CPU, bus: &mut Bus) {
    cpu.t = bus.data() as u16;
    bus.read(cpu.addr.wrapping_add(1));
}

pub(super) fn vector_jump(cpu: &mut CPU, bus: &mut Bus) {
    jmp(cpu, bus);
}

fn brk_jump(cpu: &mut CPU, bus: &mut Bus) {
    vector_jump(cpu, bus);
    cpu.signal = Signal::Break;
}
