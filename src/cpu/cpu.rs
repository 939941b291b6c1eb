use std::collections::VecDeque;

use tracing::{debug, trace};

use crate::{
    bus::Bus,
    cpu::{
        addressing,
        flags::{FLAG_BREAK, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_UNUSED, FLAG_ZERO},
        opcodes::{AddressingMode, Instruction, OPCODES},
        operations,
        trace::TraceEntry,
    },
};

pub const NMI_VECTOR: u16 = 0xFFFA;
pub const RESET_VECTOR: u16 = 0xFFFC;
pub const IRQ_VECTOR: u16 = 0xFFFE;

/// One clock cycle of CPU work.
pub type MicroOp = fn(&mut CPU, &mut Bus);

pub type TraceHook = Box<dyn FnMut(&TraceEntry)>;

/// Outcome of a single CPU clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Running,
    /// A BRK finished its vector fetch on this clock.
    Break,
}

pub struct CPU {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    status: u8,
    pub cycles: u64,
    /// Remaining cycles of the current instruction, front first.
    pub(super) queue: VecDeque<MicroOp>,
    pub(super) fetch: Option<&'static Instruction>,
    /// Operand byte latch.
    pub(super) t: u16,
    /// Effective address, or the vector being fetched.
    pub(super) addr: u16,
    nmi_pending: bool,
    irq_pending: bool,
    pub(super) signal: Signal,
    trace_hook: Option<TraceHook>,
}

impl CPU {
    pub fn new() -> Self {
        Self {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: FLAG_UNUSED | FLAG_INTERRUPT_DISABLE,
            cycles: 0,
            queue: VecDeque::new(),
            fetch: None,
            t: 0,
            addr: 0,
            nmi_pending: false,
            irq_pending: false,
            signal: Signal::Running,
            trace_hook: None,
        }
    }

    /// Advance one cycle: run the next queued micro-op, or decode the opcode byte sitting on the
    /// bus when the queue is empty. Whenever the queue drains, the next opcode read is issued.
    pub fn clock(&mut self, bus: &mut Bus) -> Signal {
        self.signal = Signal::Running;

        match self.queue.pop_front() {
            Some(step) => step(self, bus),
            None => self.decode(bus),
        }

        if self.queue.is_empty() {
            bus.read(self.pc);
        }

        self.cycles += 1;
        self.signal
    }

    fn decode(&mut self, bus: &mut Bus) {
        if self.nmi_pending {
            self.nmi_pending = false;
            debug!(pc = self.pc, "servicing NMI");
            self.schedule_interrupt(NMI_VECTOR);
        } else if self.irq_pending {
            self.irq_pending = false;
            // I may have been set by the instruction that just finished.
            if self.status & FLAG_INTERRUPT_DISABLE == 0 {
                debug!(pc = self.pc, "servicing IRQ");
                self.schedule_interrupt(IRQ_VECTOR);
            }
        }

        if self.queue.is_empty() {
            let opcode = bus.data();
            let instruction = &OPCODES[opcode as usize];
            self.record_trace(opcode, instruction);

            self.fetch = Some(instruction);
            self.pc = self.pc.wrapping_add(1);
            addressing::schedule(self, instruction.mode);
            operations::schedule(self, instruction.operation);
        }

        // The opcode fetch overlaps the first cycle of the instruction.
        if let Some(step) = self.queue.pop_front() {
            step(self, bus);
        }
    }

    fn record_trace(&mut self, opcode: u8, instruction: &Instruction) {
        let entry = TraceEntry {
            cycles: self.cycles,
            pc: self.pc,
            opcode,
            mnemonic: instruction.name,
            a: self.a,
            x: self.x,
            y: self.y,
            status: self.status,
            sp: self.sp,
        };
        trace!(target: "microcycle::cpu", "{entry}");
        if let Some(hook) = self.trace_hook.as_mut() {
            hook(&entry);
        }
    }

    /// Abandon whatever is executing and run the 7-cycle reset sequence, ending with PC loaded
    /// from $FFFC/$FFFD.
    pub fn reset(&mut self) {
        self.queue.clear();
        self.fetch = None;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.signal = Signal::Running;
        self.cycles = 0;
        debug!("reset");

        self.queue_steps(&[
            |cpu, bus| {
                cpu.a = 0;
                cpu.x = 0;
                cpu.y = 0;
                cpu.sp = 0;
                cpu.set_status(FLAG_INTERRUPT_DISABLE);
                bus.read(cpu.pc);
            },
            stack_decrement,
            stack_decrement,
            stack_decrement,
            |cpu, bus| {
                cpu.addr = RESET_VECTOR;
                bus.read(RESET_VECTOR);
            },
            operations::vector_hi,
            operations::vector_jump,
        ]);
    }

    /// Skip the reset sequence: registers in their power-on state, cycle counter at 7 and the
    /// opcode at `pc` already requested on the bus.
    pub fn power_on_at(&mut self, pc: u16, bus: &mut Bus) {
        self.queue.clear();
        self.fetch = None;
        self.nmi_pending = false;
        self.irq_pending = false;
        self.signal = Signal::Running;
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.sp = 0xFD;
        self.set_status(FLAG_INTERRUPT_DISABLE);
        self.cycles = 7;
        self.pc = pc;
        bus.read(pc);
    }

    /// Request a non-maskable interrupt, serviced at the next instruction boundary.
    pub fn nmi(&mut self) {
        self.nmi_pending = true;
    }

    /// Request a maskable interrupt. Ignored while I is set.
    pub fn irq(&mut self) {
        if self.status & FLAG_INTERRUPT_DISABLE == 0 {
            self.irq_pending = true;
        }
    }

    fn schedule_interrupt(&mut self, vector: u16) {
        self.fetch = None;
        self.addr = vector;
        self.queue_steps(&[
            |cpu, bus| bus.read(cpu.pc),
            operations::push_pch,
            operations::push_pcl,
            |cpu, bus| {
                let status = (cpu.status & !FLAG_BREAK) | FLAG_UNUSED;
                cpu.push_stack(bus, status);
                cpu.set_flag(FLAG_INTERRUPT_DISABLE, true);
            },
            operations::vector_lo,
            operations::vector_hi,
            operations::vector_jump,
        ]);
    }

    pub(super) fn queue_steps(&mut self, steps: &[MicroOp]) {
        self.queue.extend(steps.iter().copied());
    }

    /// Micro-ops left in the current instruction.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Instruction currently executing, `None` before the first decode or inside an interrupt.
    pub fn fetch(&self) -> Option<&'static Instruction> {
        self.fetch
    }

    pub(super) fn fetch_mode(&self) -> Option<AddressingMode> {
        self.fetch.map(|instruction| instruction.mode)
    }

    pub fn status(&self) -> u8 {
        self.status
    }

    pub fn set_status(&mut self, status: u8) {
        self.status = status | FLAG_UNUSED;
    }

    pub fn set_flag(&mut self, flag: u8, value: bool) {
        if value {
            self.set_status(self.status | flag);
        } else {
            self.set_status(self.status & !flag);
        }
    }

    /// 1 if every bit of `flag` is set, else 0.
    pub fn get_flag(&self, flag: u8) -> u8 {
        (self.status & flag == flag) as u8
    }

    pub(super) fn update_zero_and_negative_flags(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    /// Write `value` at the top of the stack, then move the pointer down.
    pub fn push_stack(&mut self, bus: &mut Bus, value: u8) {
        bus.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    /// Move the pointer up, then request the byte there. It arrives on the next clock.
    pub fn pop_stack(&mut self, bus: &mut Bus) {
        self.sp = self.sp.wrapping_add(1);
        bus.read(0x0100 | self.sp as u16);
    }

    /// Called with every decoded instruction, before it executes.
    pub fn set_trace_hook(&mut self, hook: Option<TraceHook>) {
        self.trace_hook = hook;
    }
}

impl Default for CPU {
    fn default() -> Self {
        Self::new()
    }
}

fn stack_decrement(cpu: &mut CPU, bus: &mut Bus) {
    bus.read(0x0100 | cpu.sp as u16);
    cpu.sp = cpu.sp.wrapping_sub(1);
}
