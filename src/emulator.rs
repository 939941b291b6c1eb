//! Composition root: one main bus, one graphics bus and every device attached to them.
//!
//! Each master tick clocks RAM and the cartridge, then the CPU when its divisor elapses, then
//! the PPU when its divisor elapses. Later devices see the bus exactly as the earlier ones left
//! it. The host owns the timer that calls [`Emulator::clock`]; [`Emulator::run`] is a
//! convenience loop with a cycle budget.

use std::num::NonZeroU64;

use tracing::info;

use crate::{
    bus::{Bus, BusDevice},
    cartridge::cartridge::{Cartridge, CartridgeError},
    cpu::{
        cpu::{CPU, TraceHook},
        flags,
    },
    ppu::ppu::PPU,
    ram::Ram,
};

pub use crate::cpu::cpu::Signal;

/// Bytes a test ROM leaves its result code in before executing BRK.
const BREAK_CODE_LO: u16 = 0x0002;
const BREAK_CODE_HI: u16 = 0x0003;

/// NTSC master clock: the CPU runs at 1/12 and the PPU at 1/4 of it.
pub const DEFAULT_CPU_DIVISOR: NonZeroU64 = NonZeroU64::new(12).unwrap();
pub const DEFAULT_PPU_DIVISOR: NonZeroU64 = NonZeroU64::new(4).unwrap();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmulatorConfig {
    /// Master ticks per CPU clock.
    pub cpu_divisor: NonZeroU64,
    /// Master ticks per PPU dot.
    pub ppu_divisor: NonZeroU64,
    /// Start at this address in the power-on state instead of running the reset sequence.
    pub entry_point: Option<u16>,
    pub video: bool,
    /// Read the result code at $0002/$0003 after a BRK before stopping.
    pub break_diagnostics: bool,
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self {
            cpu_divisor: DEFAULT_CPU_DIVISOR,
            ppu_divisor: DEFAULT_PPU_DIVISOR,
            entry_point: None,
            video: true,
            break_diagnostics: true,
        }
    }
}

/// Result code read back after a BRK.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakReport {
    pub code_lo: u8,
    pub code_hi: u8,
}

/// Why [`Emulator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunExit {
    Stopped,
    CycleBudget,
}

/// Progress of the post-BRK diagnostic reads, one CPU slot per state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakState {
    Idle,
    ReadLo,
    ReadHi,
    Report { code_lo: u8 },
}

pub struct Emulator {
    config: EmulatorConfig,
    bus: Bus,
    graphics_bus: Bus,
    ram: Ram,
    cartridge: Cartridge,
    cpu: CPU,
    ppu: Option<PPU>,
    cycle: u64,
    running: bool,
    break_state: BreakState,
    last_break: Option<BreakReport>,
}

impl Emulator {
    pub fn new(config: EmulatorConfig) -> Self {
        let ppu = config.video.then(PPU::new);
        Self {
            config,
            bus: Bus::new(),
            graphics_bus: Bus::new(),
            // 2 KiB internal RAM mirrored through $1FFF.
            ram: Ram::blank(0x0000, 0x1FFF, 0x07FF),
            cartridge: Cartridge::new(),
            cpu: CPU::new(),
            ppu,
            cycle: 0,
            running: false,
            break_state: BreakState::Idle,
            last_break: None,
        }
    }

    pub fn load_cartridge(&mut self, rom: &[u8]) -> Result<(), CartridgeError> {
        self.cartridge.load(rom)
    }

    /// Put the CPU at its entry point and begin accepting ticks.
    pub fn start(&mut self) {
        if let (Some(ppu), Some(header)) = (self.ppu.as_mut(), self.cartridge.header()) {
            ppu.set_mirroring(header.mirroring());
        }

        match self.config.entry_point {
            Some(pc) => self.cpu.power_on_at(pc, &mut self.bus),
            None => self.cpu.reset(),
        }

        self.cycle = 0;
        self.break_state = BreakState::Idle;
        self.last_break = None;
        self.running = true;
        info!(entry = ?self.config.entry_point, "emulation started");
    }

    /// Stop accepting ticks. Whatever the CPU was executing is abandoned; `start` resets it.
    pub fn stop(&mut self) {
        if self.running {
            info!(cycle = self.cycle, cpu_cycles = self.cpu.cycles, "emulation stopped");
        }
        self.running = false;
    }

    /// One master tick. Returns [`Signal::Break`] on the tick a BRK completes.
    pub fn clock(&mut self) -> Signal {
        if !self.running {
            return Signal::Running;
        }

        self.cycle += 1;
        let mut signal = Signal::Running;

        self.ram.clock(&mut self.bus);
        self.cartridge.clock(&mut self.bus, &mut self.graphics_bus);

        if self.cycle % self.config.cpu_divisor.get() == 0 {
            if self.break_state == BreakState::Idle {
                signal = self.cpu.clock(&mut self.bus);
                if signal == Signal::Break {
                    self.on_break();
                }
            } else {
                self.break_diagnostics();
            }
        }

        if self.cycle % self.config.ppu_divisor.get() == 0 {
            if let Some(ppu) = self.ppu.as_mut() {
                ppu.clock(&mut self.bus, &mut self.graphics_bus);
                if ppu.take_nmi() {
                    self.cpu.nmi();
                }
            }
        }

        signal
    }

    fn on_break(&mut self) {
        info!(
            pc = format_args!("{:04X}", self.cpu.pc),
            status = %flags::describe(self.cpu.status()),
            "BRK"
        );
        if self.config.break_diagnostics {
            self.break_state = BreakState::ReadLo;
        } else {
            self.stop();
        }
    }

    fn break_diagnostics(&mut self) {
        match self.break_state {
            BreakState::Idle => {}
            BreakState::ReadLo => {
                self.bus.read(BREAK_CODE_LO);
                self.break_state = BreakState::ReadHi;
            }
            BreakState::ReadHi => {
                let code_lo = self.bus.data();
                info!("break code lo: {code_lo:02X}");
                self.bus.read(BREAK_CODE_HI);
                self.break_state = BreakState::Report { code_lo };
            }
            BreakState::Report { code_lo } => {
                let code_hi = self.bus.data();
                info!("break code hi: {code_hi:02X}");
                self.last_break = Some(BreakReport { code_lo, code_hi });
                self.break_state = BreakState::Idle;
                self.stop();
            }
        }
    }

    /// Tick until stopped or until the CPU has run `max_cpu_cycles` more cycles.
    pub fn run(&mut self, max_cpu_cycles: u64) -> RunExit {
        let budget_end = self.cpu.cycles.saturating_add(max_cpu_cycles);
        while self.running {
            if self.cpu.cycles >= budget_end {
                return RunExit::CycleBudget;
            }
            self.clock();
        }
        RunExit::Stopped
    }

    pub fn set_trace_hook(&mut self, hook: Option<TraceHook>) {
        self.cpu.set_trace_hook(hook);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Master ticks since `start`.
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_break(&self) -> Option<BreakReport> {
        self.last_break
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn cpu(&self) -> &CPU {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut CPU {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn ppu(&self) -> Option<&PPU> {
        self.ppu.as_ref()
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new(EmulatorConfig::default())
    }
}
