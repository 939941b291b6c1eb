//! Command-line runner.
//!
//! Loads an iNES image, runs it until BRK or a cycle budget, and optionally prints the
//! nestest-style instruction trace.
//! Usage: microcycle [OPTIONS] <ROM>

use std::{fs, io, num::NonZeroU64, path::PathBuf};

use ansi_term::Colour::{Green, Red, Yellow};
use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use microcycle::{
    cpu::{flags, trace::TraceEntry},
    emulator::{DEFAULT_CPU_DIVISOR, DEFAULT_PPU_DIVISOR, Emulator, EmulatorConfig, RunExit},
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// iNES image to run
    rom: PathBuf,

    /// Start here in the power-on state instead of resetting (hex, e.g. C000 for nestest)
    #[arg(long, value_parser = parse_hex_u16)]
    entry: Option<u16>,

    /// Master ticks per CPU clock
    #[arg(long, default_value_t = DEFAULT_CPU_DIVISOR)]
    cpu_divisor: NonZeroU64,

    /// Master ticks per PPU dot
    #[arg(long, default_value_t = DEFAULT_PPU_DIVISOR)]
    ppu_divisor: NonZeroU64,

    /// Run without the PPU attached
    #[arg(long)]
    no_video: bool,

    /// Stop after this many CPU cycles
    #[arg(long, default_value_t = 100_000_000)]
    max_cycles: u64,

    /// Print one trace line per instruction to stdout
    #[arg(long)]
    trace: bool,
}

fn parse_hex_u16(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches("0x").trim_start_matches('$');
    u16::from_str_radix(digits, 16).map_err(|e| format!("`{s}` is not a 16-bit hex address: {e}"))
}

fn main() {
    if let Err(err) = run() {
        eprintln!("{} {err:#}", Red.bold().paint("ERROR"));
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read {}", args.rom.display()))?;

    let config = EmulatorConfig {
        cpu_divisor: args.cpu_divisor,
        ppu_divisor: args.ppu_divisor,
        entry_point: args.entry,
        video: !args.no_video,
        ..EmulatorConfig::default()
    };
    let mut emulator = Emulator::new(config);
    emulator
        .load_cartridge(&rom)
        .with_context(|| format!("failed to load {}", args.rom.display()))?;

    if args.trace {
        emulator.set_trace_hook(Some(Box::new(|entry: &TraceEntry| println!("{entry}"))));
    }

    info!(rom = %args.rom.display(), "loaded");
    emulator.start();
    let exit = emulator.run(args.max_cycles);

    let cpu = emulator.cpu();
    let summary = format!(
        "PC:{:04X} A:{:02X} X:{:02X} Y:{:02X} SP:{:02X} P:{} CYC:{}",
        cpu.pc,
        cpu.a,
        cpu.x,
        cpu.y,
        cpu.sp,
        flags::describe(cpu.status()),
        cpu.cycles
    );

    match (exit, emulator.last_break()) {
        (RunExit::Stopped, Some(report)) if report.code_lo == 0 && report.code_hi == 0 => {
            eprintln!("{} BRK, result 00 00  {summary}", Green.bold().paint("PASS"));
        }
        (RunExit::Stopped, Some(report)) => {
            eprintln!(
                "{} BRK, result {:02X} {:02X}  {summary}",
                Red.bold().paint("FAIL"),
                report.code_lo,
                report.code_hi
            );
        }
        (RunExit::Stopped, None) => {
            eprintln!("{} stopped  {summary}", Yellow.bold().paint("STOP"));
        }
        (RunExit::CycleBudget, _) => {
            eprintln!(
                "{} cycle budget of {} exhausted  {summary}",
                Yellow.bold().paint("STOP"),
                args.max_cycles
            );
        }
    }

    Ok(())
}
