// SPDX-License-Identifier: AGPL-3.0-only

//! `axi-diag` — register diagnostics for the AXI GPU and RISC-V core.
//!
//! ```text
//! USAGE:
//!   axi-diag run [--gpu-only|--cpu-only] [--extended]   Run the check suite
//!   axi-diag peek <gpu|cpu|ADDR> <OFFSET>                 Read one register
//!   axi-diag poke <gpu|cpu|ADDR> <OFFSET> <VALUE>         Write one register
//!   axi-diag debug                                        CPU debug registers around test writes
//!   axi-diag demo [--pattern]                             Draw a scene
//!   axi-diag dump-fb [--ppm PATH] [--raw PATH]            Capture the framebuffer
//! ```
//!
//! Mapping `/dev/mem` needs root. Defaults come from `AXI_*` environment
//! variables; the global flags override them.

use anyhow::{bail, Context, Result};
use axi_chip::map::Window;
use axi_driver::config::parse_u64;
use axi_driver::diag::open_window;
use axi_driver::{
    run_suite, AxiConfig, AxiError, CpuDevice, DebugSnapshot, Framebuffer, GpuDevice,
    MappedRegion, Outcome, Report, Suite,
};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "axi-diag", about = "AXI GPU / RISC-V register diagnostics", version)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Args)]
struct Overrides {
    /// Physical memory device (default /dev/mem, or AXI_DEVICE).
    #[arg(long, global = true)]
    device: Option<PathBuf>,
    /// GPU window base address.
    #[arg(long, global = true, value_parser = hex_u64)]
    gpu_base: Option<u64>,
    /// CPU window base address.
    #[arg(long, global = true, value_parser = hex_u64)]
    cpu_base: Option<u64>,
    /// Bytes mapped per window.
    #[arg(long, global = true, value_parser = hex_u64)]
    window_size: Option<u64>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Run the register check suite.
    Run {
        /// Only check the GPU window.
        #[arg(long, conflicts_with = "cpu_only")]
        gpu_only: bool,
        /// Only check the CPU window.
        #[arg(long)]
        cpu_only: bool,
        /// Add clear/draw, signature, reset, program, and AXI transaction checks.
        #[arg(long)]
        extended: bool,
        /// Print values for passing checks too.
        #[arg(short, long)]
        verbose: bool,
    },
    /// Read one 32-bit register.
    Peek {
        /// `gpu`, `cpu`, or a page-aligned physical address.
        target: String,
        /// Byte offset within the window.
        #[arg(value_parser = hex_u64)]
        offset: u64,
    },
    /// Write one 32-bit register and read it back.
    Poke {
        /// `gpu`, `cpu`, or a page-aligned physical address.
        target: String,
        /// Byte offset within the window.
        #[arg(value_parser = hex_u64)]
        offset: u64,
        /// Value to write.
        #[arg(value_parser = hex_u64)]
        value: u64,
    },
    /// Show the CPU debug registers before and after a test write sequence.
    Debug,
    /// Draw the demo scene (or the test pattern) on the GPU.
    Demo {
        /// Draw colour bars and a border instead.
        #[arg(long)]
        pattern: bool,
    },
    /// Read back the whole framebuffer.
    DumpFb {
        /// Write a binary PPM image.
        #[arg(long)]
        ppm: Option<PathBuf>,
        /// Write width/height header plus raw bytes.
        #[arg(long)]
        raw: Option<PathBuf>,
    },
}

fn hex_u64(s: &str) -> std::result::Result<u64, String> {
    parse_u64("value", s).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            if let Some(axi) = e.downcast_ref::<AxiError>() {
                eprintln!("Error: {axi}");
                if let Some(hint) = axi.remediation() {
                    eprintln!("Hint : {hint}");
                }
            } else {
                eprintln!("Error: {e:?}");
            }
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when checks ran but some failed.
fn run(cli: Cli) -> Result<bool> {
    let config = load_config(cli.overrides)?;
    tracing::debug!(?config, "configuration");

    match cli.command {
        Cmd::Run { gpu_only, cpu_only, extended, verbose } => {
            let suite = Suite {
                gpu: !cpu_only,
                cpu: !gpu_only,
                extended,
            };
            cmd_run(&config, suite, verbose)
        }
        Cmd::Peek { target, offset } => cmd_peek(&config, &target, offset).map(|()| true),
        Cmd::Poke { target, offset, value } => cmd_poke(&config, &target, offset, value),
        Cmd::Debug => cmd_debug(&config).map(|()| true),
        Cmd::Demo { pattern } => cmd_demo(&config, pattern).map(|()| true),
        Cmd::DumpFb { ppm, raw } => cmd_dump_fb(&config, ppm, raw).map(|()| true),
    }
}

fn load_config(overrides: Overrides) -> Result<AxiConfig> {
    let mut config = AxiConfig::from_env()?;
    if let Some(device) = overrides.device {
        config.device = device;
    }
    if let Some(base) = overrides.gpu_base {
        config.gpu_base = base;
    }
    if let Some(base) = overrides.cpu_base {
        config.cpu_base = base;
    }
    if let Some(size) = overrides.window_size {
        config.window_size = usize::try_from(size).context("--window-size")?;
    }
    Ok(config)
}

// ─── run ──────────────────────────────────────────────────────────────────────

fn cmd_run(config: &AxiConfig, suite: Suite, verbose: bool) -> Result<bool> {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║  AXI Register Diagnostics                                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("Device : {}", config.device.display());
    if suite.gpu {
        println!("GPU    : {:#010x}", config.gpu_base);
    }
    if suite.cpu {
        println!("CPU    : {:#010x}", config.cpu_base);
    }

    let report = run_suite(config, suite)?;
    print_report(&report, verbose);
    Ok(report.is_success())
}

fn print_report(report: &Report, verbose: bool) {
    let mut section = "";
    for r in report.results() {
        if r.section != section {
            section = &r.section;
            println!();
            println!("{section}");
        }
        print!("  {:<50} ", r.name);
        match r.outcome {
            Outcome::Pass => {
                println!("✓ PASS");
                if verbose {
                    println!("         {}", r.detail);
                }
            }
            Outcome::Info => println!("ℹ {}", r.detail),
            Outcome::Fail => {
                println!("✗ FAIL");
                println!("         {}", r.detail);
            }
            Outcome::Error => {
                println!("✗ ERROR");
                println!("         {}", r.detail);
            }
        }
    }

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Result: {} passed, {} failed", report.passed(), report.failed());
    if report.is_success() {
        println!("All checks passed ✓");
    } else {
        println!("{} check(s) failed", report.failed());
    }
}

// ─── peek / poke ──────────────────────────────────────────────────────────────

fn open_target(config: &AxiConfig, target: &str) -> Result<MappedRegion> {
    let region = match target {
        "gpu" => open_window(config, Window::Gpu)?,
        "cpu" => open_window(config, Window::Cpu)?,
        addr => {
            let base = parse_u64("target", addr)?;
            MappedRegion::open_device(&config.device, base, config.window_size)?
        }
    };
    Ok(region)
}

/// Reject offsets the region accessors would panic on
fn register_offset(window_size: usize, offset: u64) -> Result<usize> {
    let offset = usize::try_from(offset).context("offset")?;
    if offset % 4 != 0 {
        bail!("offset {offset:#x} is not 4-byte aligned");
    }
    if offset.checked_add(4).is_none_or(|end| end > window_size) {
        bail!("offset {offset:#x} is outside the {window_size:#x}-byte window");
    }
    Ok(offset)
}

fn cmd_peek(config: &AxiConfig, target: &str, offset: u64) -> Result<()> {
    let region = open_target(config, target)?;
    let offset = register_offset(region.size(), offset)?;
    let value = region.read32(offset);
    println!("[{:#010x} + {offset:#06x}] = {value:#010x}", region.base());
    region.close()?;
    Ok(())
}

fn cmd_poke(config: &AxiConfig, target: &str, offset: u64, value: u64) -> Result<bool> {
    let value = u32::try_from(value).context("value does not fit in 32 bits")?;
    let mut region = open_target(config, target)?;
    let offset = register_offset(region.size(), offset)?;

    region.write32(offset, value);
    let read = region.read32(offset);
    println!("[{:#010x} + {offset:#06x}] <- {value:#010x}", region.base());
    println!("[{:#010x} + {offset:#06x}] = {read:#010x}", region.base());
    region.close()?;

    if read != value {
        println!("read-back differs (register may be read-only or self-clearing)");
    }
    Ok(read == value)
}

// ─── debug ────────────────────────────────────────────────────────────────────

const DEBUG_WRITES: [u32; 3] = [0xAAAA_AAAA, 0xBBBB_BBBB, 0xCCCC_CCCC];

fn cmd_debug(config: &AxiConfig) -> Result<()> {
    let region = open_window(config, Window::Cpu)?;
    let mut cpu = CpuDevice::new(region, config.timing);

    println!("Before:");
    print_snapshot(&cpu.debug());

    println!();
    for (i, &word) in DEBUG_WRITES.iter().enumerate() {
        println!("  write {word:#010x} -> IMEM[{i}]");
        cpu.write_instruction(i, word);
    }

    println!();
    println!("After:");
    print_snapshot(&cpu.debug());

    println!();
    println!("Read-back:");
    for (i, &word) in DEBUG_WRITES.iter().enumerate() {
        let read = cpu.read_instruction(i);
        let mark = if read == word { "✓" } else { "✗" };
        println!("  IMEM[{i}] = {read:#010x}  {mark}");
    }

    cpu.into_inner().close()?;
    Ok(())
}

fn print_snapshot(snapshot: &DebugSnapshot) {
    println!("{}", indent(&snapshot.to_string()));
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {line}")).collect::<Vec<_>>().join("\n")
}

// ─── demo / dump-fb ───────────────────────────────────────────────────────────

fn open_gpu(config: &AxiConfig) -> Result<GpuDevice<MappedRegion>> {
    let gpu = GpuDevice::new(open_window(config, Window::Gpu)?, config.timing);
    // logs a warning on mismatch; drawing is still attempted
    gpu.id_matches();
    Ok(gpu)
}

fn cmd_demo(config: &AxiConfig, pattern: bool) -> Result<()> {
    let mut gpu = open_gpu(config)?;
    if pattern {
        axi_driver::scene::test_pattern(&mut gpu)?;
        println!("Test pattern drawn");
    } else {
        axi_driver::scene::demo_scene(&mut gpu)?;
        println!("Demo scene drawn");
    }
    gpu.wait_ready()?;
    gpu.into_inner().close()?;
    Ok(())
}

fn cmd_dump_fb(config: &AxiConfig, ppm: Option<PathBuf>, raw: Option<PathBuf>) -> Result<()> {
    let mut gpu = open_gpu(config)?;
    println!("Reading {} pixels ...", axi_chip::gpu::fb::PIXELS);
    let frame = Framebuffer::capture(&mut gpu)?;
    gpu.into_inner().close()?;

    if ppm.is_none() && raw.is_none() {
        let nonzero = frame.pixels().iter().filter(|&&p| p != 0).count();
        println!("{}×{}: {nonzero} non-zero pixels", frame.width(), frame.height());
    }
    if let Some(path) = ppm {
        write_file(&path, |out| frame.write_ppm(out))?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = raw {
        write_file(&path, |out| frame.write_raw(out))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

fn write_file(
    path: &std::path::Path,
    write: impl FnOnce(&mut BufWriter<File>) -> axi_driver::Result<()>,
) -> Result<()> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    write(&mut out)?;
    out.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}
