// SPDX-License-Identifier: AGPL-3.0-only

//! Register-level diagnostics
//!
//! Every check is a write/read-back pair (or a command followed by a result
//! read) against a live register window. Results are collected into a
//! [`Report`]; nothing here prints.
//!
//! | Group | Checks | Suite |
//! |-------|--------|-------|
//! | GPU basic | ID, status, control/colour/argument read-back | core |
//! | GPU math | ADD, SUB, MUL, DIV | core |
//! | GPU pixel | draw (10,20) and read back | core |
//! | GPU clear / draw | clear sampling, rectangle fill | extended |
//! | CPU basic | status, PC, control, PC read-back | core |
//! | CPU memories | instruction and data read-back | core |
//! | CPU signature / reset / program | "RISC", PC after reset, PC advances | extended |
//! | AXI transactions | ordering and burst read-back in IMEM | extended |

pub mod axi;
pub mod cpu;
pub mod gpu;

use crate::config::AxiConfig;
use crate::cpu::CpuDevice;
use crate::error::Result;
use crate::gpu::GpuDevice;
use crate::mmio::MappedRegion;
use axi_chip::map::Window;

/// How a check ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Read-back matched
    Pass,
    /// Read-back did not match
    Fail,
    /// Value reported without an expectation
    Info,
    /// The check could not complete
    Error,
}

/// Result of one check body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Outcome
    pub outcome: Outcome,
    /// Human-readable values
    pub detail: String,
}

impl Check {
    /// Passing check
    pub fn pass(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Pass,
            detail: detail.into(),
        }
    }

    /// Failing check
    pub fn fail(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Fail,
            detail: detail.into(),
        }
    }

    /// Informational reading
    pub fn info(detail: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Info,
            detail: detail.into(),
        }
    }

    /// Pass if `actual == expected`, reporting both in hex
    pub fn expect_word(expected: u32, actual: u32) -> Self {
        if actual == expected {
            Self::pass(format!("{actual:#010x}"))
        } else {
            Self::fail(format!("expected {expected:#010x}, read {actual:#010x}"))
        }
    }

    /// Pass if `actual == expected`, reporting both in decimal
    pub fn expect_value(expected: u32, actual: u32) -> Self {
        if actual == expected {
            Self::pass(format!("{actual}"))
        } else {
            Self::fail(format!("expected {expected}, got {actual}"))
        }
    }

    /// Pass only if every word in `written` read back unchanged
    pub fn expect_words(base: usize, written: &[u32], read: &[u32]) -> Self {
        let mismatches: Vec<String> = written
            .iter()
            .zip(read)
            .enumerate()
            .filter(|(_, (w, r))| w != r)
            .map(|(i, (w, r))| format!("[{:#05x}] wrote {w:#010x} read {r:#010x}", base + i * 4))
            .collect();
        if mismatches.is_empty() && written.len() == read.len() {
            Self::pass(format!("{} word(s) from {base:#05x}", written.len()))
        } else {
            Self::fail(mismatches.join("; "))
        }
    }
}

/// One recorded check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    /// Group the check belongs to
    pub section: String,
    /// Check name
    pub name: String,
    /// Outcome
    pub outcome: Outcome,
    /// Values read, or the error that stopped the check
    pub detail: String,
}

/// Collected check results
#[derive(Debug, Clone, Default)]
pub struct Report {
    section: String,
    results: Vec<CheckResult>,
}

impl Report {
    /// Empty report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new group; later checks are filed under `title`
    pub fn section(&mut self, title: impl Into<String>) {
        self.section = title.into();
    }

    /// Record a check body's result; errors become [`Outcome::Error`]
    pub fn record(&mut self, name: impl Into<String>, result: Result<Check>) {
        let name = name.into();
        let (outcome, detail) = match result {
            Ok(check) => (check.outcome, check.detail),
            Err(e) => (Outcome::Error, e.to_string()),
        };
        match outcome {
            Outcome::Pass | Outcome::Info => tracing::debug!("{name}: {outcome:?} {detail}"),
            Outcome::Fail | Outcome::Error => tracing::warn!("{name}: {outcome:?} {detail}"),
        }
        self.results.push(CheckResult {
            section: self.section.clone(),
            name,
            outcome,
            detail,
        });
    }

    /// All results in execution order
    #[must_use]
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Results with the given outcome
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(move |r| r.outcome == outcome)
    }

    /// Number of passing checks
    #[must_use]
    pub fn passed(&self) -> usize {
        self.with_outcome(Outcome::Pass).count()
    }

    /// Number of failed or errored checks
    #[must_use]
    pub fn failed(&self) -> usize {
        self.with_outcome(Outcome::Fail).count() + self.with_outcome(Outcome::Error).count()
    }

    /// No check failed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Look up a check by name
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }
}

/// Which groups to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Suite {
    /// Run the GPU groups
    pub gpu: bool,
    /// Run the CPU groups
    pub cpu: bool,
    /// Include the extended groups
    pub extended: bool,
}

impl Default for Suite {
    fn default() -> Self {
        Self {
            gpu: true,
            cpu: true,
            extended: false,
        }
    }
}

impl Suite {
    /// Every group
    #[must_use]
    pub const fn full() -> Self {
        Self {
            gpu: true,
            cpu: true,
            extended: true,
        }
    }
}

/// Map one window described by `config`
///
/// # Errors
///
/// Propagates [`crate::AxiError::PermissionDenied`] and [`crate::AxiError::Io`] from the mapping.
pub fn open_window(config: &AxiConfig, window: Window) -> Result<MappedRegion> {
    MappedRegion::open_device(&config.device, config.base(window), config.window_size)
}

/// Map each selected window, run its groups, and unmap it
///
/// # Errors
///
/// Mapping failures abort the run; check failures are recorded in the report.
pub fn run_suite(config: &AxiConfig, suite: Suite) -> Result<Report> {
    let mut report = Report::new();

    if suite.gpu {
        let region = open_window(config, Window::Gpu)?;
        let mut gpu = GpuDevice::new(region, config.timing);
        gpu::run(&mut gpu, &mut report, suite.extended);
        gpu.into_inner().close()?;
    }

    if suite.cpu {
        let region = open_window(config, Window::Cpu)?;
        let mut cpu = CpuDevice::new(region, config.timing);
        cpu::run(&mut cpu, &mut report, suite.extended);
        if suite.extended {
            axi::run(cpu.bus_mut(), &mut report);
        }
        cpu.into_inner().close()?;
    }

    tracing::info!(
        "Suite finished: {} passed, {} failed",
        report.passed(),
        report.failed()
    );
    Ok(report)
}
