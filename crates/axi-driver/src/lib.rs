// SPDX-License-Identifier: AGPL-3.0-only

//! Register access and diagnostics for the AXI-attached GPU and RISC-V core.
//!
//! The core is [`MappedRegion`]: a shared read/write mapping of a physical
//! window through `/dev/mem`, with volatile little-endian 32-bit accessors.
//! Everything else is built on the [`RegisterBus`] trait it implements.
//!
//! ```text
//! MappedRegion (mmio)  ──impl──▶  RegisterBus (bus)
//!                                    │
//!                 ┌──────────────────┼──────────────────┐
//!            GpuDevice (gpu)    CpuDevice (cpu)    diag::axi
//!                 │                  │
//!     Framebuffer, scene        diag::cpu
//!            diag::gpu
//! ```
//!
//! # Quick start
//!
//! ```no_run
//! use axi_driver::{AxiConfig, GpuDevice, MappedRegion};
//! use axi_chip::gpu::MathOp;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AxiConfig::from_env()?;
//! let region = MappedRegion::open(config.gpu_base, config.window_size)?;
//! let mut gpu = GpuDevice::new(region, config.timing);
//!
//! println!("GPU ID {:#010x}", gpu.id());
//! assert_eq!(gpu.math(100, 4, MathOp::Div)?, 25);
//! gpu.into_inner().close()?;
//! # Ok(())
//! # }
//! ```
//!
//! Mapping `/dev/mem` needs root; without it every open fails with
//! [`AxiError::PermissionDenied`].

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]

mod bus;
pub mod config;
mod cpu;
pub mod diag;
mod error;
mod framebuffer;
mod gpu;
pub mod mmio;
pub mod scene;

pub use bus::RegisterBus;
pub use config::{AxiConfig, Timing};
pub use cpu::{CpuDevice, DebugSnapshot};
pub use diag::{run_suite, Check, CheckResult, Outcome, Report, Suite};
pub use error::{AxiError, Result};
pub use framebuffer::Framebuffer;
pub use gpu::{GpuDevice, GpuStatus};
pub use mmio::MappedRegion;

/// Commonly used types.
pub mod prelude {
    pub use crate::{
        AxiConfig, AxiError, CpuDevice, Framebuffer, GpuDevice, MappedRegion, RegisterBus,
        Report, Result, Suite, Timing,
    };
}
