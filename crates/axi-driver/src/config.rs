// SPDX-License-Identifier: AGPL-3.0-only

//! Runtime configuration
//!
//! Defaults describe the reference bitstream. Every value can be overridden
//! from the environment, and the CLI layers its flags on top:
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `AXI_DEVICE` | `/dev/mem` | Device the windows are mapped from |
//! | `AXI_GPU_BASE` | `0x4300_0000` | GPU window base |
//! | `AXI_CPU_BASE` | `0x4400_0000` | CPU window base |
//! | `AXI_WINDOW_SIZE` | `0x1_0000` | Bytes mapped per window |
//! | `AXI_SETTLE_US` | `10` | Delay between a framebuffer read request and its data |
//! | `AXI_TIMEOUT_MS` | `1000` | Longest wait for a GPU command to finish |
//!
//! Numbers accept decimal or `0x` hex, with optional `_` separators.

use crate::error::{AxiError, Result};
use axi_chip::map::{self, Window};
use std::path::PathBuf;
use std::time::Duration;

/// Device-side delays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Wait after latching a framebuffer address before reading FB_DATA
    pub settle: Duration,
    /// How long the CPU reset bit is held
    pub reset_hold: Duration,
    /// Interval between status polls
    pub poll_interval: Duration,
    /// Upper bound on a GPU command
    pub command_timeout: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_micros(10),
            reset_hold: Duration::from_millis(1),
            poll_interval: Duration::from_micros(100),
            command_timeout: Duration::from_secs(1),
        }
    }
}

impl Timing {
    /// No delays at all; for register files that respond immediately
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            reset_hold: Duration::ZERO,
            poll_interval: Duration::ZERO,
            command_timeout: Duration::from_millis(100),
        }
    }
}

/// Where the peripherals live and how to talk to them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxiConfig {
    /// Device the windows are mapped from
    pub device: PathBuf,
    /// GPU window base
    pub gpu_base: u64,
    /// CPU window base
    pub cpu_base: u64,
    /// Bytes mapped per window
    pub window_size: usize,
    /// Device-side delays
    pub timing: Timing,
}

impl Default for AxiConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(crate::mmio::DEV_MEM),
            gpu_base: map::gpu::BASE,
            cpu_base: map::cpu::BASE,
            window_size: map::WINDOW_SIZE,
            timing: Timing::default(),
        }
    }
}

impl AxiConfig {
    /// Defaults overridden by `AXI_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::InvalidConfig`] if a variable is set but unparsable.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `AXI_*` key
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::InvalidConfig`] if a value is unparsable.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(device) = lookup("AXI_DEVICE") {
            config.device = PathBuf::from(device);
        }
        if let Some(v) = lookup("AXI_GPU_BASE") {
            config.gpu_base = parse_u64("AXI_GPU_BASE", &v)?;
        }
        if let Some(v) = lookup("AXI_CPU_BASE") {
            config.cpu_base = parse_u64("AXI_CPU_BASE", &v)?;
        }
        if let Some(v) = lookup("AXI_WINDOW_SIZE") {
            config.window_size = parse_usize("AXI_WINDOW_SIZE", &v)?;
        }
        if let Some(v) = lookup("AXI_SETTLE_US") {
            config.timing.settle = Duration::from_micros(parse_u64("AXI_SETTLE_US", &v)?);
        }
        if let Some(v) = lookup("AXI_TIMEOUT_MS") {
            config.timing.command_timeout =
                Duration::from_millis(parse_u64("AXI_TIMEOUT_MS", &v)?);
        }

        tracing::debug!("Configuration: {config:?}");
        Ok(config)
    }

    /// Base address of `window`
    #[must_use]
    pub const fn base(&self, window: Window) -> u64 {
        match window {
            Window::Gpu => self.gpu_base,
            Window::Cpu => self.cpu_base,
        }
    }
}

/// Parse a decimal or `0x`-prefixed hex number, ignoring `_` separators
///
/// # Errors
///
/// Returns [`AxiError::InvalidConfig`] naming `key` if `value` is not a number.
pub fn parse_u64(key: &str, value: &str) -> Result<u64> {
    let cleaned: String = value.trim().chars().filter(|&c| c != '_').collect();
    let parsed = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => cleaned.parse::<u64>(),
    };
    parsed.map_err(|e| AxiError::invalid_config(key, format!("{value:?}: {e}")))
}

/// [`parse_u64`] narrowed to `usize`
///
/// # Errors
///
/// Returns [`AxiError::InvalidConfig`] if `value` is not a number or does not fit.
pub fn parse_usize(key: &str, value: &str) -> Result<usize> {
    let wide = parse_u64(key, value)?;
    usize::try_from(wide).map_err(|e| AxiError::invalid_config(key, format!("{value:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_reference_bitstream() {
        let c = AxiConfig::default();
        assert_eq!(c.device, PathBuf::from("/dev/mem"));
        assert_eq!(c.gpu_base, 0x4300_0000);
        assert_eq!(c.cpu_base, 0x4400_0000);
        assert_eq!(c.window_size, 0x1_0000);
        assert_eq!(c.base(Window::Cpu), 0x4400_0000);
    }

    #[test]
    fn environment_overrides() {
        let c = AxiConfig::from_lookup(lookup(&[
            ("AXI_DEVICE", "/dev/uio0"),
            ("AXI_GPU_BASE", "0x4000_0000"),
            ("AXI_WINDOW_SIZE", "4096"),
            ("AXI_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        assert_eq!(c.device, PathBuf::from("/dev/uio0"));
        assert_eq!(c.gpu_base, 0x4000_0000);
        assert_eq!(c.cpu_base, 0x4400_0000);
        assert_eq!(c.window_size, 4096);
        assert_eq!(c.timing.command_timeout, Duration::from_millis(250));
    }

    #[test]
    fn bad_value_names_the_variable() {
        let err = AxiConfig::from_lookup(lookup(&[("AXI_CPU_BASE", "0xZZ")])).unwrap_err();
        match err {
            AxiError::InvalidConfig { key, .. } => assert_eq!(key, "AXI_CPU_BASE"),
            other => panic!("expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn number_formats() {
        assert_eq!(parse_u64("k", "0x10").unwrap(), 16);
        assert_eq!(parse_u64("k", "0X1_0").unwrap(), 16);
        assert_eq!(parse_u64("k", " 1_000 ").unwrap(), 1000);
        assert!(parse_u64("k", "").is_err());
        assert!(parse_u64("k", "-1").is_err());
    }
}
