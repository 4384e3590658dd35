// SPDX-License-Identifier: AGPL-3.0-only

//! Physical address map of the AXI peripherals.
//!
//! ```text
//! Window  Base          Size    Peripheral
//! ─────── ───────────── ─────── ────────────────────────────────
//!  GPU    0x4300_0000   64 KB   2D accelerator + math unit
//!  CPU    0x4400_0000   64 KB   RV32I soft-core, imem/dmem window
//! ```
//!
//! Both windows sit behind the HPM0 AXI master of the processing system and
//! are reached from Linux through `/dev/mem`.

/// Size of each peripheral window in bytes.
pub const WINDOW_SIZE: usize = 0x1_0000;

/// GPU window.
pub mod gpu {
    /// Physical base address.
    pub const BASE: u64 = 0x4300_0000;
}

/// CPU window.
pub mod cpu {
    /// Physical base address.
    pub const BASE: u64 = 0x4400_0000;
}

/// The two peripherals on the fabric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    /// 2D accelerator.
    Gpu,
    /// RISC-V soft-core.
    Cpu,
}

impl Window {
    /// Default physical base address of this window.
    #[must_use]
    pub const fn base(self) -> u64 {
        match self {
            Self::Gpu => gpu::BASE,
            Self::Cpu => cpu::BASE,
        }
    }

    /// Short lowercase name, as used on the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Gpu => "gpu",
            Self::Cpu => "cpu",
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gpu => write!(f, "GPU"),
            Self::Cpu => write!(f, "CPU"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_do_not_overlap() {
        let gpu_end = gpu::BASE + WINDOW_SIZE as u64;
        assert!(gpu_end <= cpu::BASE);
    }

    #[test]
    fn windows_are_page_aligned() {
        assert_eq!(Window::Gpu.base() % 4096, 0);
        assert_eq!(Window::Cpu.base() % 4096, 0);
    }
}
