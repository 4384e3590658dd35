// SPDX-License-Identifier: AGPL-3.0-only

//! RISC-V soft-core register map.
//!
//! ```text
//! 0x00  CTRL          bit0 run, bit1 reset, bit2 single-step
//! 0x04  STATUS        core status word
//! 0x08  PC            program counter (writable while halted)
//! 0x0C  REG           register-file peek
//! 0x30  DBG_ADDR      address of the last AXI write seen by the core
//! 0x34  DBG_DATA      data of the last AXI write
//! 0x38  DBG_COUNT     number of AXI writes since reset
//! 0x3C  DBG_STATE     write-channel FSM state / "RISC" signature
//! 0x40  IMEM[0..16]   instruction memory
//! 0x80  DMEM[..]      data memory
//! ```
//!
//! `0x3C` is shared: bitstreams built with the debug block expose the write
//! FSM state there, older ones return the ASCII signature `"RISC"`.

/// Control register.
pub const CTRL: usize = 0x00;
/// Status register.
pub const STATUS: usize = 0x04;
/// Program counter.
pub const PC: usize = 0x08;
/// Register-file peek.
pub const REG: usize = 0x0C;

// ── Debug block ──────────────────────────────────────────────────────────────

/// Address of the last AXI write.
pub const DEBUG_LAST_ADDR: usize = 0x30;
/// Data of the last AXI write.
pub const DEBUG_LAST_DATA: usize = 0x34;
/// AXI write counter.
pub const DEBUG_WRITE_COUNT: usize = 0x38;
/// Write-channel state.
pub const DEBUG_STATE: usize = 0x3C;
/// Signature register (aliases [`DEBUG_STATE`]).
pub const SIGNATURE: usize = 0x3C;

/// `"RISC"` in ASCII.
pub const EXPECTED_SIGNATURE: u32 = 0x5249_5343;

// ── Memories ─────────────────────────────────────────────────────────────────

/// First word of instruction memory.
pub const INSTR_BASE: usize = 0x40;
/// Instruction memory capacity in words.
pub const INSTR_WORDS: usize = (DATA_BASE - INSTR_BASE) / 4;
/// First word of data memory.
pub const DATA_BASE: usize = 0x80;

/// Control register bits.
pub mod ctrl {
    /// Run continuously.
    pub const RUN: u32 = 1 << 0;
    /// Hold the core in reset.
    pub const RESET: u32 = 1 << 1;
    /// Execute a single instruction.
    pub const STEP: u32 = 1 << 2;
}

/// Byte offset of instruction word `index`.
#[must_use]
pub const fn instr_offset(index: usize) -> usize {
    INSTR_BASE + index * 4
}

/// Byte offset of data word `index`.
#[must_use]
pub const fn data_offset(index: usize) -> usize {
    DATA_BASE + index * 4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_layout() {
        assert_eq!(INSTR_WORDS, 16);
        assert_eq!(instr_offset(2), 0x48);
        assert_eq!(data_offset(3), 0x8C);
    }

    #[test]
    fn signature_is_ascii_risc() {
        assert_eq!(&EXPECTED_SIGNATURE.to_be_bytes(), b"RISC");
    }
}
