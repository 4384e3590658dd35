// SPDX-License-Identifier: AGPL-3.0-only

//! Register model for the AXI-attached GPU and RISC-V soft-core.
//!
//! This crate has **no dependencies** and **no hardware access**. It is a
//! pure model of the fabric: window base addresses, register offsets, bit
//! definitions, framebuffer geometry and the handful of RV32I encodings the
//! diagnostics load into instruction memory.
//!
//! # Crate organisation
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`map`] | Physical windows (GPU @ `0x4300_0000`, CPU @ `0x4400_0000`, 64 KB each) |
//! | [`gpu`] | GPU register map, commands, math opcodes, coordinate packing |
//! | [`cpu`] | CPU control/status registers, debug block, instruction/data memory |
//! | [`rv32i`] | Minimal RV32I encoder for test programs |

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cpu;
pub mod gpu;
pub mod map;
pub mod rv32i;
