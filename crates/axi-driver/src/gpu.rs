// SPDX-License-Identifier: AGPL-3.0-only

//! GPU command interface
//!
//! Thin layer over the register map in [`axi_chip::gpu`]: every method is a
//! short sequence of register writes followed, where the hardware needs it,
//! by a bounded poll of the busy bit.
//!
//! Drawing commands wait for the previous command to finish before loading
//! arguments, so back-to-back calls never clobber an executing command.

use crate::bus::RegisterBus;
use crate::config::Timing;
use crate::error::{AxiError, Result};
use axi_chip::gpu::{self as regs, Command, MathOp, Point};
use std::time::Instant;

/// Decoded GPU status register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuStatus {
    /// Raw register value
    pub raw: u32,
    /// A command is executing
    pub busy: bool,
    /// The last command completed
    pub done: bool,
}

impl GpuStatus {
    /// Decode a status word
    #[must_use]
    pub const fn from_register(raw: u32) -> Self {
        Self {
            raw,
            busy: raw & regs::status::BUSY != 0,
            done: raw & regs::status::DONE != 0,
        }
    }
}

impl std::fmt::Display for GpuStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:#010x} (busy={}, done={})",
            self.raw,
            u8::from(self.busy),
            u8::from(self.done)
        )
    }
}

/// GPU handle over a register window
#[derive(Debug)]
pub struct GpuDevice<B> {
    bus: B,
    timing: Timing,
}

impl<B: RegisterBus> GpuDevice<B> {
    /// Wrap a mapped GPU window
    pub const fn new(bus: B, timing: Timing) -> Self {
        Self { bus, timing }
    }

    /// Underlying register window
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Underlying register window, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the register window
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Identification register
    pub fn id(&self) -> u32 {
        self.bus.read32(regs::ID)
    }

    /// Whether the identification register holds [`regs::EXPECTED_ID`]
    pub fn id_matches(&self) -> bool {
        let id = self.id();
        if id != regs::EXPECTED_ID {
            tracing::warn!("Unexpected GPU ID {id:#010x} (expected {:#010x})", regs::EXPECTED_ID);
        }
        id == regs::EXPECTED_ID
    }

    /// Status register
    pub fn status(&self) -> GpuStatus {
        GpuStatus::from_register(self.bus.read32(regs::STATUS))
    }

    /// Control register
    pub fn control(&self) -> u32 {
        self.bus.read32(regs::CONTROL)
    }

    /// Write the control register
    pub fn set_control(&mut self, value: u32) {
        self.bus.write32(regs::CONTROL, value);
    }

    /// Colour register (low byte significant)
    pub fn color(&self) -> u8 {
        (self.bus.read32(regs::COLOR) & 0xFF) as u8
    }

    /// Write the colour register
    pub fn set_color(&mut self, color: u8) {
        self.bus.write32(regs::COLOR, u32::from(color));
    }

    /// Argument register `index` (0..4)
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    pub fn arg(&self, index: usize) -> u32 {
        self.bus.read32(regs::ARGS[index])
    }

    /// Write argument register `index` (0..4)
    ///
    /// # Panics
    ///
    /// Panics if `index >= 4`.
    pub fn set_arg(&mut self, index: usize, value: u32) {
        self.bus.write32(regs::ARGS[index], value);
    }

    /// Poll until the busy bit clears
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU stays busy past `command_timeout`.
    pub fn wait_ready(&self) -> Result<()> {
        let start = Instant::now();
        loop {
            let status = self.status();
            if !status.busy {
                return Ok(());
            }
            if start.elapsed() > self.timing.command_timeout {
                return Err(AxiError::timeout(
                    format!("GPU ready (status {status})"),
                    self.timing.command_timeout,
                ));
            }
            std::thread::sleep(self.timing.poll_interval);
        }
    }

    /// Start `command` once the GPU is idle
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if a previous command never finishes.
    pub fn issue(&mut self, command: Command) -> Result<()> {
        self.wait_ready()?;
        tracing::debug!("GPU command {command:?}");
        self.bus.write32(regs::CMD, command.code());
        Ok(())
    }

    /// Run `a op b` on the math unit and return the result register
    ///
    /// The result is returned as the hardware produced it; division by zero
    /// and overflow follow whatever the bitstream implements.
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the math unit never goes idle.
    pub fn math(&mut self, a: u32, b: u32, op: MathOp) -> Result<u32> {
        self.wait_ready()?;
        self.bus.write32(regs::MATH_A, a);
        self.bus.write32(regs::MATH_B, b);
        self.bus.write32(regs::MATH_OP, op.code());
        self.issue(Command::MathOp)?;
        self.wait_ready()?;
        let result = self.bus.read32(regs::MATH_RESULT);
        tracing::debug!("GPU math {a} {} {b} = {result}", op.symbol());
        Ok(result)
    }

    /// Fill the whole framebuffer with `color`
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU never goes idle.
    pub fn clear(&mut self, color: u8) -> Result<()> {
        self.wait_ready()?;
        self.set_color(color);
        self.issue(Command::Clear)
    }

    /// Fill the rectangle with corners `p0` and `p1` (inclusive)
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU never goes idle.
    pub fn fill_rect(&mut self, p0: Point, p1: Point, color: u8) -> Result<()> {
        self.two_point_command(Command::FillRect, p0, p1, color)
    }

    /// Draw a line from `p0` to `p1`
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU never goes idle.
    pub fn draw_line(&mut self, p0: Point, p1: Point, color: u8) -> Result<()> {
        self.two_point_command(Command::DrawLine, p0, p1, color)
    }

    /// Set one pixel
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU never goes idle.
    pub fn draw_pixel(&mut self, p: Point, color: u8) -> Result<()> {
        self.wait_ready()?;
        self.bus.write32(regs::ARG0, p.pack());
        self.set_color(color);
        self.issue(Command::DrawPixel)
    }

    /// Render the built-in Mandelbrot set
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU never goes idle.
    pub fn mandelbrot(&mut self) -> Result<()> {
        self.issue(Command::Mandelbrot)
    }

    /// Read one framebuffer pixel through the FB_READ/FB_DATA latch
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if a drawing command never finishes.
    ///
    /// # Panics
    ///
    /// Panics if `p` lies outside the framebuffer.
    pub fn read_pixel(&mut self, p: Point) -> Result<u8> {
        assert!(p.in_bounds(), "Pixel {p:?} outside framebuffer");
        self.wait_ready()?;
        self.bus.write32(regs::FB_READ, p.fb_addr());
        if !self.timing.settle.is_zero() {
            std::thread::sleep(self.timing.settle);
        }
        Ok((self.bus.read32(regs::FB_DATA) & 0xFF) as u8)
    }

    fn two_point_command(
        &mut self,
        command: Command,
        p0: Point,
        p1: Point,
        color: u8,
    ) -> Result<()> {
        self.wait_ready()?;
        self.bus.write32(regs::ARG0, p0.pack());
        self.bus.write32(regs::ARG1, p1.pack());
        self.set_color(color);
        self.issue(command)
    }
}
