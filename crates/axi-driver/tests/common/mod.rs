// SPDX-License-Identifier: AGPL-3.0-only

//! Register-level test doubles
//!
//! Each double answers only the register traffic the driver generates; they
//! are not models of the hardware.

#![allow(dead_code)]

use axi_chip::cpu as cpu_regs;
use axi_chip::gpu::{self as gpu_regs, fb, Command, MathOp, Point};
use axi_driver::RegisterBus;

const WORDS: usize = 0x1_0000 / 4;

/// GPU window that executes commands synchronously on CMD writes
pub struct FakeGpu {
    regs: Vec<u32>,
    pub framebuffer: Vec<u8>,
    pub commands: Vec<u32>,
    fb_latch: u32,
}

impl FakeGpu {
    pub fn new() -> Self {
        let mut regs = vec![0; WORDS];
        regs[gpu_regs::ID / 4] = gpu_regs::EXPECTED_ID;
        Self {
            regs,
            framebuffer: vec![0; fb::PIXELS],
            commands: Vec::new(),
            fb_latch: 0,
        }
    }

    fn reg(&self, offset: usize) -> u32 {
        self.regs[offset / 4]
    }

    fn fill(&mut self, p0: Point, p1: Point, color: u8) {
        for y in p0.y.min(p1.y)..=p0.y.max(p1.y) {
            for x in p0.x.min(p1.x)..=p0.x.max(p1.x) {
                let p = Point::new(x, y);
                if p.in_bounds() {
                    self.framebuffer[p.fb_addr() as usize] = color;
                }
            }
        }
    }

    fn execute(&mut self, code: u32) {
        self.commands.push(code);
        let color = (self.reg(gpu_regs::COLOR) & 0xFF) as u8;
        let p0 = Point::unpack(self.reg(gpu_regs::ARG0));
        let p1 = Point::unpack(self.reg(gpu_regs::ARG1));

        if code == Command::Clear.code() {
            self.framebuffer.fill(color);
        } else if code == Command::FillRect.code() {
            self.fill(p0, p1, color);
        } else if code == Command::DrawPixel.code() {
            self.fill(p0, p0, color);
        } else if code == Command::DrawLine.code() {
            // endpoints are enough for the tests
            self.fill(p0, p0, color);
            self.fill(p1, p1, color);
        } else if code == Command::MathOp.code() {
            let a = self.reg(gpu_regs::MATH_A);
            let b = self.reg(gpu_regs::MATH_B);
            let op = self.reg(gpu_regs::MATH_OP);
            let result = match op {
                x if x == MathOp::Add.code() => a.wrapping_add(b),
                x if x == MathOp::Sub.code() => a.wrapping_sub(b),
                x if x == MathOp::Mul.code() => a.wrapping_mul(b),
                x if x == MathOp::Div.code() => a.checked_div(b).unwrap_or(0),
                _ => 0,
            };
            self.regs[gpu_regs::MATH_RESULT / 4] = result;
        }
        self.regs[gpu_regs::STATUS / 4] = gpu_regs::status::DONE;
    }
}

impl RegisterBus for FakeGpu {
    fn read32(&self, offset: usize) -> u32 {
        match offset {
            gpu_regs::FB_DATA => self.fb_latch,
            _ => self.reg(offset),
        }
    }

    fn write32(&mut self, offset: usize, value: u32) {
        match offset {
            gpu_regs::ID | gpu_regs::STATUS | gpu_regs::MATH_RESULT => {}
            gpu_regs::CMD => {
                self.regs[offset / 4] = value;
                self.execute(value);
            }
            gpu_regs::FB_READ => {
                self.regs[offset / 4] = value;
                self.fb_latch = self
                    .framebuffer
                    .get(value as usize)
                    .map_or(0, |&p| u32::from(p));
            }
            _ => self.regs[offset / 4] = value,
        }
    }

    fn size(&self) -> usize {
        WORDS * 4
    }
}

/// CPU window: reset clears the PC, run moves it past a ten-instruction program
pub struct FakeCpu {
    regs: Vec<u32>,
}

impl FakeCpu {
    pub fn new() -> Self {
        let mut regs = vec![0; WORDS];
        regs[cpu_regs::SIGNATURE / 4] = cpu_regs::EXPECTED_SIGNATURE;
        Self { regs }
    }
}

impl RegisterBus for FakeCpu {
    fn read32(&self, offset: usize) -> u32 {
        self.regs[offset / 4]
    }

    fn write32(&mut self, offset: usize, value: u32) {
        if offset == cpu_regs::SIGNATURE {
            return;
        }
        self.regs[offset / 4] = value;
        if offset == cpu_regs::CTRL {
            if value & cpu_regs::ctrl::RESET != 0 {
                self.regs[cpu_regs::PC / 4] = 0;
            }
            if value & cpu_regs::ctrl::RUN != 0 {
                self.regs[cpu_regs::PC / 4] += 10 * 4;
            }
        }
    }

    fn size(&self) -> usize {
        WORDS * 4
    }
}

/// Wraps a bus and silently drops every `n`th write
pub struct DropEvery<B> {
    pub inner: B,
    n: usize,
    seen: usize,
}

impl<B> DropEvery<B> {
    pub fn new(inner: B, n: usize) -> Self {
        Self { inner, n, seen: 0 }
    }
}

impl<B: RegisterBus> RegisterBus for DropEvery<B> {
    fn read32(&self, offset: usize) -> u32 {
        self.inner.read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        self.seen += 1;
        if self.seen % self.n != 0 {
            self.inner.write32(offset, value);
        }
    }

    fn size(&self) -> usize {
        self.inner.size()
    }
}

/// A zero-filled file of `len` bytes to map as a window
pub fn backing_file(len: u64) -> tempfile::NamedTempFile {
    let file = tempfile::NamedTempFile::new().expect("create temp file");
    file.as_file().set_len(len).expect("size temp file");
    file
}
