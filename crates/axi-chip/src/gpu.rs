// SPDX-License-Identifier: AGPL-3.0-only

//! GPU register map.
//!
//! ```text
//! 0x00  ID           reads 0xABCD1234
//! 0x04  STATUS       bit0 busy, bit1 done
//! 0x08  CONTROL      scratch / mode bits
//! 0x0C  CMD          write a command code to start it
//! 0x10  ARG0..ARG3   command arguments (packed coordinates)
//! 0x20  COLOR        8-bit drawing colour
//! 0x40  FB_READ      write a framebuffer address to latch a pixel
//! 0x44  FB_DATA      latched pixel in bits 7:0
//! 0x80  MATH_A       operand A
//! 0x84  MATH_B       operand B
//! 0x88  MATH_OP      opcode (see [`MathOp`])
//! 0x8C  MATH_RESULT  result of the last MATH_OP command
//! ```

// ── Identity and status ──────────────────────────────────────────────────────

/// Identification register.
pub const ID: usize = 0x00;
/// Status register.
pub const STATUS: usize = 0x04;
/// Control register. Plain read/write storage on current bitstreams.
pub const CONTROL: usize = 0x08;

// ── Command interface ────────────────────────────────────────────────────────

/// Command register.
pub const CMD: usize = 0x0C;
/// First argument register.
pub const ARG0: usize = 0x10;
/// Second argument register.
pub const ARG1: usize = 0x14;
/// Third argument register.
pub const ARG2: usize = 0x18;
/// Fourth argument register.
pub const ARG3: usize = 0x1C;
/// All argument registers, in order.
pub const ARGS: [usize; 4] = [ARG0, ARG1, ARG2, ARG3];
/// Drawing colour register.
pub const COLOR: usize = 0x20;

// ── Framebuffer access ───────────────────────────────────────────────────────

/// Framebuffer read address latch.
pub const FB_READ: usize = 0x40;
/// Framebuffer read data.
pub const FB_DATA: usize = 0x44;

// ── Math unit ────────────────────────────────────────────────────────────────

/// Math operand A.
pub const MATH_A: usize = 0x80;
/// Math operand B.
pub const MATH_B: usize = 0x84;
/// Math opcode.
pub const MATH_OP: usize = 0x88;
/// Math result.
pub const MATH_RESULT: usize = 0x8C;

/// Value of the [`ID`] register.
pub const EXPECTED_ID: u32 = 0xABCD_1234;

/// Status register bits.
pub mod status {
    /// A command is executing.
    pub const BUSY: u32 = 1 << 0;
    /// The last command completed.
    pub const DONE: u32 = 1 << 1;
}

/// Framebuffer geometry.
pub mod fb {
    /// Width in pixels.
    pub const WIDTH: u16 = 320;
    /// Height in pixels.
    pub const HEIGHT: u16 = 200;
    /// Total pixel count.
    pub const PIXELS: usize = WIDTH as usize * HEIGHT as usize;
}

/// Command codes written to [`CMD`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum Command {
    /// No operation.
    Nop = 0x00,
    /// Fill the framebuffer with COLOR.
    Clear = 0x01,
    /// Fill the rectangle ARG0..=ARG1 with COLOR.
    FillRect = 0x02,
    /// Draw a line from ARG0 to ARG1 in COLOR.
    DrawLine = 0x03,
    /// Set the pixel at ARG0 to COLOR.
    DrawPixel = 0x04,
    /// Render the built-in Mandelbrot set.
    Mandelbrot = 0x05,
    /// Run the math unit on MATH_A, MATH_B, MATH_OP.
    MathOp = 0x06,
}

impl Command {
    /// Register encoding.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Math unit opcodes written to [`MATH_OP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum MathOp {
    /// A + B
    Add = 0x0,
    /// A - B
    Sub = 0x1,
    /// A * B
    Mul = 0x2,
    /// A / B
    Div = 0x3,
}

impl MathOp {
    /// Register encoding.
    #[must_use]
    pub const fn code(self) -> u32 {
        self as u32
    }

    /// Operator symbol for display.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Sub => '-',
            Self::Mul => '*',
            Self::Div => '/',
        }
    }

    /// Upper-case mnemonic.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Mul => "MUL",
            Self::Div => "DIV",
        }
    }
}

/// A framebuffer coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

impl Point {
    /// Create a point from column and row.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Argument-register encoding: row in the upper half, column in the lower.
    #[must_use]
    pub const fn pack(self) -> u32 {
        ((self.y as u32) << 16) | self.x as u32
    }

    /// Inverse of [`Point::pack`].
    #[must_use]
    pub const fn unpack(word: u32) -> Self {
        Self {
            x: (word & 0xFFFF) as u16,
            y: (word >> 16) as u16,
        }
    }

    /// Framebuffer address written to [`FB_READ`]: `row * WIDTH + column`.
    #[must_use]
    pub const fn fb_addr(self) -> u32 {
        self.y as u32 * fb::WIDTH as u32 + self.x as u32
    }

    /// Whether the point lies inside the framebuffer.
    #[must_use]
    pub const fn in_bounds(self) -> bool {
        self.x < fb::WIDTH && self.y < fb::HEIGHT
    }
}
