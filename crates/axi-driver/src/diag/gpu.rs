// SPDX-License-Identifier: AGPL-3.0-only

//! GPU checks

use super::{Check, Report};
use crate::bus::RegisterBus;
use crate::gpu::GpuDevice;
use axi_chip::gpu::{MathOp, Point, EXPECTED_ID};

/// Values written to ARG0..ARG3
pub const ARG_PATTERN: [u32; 4] = [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444];

/// `(a, b, op, expected)` for the math unit
pub const MATH_CASES: [(u32, u32, MathOp, u32); 4] = [
    (100, 50, MathOp::Add, 150),
    (100, 50, MathOp::Sub, 50),
    (12, 5, MathOp::Mul, 60),
    (100, 4, MathOp::Div, 25),
];

/// Pixels sampled after a clear, spread over the whole framebuffer
pub const CLEAR_SAMPLES: [Point; 10] = [
    Point::new(0, 0),
    Point::new(319, 0),
    Point::new(0, 199),
    Point::new(319, 199),
    Point::new(160, 100),
    Point::new(37, 151),
    Point::new(203, 42),
    Point::new(288, 117),
    Point::new(91, 66),
    Point::new(250, 183),
];

/// Run the GPU groups against `gpu`
pub fn run<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report, extended: bool) {
    basic(gpu, report);
    math(gpu, report);
    pixel(gpu, report);
    if extended {
        clear(gpu, report);
        draw(gpu, report);
    }
}

/// ID, status, and read-back of the plain storage registers
pub fn basic<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report) {
    report.section("GPU basic read/write");

    report.record("GPU ID", Ok(Check::expect_word(EXPECTED_ID, gpu.id())));
    report.record("GPU status", Ok(Check::info(gpu.status().to_string())));

    let control = 0x1234_5678;
    gpu.set_control(control);
    report.record("Control register", Ok(Check::expect_word(control, gpu.control())));

    let color = 0xFF;
    gpu.set_color(color);
    report.record(
        "Color register",
        Ok(Check::expect_word(u32::from(color), u32::from(gpu.color()))),
    );

    for (i, &value) in ARG_PATTERN.iter().enumerate() {
        gpu.set_arg(i, value);
        report.record(format!("ARG{i}"), Ok(Check::expect_word(value, gpu.arg(i))));
    }
}

/// Each math opcode once
pub fn math<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report) {
    report.section("GPU math unit");

    for (a, b, op, expected) in MATH_CASES {
        let name = format!("{}: {a} {} {b}", op.mnemonic(), op.symbol());
        let result = gpu.math(a, b, op).map(|r| Check::expect_value(expected, r));
        report.record(name, result);
    }
}

/// Draw one pixel and read it back through the framebuffer latch
pub fn pixel<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report) {
    report.section("GPU pixel draw");

    let p = Point::new(10, 20);
    let color = 0xFF;
    let result = gpu
        .draw_pixel(p, color)
        .and_then(|()| gpu.read_pixel(p))
        .map(|read| Check::expect_word(u32::from(color), u32::from(read)));
    report.record("Pixel (10, 20)", result);
}

/// Clear to white and sample
pub fn clear<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report) {
    report.section("GPU clear");

    let color = 0xFF;
    let result = gpu.clear(color).and_then(|()| {
        let mut wrong = Vec::new();
        for p in CLEAR_SAMPLES {
            let read = gpu.read_pixel(p)?;
            if read != color {
                wrong.push(format!("({},{})={read:#04x}", p.x, p.y));
            }
        }
        Ok(if wrong.is_empty() {
            Check::pass(format!("{} samples", CLEAR_SAMPLES.len()))
        } else {
            Check::fail(format!("{} error(s): {}", wrong.len(), wrong.join(" ")))
        })
    });
    report.record("Clear to 0xFF", result);
}

/// Fill a rectangle and read a pixel inside it; issue a line for coverage
pub fn draw<B: RegisterBus>(gpu: &mut GpuDevice<B>, report: &mut Report) {
    report.section("GPU drawing");

    let color = 0xAA;
    let result = gpu
        .clear(0x00)
        .and_then(|()| gpu.fill_rect(Point::new(50, 50), Point::new(100, 100), color))
        .and_then(|()| gpu.read_pixel(Point::new(75, 75)))
        .map(|read| Check::expect_word(u32::from(color), u32::from(read)));
    report.record("Rectangle (50,50)-(100,100)", result);

    let result = gpu
        .draw_line(Point::new(10, 10), Point::new(100, 50), 0x55)
        .and_then(|()| gpu.wait_ready())
        .map(|()| Check::pass("completed"));
    report.record("Line (10,10)-(100,50)", result);
}
