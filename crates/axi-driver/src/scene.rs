// SPDX-License-Identifier: AGPL-3.0-only

//! Canned drawings for eyeballing the GPU output
//!
//! Both scenes are composed only of CLEAR, FILL_RECT and DRAW_LINE commands;
//! view the result with `axi-diag dump-fb`.

use crate::bus::RegisterBus;
use crate::error::Result;
use crate::gpu::GpuDevice;
use axi_chip::gpu::{fb, Point};

const WHITE: u8 = 0xFF;
const GREY: u8 = 0x80;

const fn p(x: u16, y: u16) -> Point {
    Point::new(x, y)
}

/// Pong court: gradient background, paddles, ball, dashed net, borders and a
/// blocky "PO" title
///
/// # Errors
///
/// Returns [`crate::AxiError::Timeout`] if the GPU stays busy.
pub fn demo_scene<B: RegisterBus>(gpu: &mut GpuDevice<B>) -> Result<()> {
    let (w, h) = (fb::WIDTH, fb::HEIGHT);

    tracing::info!("Drawing demo scene");
    gpu.clear(0x00)?;

    for i in 0..8u16 {
        let color = (i * 32) as u8;
        gpu.fill_rect(p(0, i * 25), p(w - 1, (i + 1) * 25 - 1), color)?;
    }

    // paddles and ball
    gpu.fill_rect(p(20, 70), p(30, 130), WHITE)?;
    gpu.fill_rect(p(289, 50), p(299, 110), WHITE)?;
    gpu.fill_rect(p(155, 95), p(165, 105), WHITE)?;

    for y in (0..h).step_by(10) {
        gpu.draw_line(p(w / 2, y), p(w / 2, y + 5), GREY)?;
    }

    gpu.draw_line(p(0, 0), p(w - 1, 0), WHITE)?;
    gpu.draw_line(p(0, h - 1), p(w - 1, h - 1), WHITE)?;

    // P
    gpu.fill_rect(p(130, 10), p(135, 30), WHITE)?;
    gpu.fill_rect(p(135, 10), p(145, 15), WHITE)?;
    gpu.fill_rect(p(135, 18), p(145, 23), WHITE)?;
    gpu.fill_rect(p(145, 10), p(150, 23), WHITE)?;
    // O
    gpu.fill_rect(p(155, 10), p(160, 30), WHITE)?;
    gpu.fill_rect(p(160, 10), p(170, 15), WHITE)?;
    gpu.fill_rect(p(160, 25), p(170, 30), WHITE)?;
    gpu.fill_rect(p(170, 10), p(175, 30), WHITE)?;

    gpu.wait_ready()
}

/// Eight vertical colour bars inside a one-pixel white border
///
/// # Errors
///
/// Returns [`crate::AxiError::Timeout`] if the GPU stays busy.
pub fn test_pattern<B: RegisterBus>(gpu: &mut GpuDevice<B>) -> Result<()> {
    let (w, h) = (fb::WIDTH, fb::HEIGHT);
    let bar = w / 8;

    tracing::info!("Drawing test pattern");
    gpu.clear(0x00)?;

    for i in 0..8u16 {
        let color = (i * 32) as u8;
        gpu.fill_rect(p(i * bar, 0), p((i + 1) * bar - 1, h - 1), color)?;
    }

    gpu.draw_line(p(0, 0), p(w - 1, 0), WHITE)?;
    gpu.draw_line(p(0, h - 1), p(w - 1, h - 1), WHITE)?;
    gpu.draw_line(p(0, 0), p(0, h - 1), WHITE)?;
    gpu.draw_line(p(w - 1, 0), p(w - 1, h - 1), WHITE)?;

    gpu.wait_ready()
}
