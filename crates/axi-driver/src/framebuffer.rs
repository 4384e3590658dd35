// SPDX-License-Identifier: AGPL-3.0-only

//! Framebuffer capture
//!
//! The GPU exposes its framebuffer one pixel at a time through the
//! FB_READ/FB_DATA latch, so a full capture is 64 000 register round trips.
//! Pixels are 8-bit and rendered as grayscale.

use crate::bus::RegisterBus;
use crate::error::{AxiError, Result};
use crate::gpu::GpuDevice;
use axi_chip::gpu::{fb, Point};
use std::io::Write;

/// A captured 320×200 framebuffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
}

impl Framebuffer {
    /// Read every pixel from the GPU
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Timeout`] if the GPU stays busy.
    pub fn capture<B: RegisterBus>(gpu: &mut GpuDevice<B>) -> Result<Self> {
        let mut pixels = Vec::with_capacity(fb::PIXELS);
        for y in 0..fb::HEIGHT {
            if y % 20 == 0 {
                tracing::debug!("Capturing row {y}/{}", fb::HEIGHT);
            }
            for x in 0..fb::WIDTH {
                pixels.push(gpu.read_pixel(Point::new(x, y))?);
            }
        }
        tracing::info!("Captured {}×{} framebuffer", fb::WIDTH, fb::HEIGHT);
        Ok(Self {
            width: fb::WIDTH,
            height: fb::HEIGHT,
            pixels,
        })
    }

    /// Build from raw row-major pixels
    ///
    /// Returns `None` unless `pixels.len() == width * height`.
    #[must_use]
    pub fn from_pixels(width: u16, height: u16, pixels: Vec<u8>) -> Option<Self> {
        (pixels.len() == usize::from(width) * usize::from(height)).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Width in pixels
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    /// Height in pixels
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Pixel at column `x`, row `y`
    #[must_use]
    pub fn pixel(&self, x: u16, y: u16) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(usize::from(y) * usize::from(self.width) + usize::from(x))
            .copied()
    }

    /// Row-major pixel data
    #[must_use]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Write as binary PPM (P6), grayscale expanded to RGB
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Io`] if the writer fails.
    pub fn write_ppm(&self, mut out: impl Write) -> Result<()> {
        let write = |out: &mut dyn Write| -> std::io::Result<()> {
            write!(out, "P6\n{} {}\n255\n", self.width, self.height)?;
            for &p in &self.pixels {
                out.write_all(&[p, p, p])?;
            }
            out.flush()
        };
        write(&mut out).map_err(|e| AxiError::io("Writing PPM", e))
    }

    /// Write width and height as little-endian `i32`, then one byte per pixel
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Io`] if the writer fails.
    pub fn write_raw(&self, mut out: impl Write) -> Result<()> {
        let write = |out: &mut dyn Write| -> std::io::Result<()> {
            out.write_all(&i32::from(self.width).to_le_bytes())?;
            out.write_all(&i32::from(self.height).to_le_bytes())?;
            out.write_all(&self.pixels)?;
            out.flush()
        };
        write(&mut out).map_err(|e| AxiError::io("Writing raw framebuffer", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient() -> Framebuffer {
        let pixels = (0..6u8).collect();
        Framebuffer::from_pixels(3, 2, pixels).unwrap()
    }

    #[test]
    fn from_pixels_checks_length() {
        assert!(Framebuffer::from_pixels(3, 2, vec![0; 5]).is_none());
    }

    #[test]
    fn pixel_lookup_is_row_major() {
        let fb = gradient();
        assert_eq!(fb.pixel(0, 0), Some(0));
        assert_eq!(fb.pixel(2, 1), Some(5));
        assert_eq!(fb.pixel(3, 0), None);
    }

    #[test]
    fn ppm_header_and_rgb_expansion() {
        let mut out = Vec::new();
        gradient().write_ppm(&mut out).unwrap();
        let header = b"P6\n3 2\n255\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(out.len(), header.len() + 6 * 3);
        assert_eq!(&out[header.len() + 15..], &[5, 5, 5]);
    }

    #[test]
    fn raw_layout() {
        let mut out = Vec::new();
        gradient().write_raw(&mut out).unwrap();
        assert_eq!(&out[..8], &[3, 0, 0, 0, 2, 0, 0, 0]);
        assert_eq!(&out[8..], &[0, 1, 2, 3, 4, 5]);
    }
}
