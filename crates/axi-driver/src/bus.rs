// SPDX-License-Identifier: AGPL-3.0-only

//! Register bus abstraction
//!
//! Device handles are generic over [`RegisterBus`] so the same GPU/CPU
//! routines drive a mapped `/dev/mem` window or any other word-addressed
//! register file.

use crate::mmio::MappedRegion;

/// Word-addressed 32-bit register window
///
/// Offsets are byte offsets; they must be 4-byte aligned and leave room for a
/// full word inside [`RegisterBus::size`]. Violations are programming errors
/// and implementations panic on them.
pub trait RegisterBus {
    /// Read the register at `offset`
    fn read32(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`
    fn write32(&mut self, offset: usize, value: u32);

    /// Window size in bytes
    fn size(&self) -> usize;

    /// Read-modify-write the register at `offset`, returning the new value
    fn modify32(&mut self, offset: usize, f: impl FnOnce(u32) -> u32) -> u32
    where
        Self: Sized,
    {
        let value = f(self.read32(offset));
        self.write32(offset, value);
        value
    }

    /// Write consecutive words starting at `offset`
    fn write_words(&mut self, offset: usize, words: &[u32]) {
        for (i, &word) in words.iter().enumerate() {
            self.write32(offset + i * 4, word);
        }
    }

    /// Read `count` consecutive words starting at `offset`
    fn read_words(&self, offset: usize, count: usize) -> Vec<u32> {
        (0..count).map(|i| self.read32(offset + i * 4)).collect()
    }
}

impl RegisterBus for MappedRegion {
    fn read32(&self, offset: usize) -> u32 {
        MappedRegion::read32(self, offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        MappedRegion::write32(self, offset, value);
    }

    fn size(&self) -> usize {
        MappedRegion::size(self)
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &mut B {
    fn read32(&self, offset: usize) -> u32 {
        (**self).read32(offset)
    }

    fn write32(&mut self, offset: usize, value: u32) {
        (**self).write32(offset, value);
    }

    fn size(&self) -> usize {
        (**self).size()
    }
}
