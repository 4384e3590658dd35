// SPDX-License-Identifier: AGPL-3.0-only

//! Memory-mapped register windows
//!
//! A [`MappedRegion`] owns an open handle on the physical memory device and a
//! shared read/write mapping of one peripheral window. Registers are accessed
//! as little-endian 32-bit words with volatile loads and stores.
//!
//! The device is opened with `O_SYNC`, so on `/dev/mem` the kernel maps the
//! window uncached and every store reaches the AXI bus without a flush.
//!
//! Release is tied to ownership: dropping the region unmaps the window and
//! closes the device. [`MappedRegion::close`] does the same but reports a
//! failing `munmap` instead of logging it.

// Register access requires pointer casts on the mapped window; alignment is
// asserted before every access.
#![allow(clippy::cast_ptr_alignment)]

use crate::error::{AxiError, Result};
use rustix::io::Errno;
use rustix::mm::{mmap, munmap, MapFlags, ProtFlags};
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsFd;
use std::path::{Path, PathBuf};
use std::ptr::NonNull;

/// Physical memory device
pub const DEV_MEM: &str = "/dev/mem";

/// Mapped peripheral window
pub struct MappedRegion {
    ptr: NonNull<u8>,
    size: usize,
    base: u64,
    path: PathBuf,
    mapped: bool,
    _file: File,
}

impl std::fmt::Debug for MappedRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappedRegion")
            .field("ptr", &format_args!("{:p}", self.ptr))
            .field("size", &format_args!("{:#x}", self.size))
            .field("base", &format_args!("{:#010x}", self.base))
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl MappedRegion {
    /// Map `size` bytes of physical memory starting at `base` through `/dev/mem`
    ///
    /// # Errors
    ///
    /// - [`AxiError::PermissionDenied`] if the caller may not open or map `/dev/mem`
    /// - [`AxiError::Io`] for any other failure (unaligned base, zero size, mmap error)
    pub fn open(base: u64, size: usize) -> Result<Self> {
        Self::open_device(DEV_MEM, base, size)
    }

    /// Map `size` bytes of `path` starting at byte offset `base`
    ///
    /// Same contract as [`MappedRegion::open`] for any mappable device or file
    /// (`/dev/uio*`, or a plain file standing in for a window).
    ///
    /// # Errors
    ///
    /// - [`AxiError::PermissionDenied`] if opening or mapping is refused
    /// - [`AxiError::Io`] for any other failure
    ///
    /// # Panics
    ///
    /// Panics if `rustix::mm::mmap` returns a null pointer on success
    /// (never happens per the rustix API contract).
    pub fn open_device(path: impl AsRef<Path>, base: u64, size: usize) -> Result<Self> {
        let path = path.as_ref();
        validate_window(base, size)?;

        tracing::debug!("Opening {} for window {base:#010x}+{size:#x}", path.display());

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .custom_flags(libc::O_SYNC)
            .open(path)
            .map_err(|e| open_error(path, base, e))?;

        // SAFETY: mmap of a device window.
        // Invariants: (1) fd is valid, just opened read/write; (2) size is non-zero and
        // base is page aligned (validate_window); (3) MAP_SHARED so stores reach the
        // device; (4) the file is stored alongside the pointer so the fd outlives the
        // mapping, and Drop unmaps exactly once.
        let ptr = unsafe {
            mmap(
                std::ptr::null_mut(),
                size,
                ProtFlags::READ | ProtFlags::WRITE,
                MapFlags::SHARED,
                file.as_fd(),
                base,
            )
        }
        .map_err(|e| mmap_error(path, base, e))?;

        let ptr = NonNull::new(ptr.cast::<u8>())
            .expect("rustix mmap returns non-null pointer on success");

        tracing::info!(
            "Mapped {} window {base:#010x}+{size:#x} at {ptr:p}",
            path.display()
        );

        Ok(Self {
            ptr,
            size,
            base,
            path: path.to_path_buf(),
            mapped: true,
            _file: file,
        })
    }

    /// Read the 32-bit little-endian register at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not 4-byte aligned or `offset + 4` exceeds the window.
    pub fn read32(&self, offset: usize) -> u32 {
        self.check_offset(offset);
        // SAFETY: read_volatile necessary for MMIO - hardware can change value.
        // Invariants: (1) ptr from mmap, valid for self.size while mapped; (2) offset
        // aligned and offset+4 <= size (check_offset); (3) mapping page aligned so the
        // u32 is aligned.
        let raw = unsafe { self.ptr.as_ptr().add(offset).cast::<u32>().read_volatile() };
        let value = u32::from_le(raw);
        tracing::trace!("Read  {:#010x}+{offset:#05x} = {value:#010x}", self.base);
        value
    }

    /// Write `value` little-endian to the 32-bit register at `offset`
    ///
    /// # Panics
    ///
    /// Panics if `offset` is not 4-byte aligned or `offset + 4` exceeds the window.
    pub fn write32(&mut self, offset: usize, value: u32) {
        self.check_offset(offset);
        tracing::trace!("Write {:#010x}+{offset:#05x} = {value:#010x}", self.base);
        // SAFETY: write_volatile necessary for MMIO - triggers hardware side effects.
        // Invariants: (1) ptr from mmap; (2) offset aligned and in bounds; (3) &mut self
        // gives exclusive access to the window within this process.
        unsafe {
            self.ptr
                .as_ptr()
                .add(offset)
                .cast::<u32>()
                .write_volatile(value.to_le());
        }
    }

    /// Unmap the window and close the device
    ///
    /// # Errors
    ///
    /// Returns [`AxiError::Io`] if `munmap` fails. The device handle is closed
    /// either way.
    pub fn close(mut self) -> Result<()> {
        self.unmap().map_err(|e| {
            AxiError::io(format!("munmap of {:#010x} failed", self.base), e.into())
        })
    }

    /// Physical base address
    #[must_use]
    pub const fn base(&self) -> u64 {
        self.base
    }

    /// Window size in bytes
    #[must_use]
    pub const fn size(&self) -> usize {
        self.size
    }

    /// Device the window was mapped from
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check_offset(&self, offset: usize) {
        assert!(offset % 4 == 0, "Register offset {offset:#x} not 4-byte aligned");
        assert!(
            offset.checked_add(4).is_some_and(|end| end <= self.size),
            "Register offset {offset:#x} out of bounds (window {:#x})",
            self.size
        );
    }

    fn unmap(&mut self) -> rustix::io::Result<()> {
        if !self.mapped {
            return Ok(());
        }
        self.mapped = false;
        tracing::info!("Unmapping window {:#010x}+{:#x}", self.base, self.size);
        // SAFETY: munmap of the mapping created in open_device.
        // Invariants: (1) ptr and size are exactly what mmap returned/was given;
        // (2) `mapped` guarantees this runs at most once; (3) no references into the
        // window escape the accessors.
        unsafe { munmap(self.ptr.as_ptr().cast(), self.size) }
    }
}

impl Drop for MappedRegion {
    fn drop(&mut self) {
        if let Err(e) = self.unmap() {
            tracing::error!("munmap failed during drop: {e}");
        }
    }
}

// SAFETY: Send - MappedRegion owns the mapping exclusively; moving it between threads
// doesn't invalidate the mapping (mmap'd memory is process-wide).
unsafe impl Send for MappedRegion {}

/// EACCES/EPERM from `open` means the caller lacks privilege
fn open_error(path: &Path, base: u64, e: std::io::Error) -> AxiError {
    if e.kind() == std::io::ErrorKind::PermissionDenied {
        AxiError::permission_denied(path, base)
    } else {
        AxiError::io(format!("Cannot open {}", path.display()), e)
    }
}

/// `/dev/mem` refuses the mapping itself with EPERM under `CONFIG_STRICT_DEVMEM`
fn mmap_error(path: &Path, base: u64, e: Errno) -> AxiError {
    if e == Errno::PERM || e == Errno::ACCESS {
        AxiError::permission_denied(path, base)
    } else {
        AxiError::io(
            format!("mmap of {} at {base:#010x} failed", path.display()),
            e.into(),
        )
    }
}

fn validate_window(base: u64, size: usize) -> Result<()> {
    if size < 4 {
        return Err(AxiError::io(
            format!("Window at {base:#010x} too small ({size} bytes)"),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        ));
    }
    let page = rustix::param::page_size() as u64;
    if base % page != 0 {
        return Err(AxiError::io(
            format!("Window base {base:#010x} not aligned to {page:#x}-byte pages"),
            std::io::Error::from(std::io::ErrorKind::InvalidInput),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_size() {
        let err = MappedRegion::open_device("/nonexistent", 0, 0).unwrap_err();
        assert!(matches!(err, AxiError::Io { .. }));
    }

    #[test]
    fn rejects_unaligned_base() {
        let err = MappedRegion::open_device("/nonexistent", 0x4300_0004, 0x1000).unwrap_err();
        assert!(matches!(err, AxiError::Io { .. }));
    }

    #[test]
    fn open_refusals_classify_as_permission_denied() {
        let path = Path::new("/dev/mem");
        for errno in [libc::EACCES, libc::EPERM] {
            let err = open_error(path, 0x4300_0000, std::io::Error::from_raw_os_error(errno));
            assert!(
                matches!(err, AxiError::PermissionDenied { base: 0x4300_0000, .. }),
                "errno {errno}: {err:?}"
            );
        }
        let err = open_error(path, 0, std::io::Error::from_raw_os_error(libc::ENOENT));
        assert!(matches!(err, AxiError::Io { .. }));
    }

    #[test]
    fn mmap_refusals_classify_as_permission_denied() {
        let path = Path::new("/dev/mem");
        for errno in [Errno::ACCESS, Errno::PERM] {
            let err = mmap_error(path, 0x4400_0000, errno);
            assert!(err.is_permission_denied(), "{errno:?}: {err:?}");
        }
        for errno in [Errno::NOENT, Errno::INVAL] {
            let err = mmap_error(path, 0x4400_0000, errno);
            match err {
                AxiError::Io { context, source } => {
                    assert!(context.contains("0x44000000"));
                    assert_eq!(source.raw_os_error(), Some(errno.raw_os_error()));
                }
                other => panic!("{errno:?}: expected Io, got {other:?}"),
            }
        }
    }

    #[test]
    fn missing_device_is_io_error() {
        let err = MappedRegion::open_device("/nonexistent/mem", 0, 0x1000).unwrap_err();
        match err {
            AxiError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("expected Io, got {other:?}"),
        }
    }
}
