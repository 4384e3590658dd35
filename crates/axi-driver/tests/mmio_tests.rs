// SPDX-License-Identifier: AGPL-3.0-only

//! Mapped region tests against file-backed windows
//!
//! A `MAP_SHARED` mapping of a regular file goes through exactly the same
//! open/mmap/munmap path as `/dev/mem`, and the file contents show what
//! reached the "bus".

mod common;

use axi_driver::{AxiError, MappedRegion, RegisterBus};
use common::backing_file;
use std::os::unix::fs::PermissionsExt;

const WINDOW: usize = 0x1_0000;

#[test]
fn write_then_read_returns_value_at_every_sampled_offset() {
    let file = backing_file(WINDOW as u64);
    let mut region = MappedRegion::open_device(file.path(), 0, WINDOW).unwrap();

    let offsets = (0..WINDOW).step_by(0x404).map(|o| o & !3).chain([WINDOW - 4]);
    for (i, offset) in offsets.enumerate() {
        let value = 0x9E37_79B9_u32.wrapping_mul(i as u32 + 1);
        region.write32(offset, value);
        assert_eq!(region.read32(offset), value, "offset {offset:#x}");
    }
}

#[test]
fn words_are_stored_little_endian() {
    let file = backing_file(WINDOW as u64);
    let mut region = MappedRegion::open_device(file.path(), 0, WINDOW).unwrap();
    region.write32(0x80, 0xDEAD_BEEF);
    region.close().unwrap();

    let bytes = std::fs::read(file.path()).unwrap();
    assert_eq!(&bytes[0x80..0x84], &[0xEF, 0xBE, 0xAD, 0xDE]);
}

#[test]
fn sequence_reads_back_in_order() {
    let file = backing_file(WINDOW as u64);
    let mut region = MappedRegion::open_device(file.path(), 0, WINDOW).unwrap();

    let words = [0xDEAD_BEEF, 0xCAFE_BABE, 0x1234_5678, 0xABCD_EF00];
    region.write_words(0x80, &words);
    assert_eq!(region.read_words(0x80, words.len()), words);
}

#[test]
fn base_selects_the_window() {
    let file = backing_file(0x2000);
    let mut bytes = vec![0u8; 0x2000];
    bytes[0x1000..0x1004].copy_from_slice(&0xABCD_1234_u32.to_le_bytes());
    std::fs::write(file.path(), &bytes).unwrap();

    let region = MappedRegion::open_device(file.path(), 0x1000, 0x1000).unwrap();
    assert_eq!(region.base(), 0x1000);
    assert_eq!(region.size(), 0x1000);
    assert_eq!(region.read32(0), 0xABCD_1234);
}

#[test]
fn writes_persist_across_reopen() {
    let file = backing_file(0x1000);
    {
        let mut region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
        region.write32(0x10, 0x1111_1111);
        // dropped here: unmap + close
    }
    let region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
    assert_eq!(region.read32(0x10), 0x1111_1111);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn read_past_end_panics() {
    let file = backing_file(0x1000);
    let region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
    let _ = region.read32(0x1000);
}

#[test]
#[should_panic(expected = "not 4-byte aligned")]
fn unaligned_write_panics() {
    let file = backing_file(0x1000);
    let mut region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
    region.write32(0x2, 0);
}

#[test]
fn region_is_released_when_caller_panics() {
    let file = backing_file(0x1000);
    let path = file.path().to_path_buf();
    let result = std::panic::catch_unwind(move || {
        let mut region = MappedRegion::open_device(&path, 0, 0x1000).unwrap();
        region.write32(0, 0x5555_5555);
        panic!("test logic failed");
    });
    assert!(result.is_err());

    let region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
    assert_eq!(region.read32(0), 0x5555_5555);
}

#[test]
#[ignore] // Requires an unprivileged user (root bypasses file modes)
fn unprivileged_open_is_permission_denied() {
    let file = backing_file(0x1000);
    std::fs::set_permissions(file.path(), std::fs::Permissions::from_mode(0o000)).unwrap();

    assert!(
        std::fs::OpenOptions::new().read(true).write(true).open(file.path()).is_err(),
        "mode 000 file opened anyway; run this test without CAP_DAC_OVERRIDE"
    );

    let err = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap_err();
    assert!(err.is_permission_denied(), "got {err:?}");
    assert!(matches!(err, AxiError::PermissionDenied { base: 0, .. }));
}

#[test]
fn mapped_region_is_a_register_bus() {
    fn size_of_bus(bus: &impl RegisterBus) -> usize {
        bus.size()
    }

    let file = backing_file(0x1000);
    let region = MappedRegion::open_device(file.path(), 0, 0x1000).unwrap();
    assert_eq!(size_of_bus(&region), 0x1000);
}
