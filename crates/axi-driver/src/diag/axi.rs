// SPDX-License-Identifier: AGPL-3.0-only

//! AXI write-channel ordering checks
//!
//! Exercises the interconnect itself rather than any peripheral feature:
//! patterns of writes into CPU instruction memory, each verified by reading
//! back. A bitstream that drops or reorders write beats fails here while the
//! single-register checks still pass.

use super::{Check, Report};
use crate::bus::RegisterBus;
use axi_chip::cpu::INSTR_BASE;
use std::time::Duration;

/// Gap between writes in the paced pattern
pub const WRITE_GAP: Duration = Duration::from_millis(10);

/// Run all transaction checks on a CPU window
pub fn run<B: RegisterBus>(bus: &mut B, report: &mut Report) {
    report.section("AXI transactions");

    report.record("Single write", Ok(single_write(bus)));
    report.record("Back-to-back writes", Ok(back_to_back(bus)));
    report.record("Same-address writes", Ok(last_write_wins(bus)));
    report.record("Paced writes", Ok(paced(bus)));
    report.record("Burst of five", Ok(burst(bus)));
}

fn verify<B: RegisterBus>(bus: &B, offset: usize, written: &[u32]) -> Check {
    let read = bus.read_words(offset, written.len());
    Check::expect_words(offset, written, &read)
}

/// One write, immediate read-back
pub fn single_write<B: RegisterBus>(bus: &mut B) -> Check {
    bus.write32(INSTR_BASE, 0xAAAA_AAAA);
    verify(bus, INSTR_BASE, &[0xAAAA_AAAA])
}

/// Two writes to different addresses with no delay
pub fn back_to_back<B: RegisterBus>(bus: &mut B) -> Check {
    let words = [0x1111_1111, 0x2222_2222];
    bus.write32(INSTR_BASE, words[0]);
    bus.write32(INSTR_BASE + 4, words[1]);
    verify(bus, INSTR_BASE, &words)
}

/// Three writes to one address; the last must stick
pub fn last_write_wins<B: RegisterBus>(bus: &mut B) -> Check {
    let offset = INSTR_BASE + 0x08;
    for word in [0xBBBB_BBBB, 0xCCCC_CCCC, 0xDDDD_DDDD] {
        bus.write32(offset, word);
    }
    verify(bus, offset, &[0xDDDD_DDDD])
}

/// Three writes separated by [`WRITE_GAP`]
pub fn paced<B: RegisterBus>(bus: &mut B) -> Check {
    let offset = INSTR_BASE + 0x10;
    let words = [0xAAAA_AAAA, 0xBBBB_BBBB, 0xCCCC_CCCC];
    for (i, &word) in words.iter().enumerate() {
        bus.write32(offset + i * 4, word);
        std::thread::sleep(WRITE_GAP);
    }
    verify(bus, offset, &words)
}

/// Five consecutive writes
pub fn burst<B: RegisterBus>(bus: &mut B) -> Check {
    let offset = INSTR_BASE + 0x20;
    let words = [0x1111_1111, 0x2222_2222, 0x3333_3333, 0x4444_4444, 0x5555_5555];
    bus.write_words(offset, &words);
    verify(bus, offset, &words)
}
