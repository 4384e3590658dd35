// SPDX-License-Identifier: AGPL-3.0-only

//! Tests against the real bitstream
//!
//! Run on the board as root: `cargo test -- --ignored`

use axi_chip::gpu::{MathOp, Point};
use axi_chip::map::Window;
use axi_driver::diag::open_window;
use axi_driver::{run_suite, AxiConfig, CpuDevice, GpuDevice, Outcome, Suite};

fn config() -> AxiConfig {
    AxiConfig::from_env().expect("AXI_* environment")
}

#[test]
#[ignore] // Requires hardware
fn gpu_id_and_math() {
    let config = config();
    let region = open_window(&config, Window::Gpu).expect("map GPU window");
    let mut gpu = GpuDevice::new(region, config.timing);

    assert!(gpu.id_matches());
    assert_eq!(gpu.math(100, 4, MathOp::Div).unwrap(), 25);
    gpu.into_inner().close().unwrap();
}

#[test]
#[ignore] // Requires hardware
fn gpu_pixel_round_trip() {
    let config = config();
    let region = open_window(&config, Window::Gpu).expect("map GPU window");
    let mut gpu = GpuDevice::new(region, config.timing);

    let p = Point::new(10, 20);
    gpu.draw_pixel(p, 0xFF).unwrap();
    assert_eq!(gpu.read_pixel(p).unwrap(), 0xFF);
}

#[test]
#[ignore] // Requires hardware
fn cpu_signature_and_reset() {
    let config = config();
    let region = open_window(&config, Window::Cpu).expect("map CPU window");
    let mut cpu = CpuDevice::new(region, config.timing);

    assert_eq!(cpu.signature(), axi_chip::cpu::EXPECTED_SIGNATURE);
    cpu.set_pc(0x100);
    cpu.reset();
    assert_eq!(cpu.pc(), 0);
}

#[test]
#[ignore] // Requires hardware
fn full_suite_passes() {
    let report = run_suite(&config(), Suite::full()).expect("map windows");
    let failed: Vec<_> = report
        .results()
        .iter()
        .filter(|r| matches!(r.outcome, Outcome::Fail | Outcome::Error))
        .map(|r| format!("{}: {}", r.name, r.detail))
        .collect();
    assert!(failed.is_empty(), "{failed:#?}");
}
