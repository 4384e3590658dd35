// SPDX-License-Identifier: AGPL-3.0-only

//! CPU checks

use super::{Check, Report};
use crate::bus::RegisterBus;
use crate::cpu::CpuDevice;
use axi_chip::cpu::{self as regs, ctrl, EXPECTED_SIGNATURE};
use axi_chip::rv32i;
use std::time::Duration;

/// Words written to data memory
pub const DATA_PATTERN: [u32; 4] = [0xDEAD_BEEF, 0xCAFE_BABE, 0x1234_5678, 0xABCD_EF00];

/// PC value loaded and read back
pub const TEST_PC: u32 = 0x100;

/// How long the NOP program is left running
pub const RUN_WINDOW: Duration = Duration::from_millis(10);

/// Run the CPU groups against `cpu`
pub fn run<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report, extended: bool) {
    basic(cpu, report);
    instruction_memory(cpu, report);
    data_memory(cpu, report);
    if extended {
        signature(cpu, report);
        reset(cpu, report);
        program(cpu, report);
    }
}

/// Status, PC, control write, and PC read-back
pub fn basic<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU basic read/write");

    report.record("CPU status", Ok(Check::info(format!("{:#010x}", cpu.status()))));
    report.record("Initial PC", Ok(Check::info(format!("{:#010x}", cpu.pc()))));

    cpu.set_control(ctrl::RESET);
    report.record("Control after reset write", Ok(Check::info(format!("{:#010x}", cpu.control()))));

    cpu.set_pc(TEST_PC);
    report.record("PC write", Ok(Check::expect_word(TEST_PC, cpu.pc())));
}

/// `ADDI x1,x0,5; ADDI x2,x0,10; ADD x3,x1,x2` written and read back
pub fn instruction_memory<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU instruction memory");

    let program = rv32i::add_program();
    cpu.load_program(&program);
    let read: Vec<u32> = (0..program.len()).map(|i| cpu.read_instruction(i)).collect();
    report.record(
        "Instruction read-back",
        Ok(Check::expect_words(regs::INSTR_BASE, &program, &read)),
    );
}

/// [`DATA_PATTERN`] written and read back
pub fn data_memory<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU data memory");

    for (i, &word) in DATA_PATTERN.iter().enumerate() {
        cpu.write_data(i, word);
    }
    let read: Vec<u32> = (0..DATA_PATTERN.len()).map(|i| cpu.read_data(i)).collect();
    report.record(
        "Data read-back",
        Ok(Check::expect_words(regs::DATA_BASE, &DATA_PATTERN, &read)),
    );
}

/// `"RISC"` signature
pub fn signature<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU signature");
    report.record("Signature", Ok(Check::expect_word(EXPECTED_SIGNATURE, cpu.signature())));
}

/// Reset clears the PC; a loaded PC reads back
pub fn reset<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU control");

    cpu.reset();
    report.record("PC after reset", Ok(Check::expect_word(0, cpu.pc())));

    cpu.set_pc(TEST_PC);
    report.record("PC after load", Ok(Check::expect_word(TEST_PC, cpu.pc())));
}

/// Ten NOPs from address 0; the PC must have moved after [`RUN_WINDOW`]
pub fn program<B: RegisterBus>(cpu: &mut CpuDevice<B>, report: &mut Report) {
    report.section("CPU program execution");

    cpu.reset();
    cpu.load_program(&[rv32i::nop(); 10]);
    cpu.set_pc(0);
    cpu.run();
    std::thread::sleep(RUN_WINDOW);

    report.record("Status while running", Ok(Check::info(format!("{:#010x}", cpu.status()))));
    let pc = cpu.pc();
    cpu.stop();

    let check = if pc > 0 {
        Check::pass(format!("PC advanced to {pc:#010x}"))
    } else {
        Check::fail("PC did not advance")
    };
    report.record("PC advances", Ok(check));
}
