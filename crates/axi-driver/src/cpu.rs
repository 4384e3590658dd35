// SPDX-License-Identifier: AGPL-3.0-only

//! RISC-V soft-core control
//!
//! Control, program counter and memory access for the core described in
//! [`axi_chip::cpu`]. Instruction and data memories are plain word arrays in
//! the window; the core only executes while [`ctrl::RUN`] is set.

use crate::bus::RegisterBus;
use crate::config::Timing;
use axi_chip::cpu::{self as regs, ctrl};

/// Snapshot of the AXI write debug block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugSnapshot {
    /// Address of the last AXI write seen by the core
    pub last_addr: u32,
    /// Data of the last AXI write
    pub last_data: u32,
    /// AXI writes since reset
    pub write_count: u32,
    /// Write-channel state
    pub state: u32,
}

impl std::fmt::Display for DebugSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Last Addr:   {:#010x}", self.last_addr)?;
        writeln!(f, "Last Data:   {:#010x}", self.last_data)?;
        writeln!(f, "Write Count: {}", self.write_count)?;
        write!(f, "State:       {:#010x}", self.state)
    }
}

/// CPU handle over a register window
#[derive(Debug)]
pub struct CpuDevice<B> {
    bus: B,
    timing: Timing,
}

impl<B: RegisterBus> CpuDevice<B> {
    /// Wrap a mapped CPU window
    pub const fn new(bus: B, timing: Timing) -> Self {
        Self { bus, timing }
    }

    /// Underlying register window
    pub const fn bus(&self) -> &B {
        &self.bus
    }

    /// Underlying register window, mutably
    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    /// Release the register window
    pub fn into_inner(self) -> B {
        self.bus
    }

    /// Control register
    pub fn control(&self) -> u32 {
        self.bus.read32(regs::CTRL)
    }

    /// Write the control register
    pub fn set_control(&mut self, value: u32) {
        self.bus.write32(regs::CTRL, value);
    }

    /// Status register
    pub fn status(&self) -> u32 {
        self.bus.read32(regs::STATUS)
    }

    /// Program counter
    pub fn pc(&self) -> u32 {
        self.bus.read32(regs::PC)
    }

    /// Load the program counter
    pub fn set_pc(&mut self, pc: u32) {
        self.bus.write32(regs::PC, pc);
    }

    /// Register-file peek
    pub fn reg(&self) -> u32 {
        self.bus.read32(regs::REG)
    }

    /// Pulse reset: assert, hold for `reset_hold`, release
    pub fn reset(&mut self) {
        tracing::debug!("CPU reset");
        self.set_control(ctrl::RESET);
        if !self.timing.reset_hold.is_zero() {
            std::thread::sleep(self.timing.reset_hold);
        }
        self.set_control(0);
    }

    /// Start free-running execution
    pub fn run(&mut self) {
        tracing::debug!("CPU run from {:#010x}", self.pc());
        self.set_control(ctrl::RUN);
    }

    /// Halt execution
    pub fn stop(&mut self) {
        self.set_control(0);
        tracing::debug!("CPU stopped at {:#010x}", self.pc());
    }

    /// Execute one instruction
    pub fn step(&mut self) {
        self.set_control(ctrl::STEP);
    }

    /// Write instruction word `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond instruction memory.
    pub fn write_instruction(&mut self, index: usize, word: u32) {
        assert!(index < regs::INSTR_WORDS, "Instruction index {index} out of range");
        self.bus.write32(regs::instr_offset(index), word);
    }

    /// Read instruction word `index`
    ///
    /// # Panics
    ///
    /// Panics if `index` is beyond instruction memory.
    pub fn read_instruction(&self, index: usize) -> u32 {
        assert!(index < regs::INSTR_WORDS, "Instruction index {index} out of range");
        self.bus.read32(regs::instr_offset(index))
    }

    /// Load `program` at the start of instruction memory
    ///
    /// # Panics
    ///
    /// Panics if `program` is longer than instruction memory.
    pub fn load_program(&mut self, program: &[u32]) {
        assert!(
            program.len() <= regs::INSTR_WORDS,
            "Program of {} words exceeds {}-word instruction memory",
            program.len(),
            regs::INSTR_WORDS
        );
        tracing::debug!("Loading {} instruction(s)", program.len());
        self.bus.write_words(regs::INSTR_BASE, program);
    }

    /// Write data word `index`
    pub fn write_data(&mut self, index: usize, word: u32) {
        self.bus.write32(regs::data_offset(index), word);
    }

    /// Read data word `index`
    pub fn read_data(&self, index: usize) -> u32 {
        self.bus.read32(regs::data_offset(index))
    }

    /// Read the AXI write debug block
    pub fn debug(&self) -> DebugSnapshot {
        DebugSnapshot {
            last_addr: self.bus.read32(regs::DEBUG_LAST_ADDR),
            last_data: self.bus.read32(regs::DEBUG_LAST_DATA),
            write_count: self.bus.read32(regs::DEBUG_WRITE_COUNT),
            state: self.bus.read32(regs::DEBUG_STATE),
        }
    }

    /// Signature register
    pub fn signature(&self) -> u32 {
        self.bus.read32(regs::SIGNATURE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        regs: Vec<u32>,
        writes: Vec<(usize, u32)>,
    }

    impl RegisterBus for Recorder {
        fn read32(&self, offset: usize) -> u32 {
            self.regs.get(offset / 4).copied().unwrap_or(0)
        }

        fn write32(&mut self, offset: usize, value: u32) {
            if self.regs.len() <= offset / 4 {
                self.regs.resize(offset / 4 + 1, 0);
            }
            self.regs[offset / 4] = value;
            self.writes.push((offset, value));
        }

        fn size(&self) -> usize {
            0x1_0000
        }
    }

    fn device() -> CpuDevice<Recorder> {
        CpuDevice::new(Recorder::default(), Timing::immediate())
    }

    #[test]
    fn reset_pulses_and_releases() {
        let mut cpu = device();
        cpu.reset();
        assert_eq!(cpu.bus().writes, vec![(regs::CTRL, ctrl::RESET), (regs::CTRL, 0)]);
    }

    #[test]
    fn program_lands_at_instruction_base() {
        let mut cpu = device();
        cpu.load_program(&axi_chip::rv32i::add_program());
        assert_eq!(cpu.read_instruction(0), 0x0050_0093);
        assert_eq!(cpu.bus().read32(0x48), 0x0020_81B3);
    }

    #[test]
    fn run_step_stop_write_control() {
        let mut cpu = device();
        cpu.run();
        cpu.step();
        cpu.stop();
        let ctrls: Vec<u32> = cpu.bus().writes.iter().map(|&(_, v)| v).collect();
        assert_eq!(ctrls, vec![ctrl::RUN, ctrl::STEP, 0]);
        cpu.bus_mut().write32(regs::REG, 15);
        assert_eq!(cpu.reg(), 15);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn instruction_index_is_bounded() {
        let mut cpu = device();
        cpu.write_instruction(regs::INSTR_WORDS, 0);
    }

    #[test]
    fn data_words_follow_data_base() {
        let mut cpu = device();
        cpu.write_data(1, 0xDEAD_BEEF);
        assert_eq!(cpu.bus().writes, vec![(0x84, 0xDEAD_BEEF)]);
        assert_eq!(cpu.read_data(1), 0xDEAD_BEEF);
    }

    #[test]
    fn debug_snapshot_layout() {
        let mut cpu = device();
        cpu.bus_mut().write32(0x30, 0x48);
        cpu.bus_mut().write32(0x34, 0xCCCC_CCCC);
        cpu.bus_mut().write32(0x38, 3);
        let snap = cpu.debug();
        assert_eq!(snap.last_addr, 0x48);
        assert_eq!(snap.last_data, 0xCCCC_CCCC);
        assert_eq!(snap.write_count, 3);
        assert!(snap.to_string().contains("Write Count: 3"));
    }
}
