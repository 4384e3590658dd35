// SPDX-License-Identifier: AGPL-3.0-only

//! Minimal RV32I encoder.
//!
//! Only the instructions the diagnostics load into instruction memory.
//! Register numbers are masked to 5 bits and immediates to 12 bits.

const OP_IMM: u32 = 0b001_0011;
const OP: u32 = 0b011_0011;

fn i_type(imm: i16, rs1: u8, funct3: u32, rd: u8, opcode: u32) -> u32 {
    let imm = u32::from(imm as u16) & 0xFFF;
    (imm << 20)
        | ((u32::from(rs1) & 0x1F) << 15)
        | (funct3 << 12)
        | ((u32::from(rd) & 0x1F) << 7)
        | opcode
}

fn r_type(funct7: u32, rs2: u8, rs1: u8, funct3: u32, rd: u8, opcode: u32) -> u32 {
    (funct7 << 25)
        | ((u32::from(rs2) & 0x1F) << 20)
        | ((u32::from(rs1) & 0x1F) << 15)
        | (funct3 << 12)
        | ((u32::from(rd) & 0x1F) << 7)
        | opcode
}

/// `ADDI rd, rs1, imm`
#[must_use]
pub fn addi(rd: u8, rs1: u8, imm: i16) -> u32 {
    i_type(imm, rs1, 0b000, rd, OP_IMM)
}

/// `ADD rd, rs1, rs2`
#[must_use]
pub fn add(rd: u8, rs1: u8, rs2: u8) -> u32 {
    r_type(0, rs2, rs1, 0b000, rd, OP)
}

/// `NOP` (`ADDI x0, x0, 0`)
#[must_use]
pub fn nop() -> u32 {
    addi(0, 0, 0)
}

/// x1 = 5; x2 = 10; x3 = x1 + x2
#[must_use]
pub fn add_program() -> [u32; 3] {
    [addi(1, 0, 5), addi(2, 0, 10), add(3, 1, 2)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_encodings() {
        assert_eq!(addi(1, 0, 5), 0x0050_0093);
        assert_eq!(addi(2, 0, 10), 0x00A0_0113);
        assert_eq!(add(3, 1, 2), 0x0020_81B3);
        assert_eq!(nop(), 0x0000_0013);
    }

    #[test]
    fn negative_immediate() {
        // addi x1, x0, -1
        assert_eq!(addi(1, 0, -1), 0xFFF0_0093);
    }
}
