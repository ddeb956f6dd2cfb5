//! The instruction decoder: a pure function from a 32-bit instruction
//! word to a typed [`Instruction`]. Never touches [`crate::registers::Registers`]
//! or [`crate::memory::Memory`].

use crate::error::DecodeError;
use crate::fields;
use crate::instruction::{BranchKind, CsrOp, Instruction, ImmOp, LoadKind, RegOp, ShiftOp, StoreKind};

const OP_LUI: u32 = 0x37;
const OP_AUIPC: u32 = 0x17;
const OP_JAL: u32 = 0x6F;
const OP_JALR: u32 = 0x67;
const OP_BRANCH: u32 = 0x63;
const OP_LOAD: u32 = 0x03;
const OP_STORE: u32 = 0x23;
const OP_IMM: u32 = 0x13;
const OP_REG: u32 = 0x33;
const OP_SYSTEM: u32 = 0x73;
const OP_FENCE: u32 = 0x0F;
const OP_IMM_32: u32 = 0x1B;

/// Decode `word` into a typed instruction, or report the opcode/funct
/// combination that did not match anything this core supports.
pub fn decode(word: u32) -> Result<Instruction, DecodeError> {
    let opcode = fields::opcode(word);
    let rd = fields::rd(word);
    let rs1 = fields::rs1(word);
    let rs2 = fields::rs2(word);
    let funct3 = fields::funct3(word);
    let funct7 = fields::funct7(word);

    let unknown = || DecodeError { word, opcode };

    match opcode {
        OP_LUI => Ok(Instruction::Lui { rd, imm: fields::imm_u(word) }),
        OP_AUIPC => Ok(Instruction::Auipc { rd, imm: fields::imm_u(word) }),
        OP_JAL => Ok(Instruction::Jal { rd, offset: fields::imm_j(word) }),

        OP_JALR => {
            if funct3 != 0 {
                return Err(unknown());
            }
            Ok(Instruction::Jalr { rd, rs1, imm: fields::imm_i(word) })
        }

        OP_BRANCH => {
            let kind = match funct3 {
                0b000 => BranchKind::Eq,
                0b001 => BranchKind::Ne,
                0b100 => BranchKind::Lt,
                0b101 => BranchKind::Ge,
                0b110 => BranchKind::Ltu,
                0b111 => BranchKind::Geu,
                _ => return Err(unknown()),
            };
            Ok(Instruction::Branch { kind, rs1, rs2, offset: fields::imm_b(word) })
        }

        OP_LOAD => {
            let kind = match funct3 {
                0b000 => LoadKind::Byte,
                0b001 => LoadKind::Half,
                0b010 => LoadKind::Word,
                0b100 => LoadKind::ByteU,
                0b101 => LoadKind::HalfU,
                _ => return Err(unknown()),
            };
            Ok(Instruction::Load { kind, rd, rs1, imm: fields::imm_i(word) })
        }

        OP_STORE => {
            let kind = match funct3 {
                0b000 => StoreKind::Byte,
                0b001 => StoreKind::Half,
                0b010 => StoreKind::Word,
                _ => return Err(unknown()),
            };
            Ok(Instruction::Store { kind, rs1, rs2, imm: fields::imm_s(word) })
        }

        OP_IMM => match funct3 {
            0b000 => Ok(Instruction::OpImm { op: ImmOp::Addi, rd, rs1, imm: fields::imm_i(word) }),
            0b010 => Ok(Instruction::OpImm { op: ImmOp::Slti, rd, rs1, imm: fields::imm_i(word) }),
            0b011 => Ok(Instruction::OpImm { op: ImmOp::Sltiu, rd, rs1, imm: fields::imm_i(word) }),
            0b100 => Ok(Instruction::OpImm { op: ImmOp::Xori, rd, rs1, imm: fields::imm_i(word) }),
            0b110 => Ok(Instruction::OpImm { op: ImmOp::Ori, rd, rs1, imm: fields::imm_i(word) }),
            0b111 => Ok(Instruction::OpImm { op: ImmOp::Andi, rd, rs1, imm: fields::imm_i(word) }),
            0b001 if funct7 == 0b0000000 => {
                Ok(Instruction::Shift { op: ShiftOp::Slli, rd, rs1, shamt: fields::shamt(word) })
            }
            0b101 if funct7 == 0b0000000 => {
                Ok(Instruction::Shift { op: ShiftOp::Srli, rd, rs1, shamt: fields::shamt(word) })
            }
            0b101 if funct7 == 0b0100000 => {
                Ok(Instruction::Shift { op: ShiftOp::Srai, rd, rs1, shamt: fields::shamt(word) })
            }
            _ => Err(unknown()),
        },

        OP_REG => {
            let op = match (funct3, funct7) {
                (0b000, 0b0000000) => RegOp::Add,
                (0b000, 0b0100000) => RegOp::Sub,
                (0b001, 0b0000000) => RegOp::Sll,
                (0b010, 0b0000000) => RegOp::Slt,
                (0b011, 0b0000000) => RegOp::Sltu,
                (0b100, 0b0000000) => RegOp::Xor,
                (0b101, 0b0000000) => RegOp::Srl,
                (0b101, 0b0100000) => RegOp::Sra,
                (0b110, 0b0000000) => RegOp::Or,
                (0b111, 0b0000000) => RegOp::And,
                _ => return Err(unknown()),
            };
            Ok(Instruction::Op { op, rd, rs1, rs2 })
        }

        OP_SYSTEM => {
            let csr = fields::csr_addr(word);
            match funct3 {
                0b000 => match csr {
                    0 => Ok(Instruction::Ecall),
                    1 => Ok(Instruction::Ebreak),
                    _ => Err(unknown()),
                },
                0b001 => Ok(Instruction::Csr { op: CsrOp::Rw, rd, csr, rs1 }),
                0b010 => Ok(Instruction::Csr { op: CsrOp::Rs, rd, csr, rs1 }),
                0b011 => Ok(Instruction::Csr { op: CsrOp::Rc, rd, csr, rs1 }),
                0b101 => Ok(Instruction::CsrImm { op: CsrOp::Rw, rd, csr, zimm: rs1 }),
                0b110 => Ok(Instruction::CsrImm { op: CsrOp::Rs, rd, csr, zimm: rs1 }),
                0b111 => Ok(Instruction::CsrImm { op: CsrOp::Rc, rd, csr, zimm: rs1 }),
                _ => Err(unknown()),
            }
        }

        OP_FENCE => Ok(Instruction::Fence),

        OP_IMM_32 => {
            if funct3 != 0 {
                return Err(unknown());
            }
            Ok(Instruction::Addiw { rd, rs1, imm: fields::imm_i(word) })
        }

        _ => Err(unknown()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode;

    #[test]
    fn decodes_lui() {
        let word = encode::utype(OP_LUI, 1, 0x12345000);
        assert_eq!(decode(word).unwrap(), Instruction::Lui { rd: 1, imm: 0x12345000 });
    }

    #[test]
    fn decodes_addi() {
        let word = encode::itype(OP_IMM, 0b000, 1, 1, 0x678);
        assert_eq!(
            decode(word).unwrap(),
            Instruction::OpImm { op: ImmOp::Addi, rd: 1, rs1: 1, imm: 0x678 }
        );
    }

    #[test]
    fn decodes_negative_i_immediate() {
        let word = encode::itype(OP_IMM, 0b000, 2, 1, (-4i32) as u32 & 0xfff);
        match decode(word).unwrap() {
            Instruction::OpImm { op: ImmOp::Addi, imm, .. } => assert_eq!(imm as i32, -4),
            other => panic!("unexpected decode {other:?}"),
        }
    }

    #[test]
    fn decodes_srai_vs_srli_on_bit_30() {
        let srli = encode::itype(OP_IMM, 0b101, 1, 1, 5);
        let srai = encode::itype(OP_IMM, 0b101, 1, 1, (0b0100000 << 5) | 5);
        assert_eq!(
            decode(srli).unwrap(),
            Instruction::Shift { op: ShiftOp::Srli, rd: 1, rs1: 1, shamt: 5 }
        );
        assert_eq!(
            decode(srai).unwrap(),
            Instruction::Shift { op: ShiftOp::Srai, rd: 1, rs1: 1, shamt: 5 }
        );
    }

    #[test]
    fn decodes_branch_funct3() {
        let word = encode::btype(OP_BRANCH, 0b100, 1, 2, (-4i32) as u32);
        assert_eq!(
            decode(word).unwrap(),
            Instruction::Branch { kind: BranchKind::Lt, rs1: 1, rs2: 2, offset: (-4i32) as u32 }
        );
    }

    #[test]
    fn decodes_csrrs() {
        let word = encode::itype(OP_SYSTEM, 0b010, 2, 1, 0x305);
        assert_eq!(
            decode(word).unwrap(),
            Instruction::Csr { op: CsrOp::Rs, rd: 2, csr: 0x305, rs1: 1 }
        );
    }

    #[test]
    fn decodes_csr_address_with_bit_11_set() {
        // 0xC00 (cycle) and 0xF11 (mvendorid) both have bit 11 set; the
        // csr field must come through unsigned, not sign-extended.
        let cycle = encode::itype(OP_SYSTEM, 0b010, 2, 1, 0xC00);
        assert_eq!(
            decode(cycle).unwrap(),
            Instruction::Csr { op: CsrOp::Rs, rd: 2, csr: 0xC00, rs1: 1 }
        );
        let mvendorid = encode::itype(OP_SYSTEM, 0b001, 2, 1, 0xF11);
        assert_eq!(
            decode(mvendorid).unwrap(),
            Instruction::Csr { op: CsrOp::Rw, rd: 2, csr: 0xF11, rs1: 1 }
        );
    }

    #[test]
    fn decodes_every_csr_address_in_range() {
        for addr in 0u32..4096 {
            let word = encode::itype(OP_SYSTEM, 0b010, 2, 1, addr);
            match decode(word).unwrap() {
                Instruction::Csr { csr, .. } => assert_eq!(csr as u32, addr),
                other => panic!("unexpected decode {other:?} for csr 0x{addr:x}"),
            }
        }
    }

    #[test]
    fn decodes_jal_offset() {
        let word = encode::jtype(OP_JAL, 1, 8);
        assert_eq!(decode(word).unwrap(), Instruction::Jal { rd: 1, offset: 8 });
    }

    #[test]
    fn decodes_addiw_stub() {
        let word = encode::itype(OP_IMM_32, 0b000, 1, 1, 4);
        assert_eq!(decode(word).unwrap(), Instruction::Addiw { rd: 1, rs1: 1, imm: 4 });
    }

    #[test]
    fn unknown_opcode_is_an_error() {
        assert!(decode(0x0000_0000).is_err());
    }

    #[test]
    fn unknown_funct3_is_an_error() {
        // opcode 0x33 (OP) with funct3=0b010 (SLT) but funct7 garbage
        let word = encode::rtype(OP_REG, 0b010, 1, 1, 2, 0b1111111);
        assert!(decode(word).is_err());
    }
}
