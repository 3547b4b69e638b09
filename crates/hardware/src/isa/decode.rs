//! Instruction decoder.
//!
//! This module turns 32-bit instruction words into [`Instruction`]s. Decoding happens once,
//! when the word is fetched; the resulting instruction carries its operands and the
//! latencies looked up from the configured table.
//!
//! Type A instructions take two source registers and a function field in bits 10-0. Type B
//! instructions replace `rB` and the function field with a 16-bit immediate. Any word that
//! does not match an implemented encoding decodes to [`Op::Illegal`], including the
//! all-zero word.

use crate::core::arch::SpecialRegister;
use crate::isa::instruction::{
    ArithKind, BranchKind, CompareKind, Condition, Instruction, InstructionBits, LogicKind, Op,
    Operand, ReturnKind, UnaryKind,
};
use crate::isa::latency::LatencyTable;
use crate::isa::opcodes;
use crate::soc::interconnect::Width;

/// Bit shift of the special register move sub-type (bits 15-14).
const SPECIAL_TYPE_SHIFT: u32 = 14;
/// Mask of the `mfs` selector and the `msrset`/`msrclr` immediate.
const SPECIAL_FIELD_MASK: u32 = 0x3FFF;
/// Bit shift of the `mts` marker field.
const MTS_MARKER_SHIFT: u32 = 3;
/// Mask of the `mts` marker field.
const MTS_MARKER_MASK: u32 = 0x1FFF;
/// Mask of the `mts` selector.
const MTS_SELECTOR_MASK: u32 = 0x7;

/// Decodes words into instructions with latencies from a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoder {
    table: LatencyTable,
}

impl Decoder {
    /// Creates a decoder over `table`.
    pub const fn new(table: LatencyTable) -> Self {
        Self { table }
    }

    /// The latency table.
    pub const fn table(&self) -> &LatencyTable {
        &self.table
    }

    /// Decodes `word` fetched from `pc`.
    ///
    /// # Arguments
    ///
    /// * `pc` - Address the word was fetched from.
    /// * `word` - The 32-bit encoding.
    ///
    /// # Returns
    ///
    /// The decoded instruction, or an illegal instruction for unknown encodings.
    pub fn decode(&self, pc: u32, word: u32) -> Instruction {
        let Some(op) = decode_op(word) else {
            return Instruction::illegal(pc, word);
        };
        let name = op.name();
        let cond_latency = if op.is_conditional() {
            self.table.cond_latency(name)
        } else {
            1
        };
        Instruction::new(pc, word, op, self.table.latency(name), cond_latency)
    }

    /// The synthetic `brai 0x10` that enters the interrupt vector.
    pub fn interrupt_entry(&self, pc: u32, vector: u32) -> Instruction {
        let op = Op::Branch {
            kind: BranchKind::Absolute,
            rd: 0,
            target: Operand::Imm(vector as u16),
        };
        Instruction::new(pc, 0, op, self.table.latency(op.name()), 1)
    }
}

/// Decodes the operation of `word`, or `None` when it is not an implemented encoding.
pub fn decode_op(word: u32) -> Option<Op> {
    let rd = word.rd();
    let ra = word.ra();
    let rb = word.rb();
    let imm = word.imm16();
    let func = word.func();

    let op = match word.opcode() {
        opcodes::OP_ADD | opcodes::OP_RSUB | opcodes::OP_ADDK | opcodes::OP_RSUBK => {
            if func != 0 || word == 0 {
                return None;
            }
            arith(word.opcode(), rd, ra, Operand::Reg(rb))
        }
        opcodes::OP_ADDI | opcodes::OP_RSUBI | opcodes::OP_ADDIK | opcodes::OP_RSUBIK => {
            arith(word.opcode(), rd, ra, Operand::Imm(imm))
        }

        opcodes::OP_OR | opcodes::OP_AND | opcodes::OP_XOR | opcodes::OP_ANDN => {
            return logic_or_compare(word.opcode(), rd, ra, rb, func);
        }
        opcodes::OP_ORI => logic(LogicKind::Or, rd, ra, Operand::Imm(imm)),
        opcodes::OP_ANDI => logic(LogicKind::And, rd, ra, Operand::Imm(imm)),
        opcodes::OP_XORI => logic(LogicKind::Xor, rd, ra, Operand::Imm(imm)),
        opcodes::OP_ANDNI => logic(LogicKind::Andn, rd, ra, Operand::Imm(imm)),

        opcodes::OP_UNARY => {
            if rd == 0 {
                return None;
            }
            let kind = match u32::from(imm) {
                opcodes::FUNC_SRA => UnaryKind::Sra,
                opcodes::FUNC_SRC => UnaryKind::Src,
                opcodes::FUNC_SRL => UnaryKind::Srl,
                opcodes::FUNC_SEXT8 => UnaryKind::Sext8,
                opcodes::FUNC_SEXT16 => UnaryKind::Sext16,
                _ => return None,
            };
            Op::Unary { kind, rd, ra }
        }

        opcodes::OP_SPECIAL => return special(word, rd, ra),

        opcodes::OP_BR => {
            if func != 0 {
                return None;
            }
            branch(rd, ra, Operand::Reg(rb))?
        }
        opcodes::OP_BRI => branch(rd, ra, Operand::Imm(imm))?,

        opcodes::OP_BCC => {
            if func != 0 {
                return None;
            }
            cond_branch(rd, ra, Operand::Reg(rb))?
        }
        opcodes::OP_BCCI => cond_branch(rd, ra, Operand::Imm(imm))?,

        opcodes::OP_IMM => {
            if rd != 0 || ra != 0 {
                return None;
            }
            Op::Imm { imm }
        }

        opcodes::OP_RET => {
            let kind = match rd {
                opcodes::RET_SUBROUTINE => ReturnKind::Subroutine,
                opcodes::RET_INTERRUPT => ReturnKind::Interrupt,
                opcodes::RET_BREAK => ReturnKind::Break,
                opcodes::RET_EXCEPTION => ReturnKind::Exception,
                _ => return None,
            };
            Op::Return { kind, ra, imm }
        }

        opcodes::OP_LBU | opcodes::OP_LHU | opcodes::OP_LW => {
            if func != 0 {
                return None;
            }
            Op::Load {
                width: width(word.opcode()),
                rd,
                ra,
                offset: Operand::Reg(rb),
            }
        }
        opcodes::OP_LBUI | opcodes::OP_LHUI | opcodes::OP_LWI => Op::Load {
            width: width(word.opcode()),
            rd,
            ra,
            offset: Operand::Imm(imm),
        },
        opcodes::OP_SB | opcodes::OP_SH | opcodes::OP_SW => {
            if func != 0 {
                return None;
            }
            Op::Store {
                width: width(word.opcode()),
                rd,
                ra,
                offset: Operand::Reg(rb),
            }
        }
        opcodes::OP_SBI | opcodes::OP_SHI | opcodes::OP_SWI => Op::Store {
            width: width(word.opcode()),
            rd,
            ra,
            offset: Operand::Imm(imm),
        },

        _ => return None,
    };
    Some(op)
}

fn arith(opcode: u32, rd: u8, ra: u8, b: Operand) -> Op {
    // Bit 0 selects reverse-subtract, bit 2 keeps the carry.
    let kind = if opcode & 0x1 == 0 {
        ArithKind::Add
    } else {
        ArithKind::Rsub
    };
    Op::Arith {
        kind,
        keep_carry: opcode & 0x4 != 0,
        rd,
        ra,
        b,
    }
}

const fn logic(kind: LogicKind, rd: u8, ra: u8, b: Operand) -> Op {
    Op::Logic { kind, rd, ra, b }
}

fn logic_or_compare(opcode: u32, rd: u8, ra: u8, rb: u8, func: u32) -> Option<Op> {
    let kind = match opcode {
        opcodes::OP_OR => LogicKind::Or,
        opcodes::OP_AND => LogicKind::And,
        opcodes::OP_XOR => LogicKind::Xor,
        _ => LogicKind::Andn,
    };
    match func {
        0 => Some(logic(kind, rd, ra, Operand::Reg(rb))),
        opcodes::FUNC_PCMP => {
            let kind = match kind {
                LogicKind::Or => CompareKind::ByteFind,
                LogicKind::Xor => CompareKind::Equal,
                LogicKind::Andn => CompareKind::NotEqual,
                LogicKind::And => return None,
            };
            Some(Op::Compare { kind, rd, ra, rb })
        }
        _ => None,
    }
}

fn special(word: u32, rd: u8, ra: u8) -> Option<Op> {
    let field = word & SPECIAL_FIELD_MASK;
    match (word >> SPECIAL_TYPE_SHIFT) & 0x3 {
        0b00 => match ra {
            0x00 => Some(Op::MsrSet { rd, imm: field as u16 }),
            0x01 => Some(Op::MsrClr { rd, imm: field as u16 }),
            _ => None,
        },
        0b10 if ra == 0 => {
            let reg = SpecialRegister::from_selector(field as u16)?;
            Some(Op::Mfs { rd, reg })
        }
        0b11 if rd == 0 && (word >> MTS_MARKER_SHIFT) & MTS_MARKER_MASK == opcodes::MTS_MARKER => {
            let reg = SpecialRegister::from_selector((word & MTS_SELECTOR_MASK) as u16)?;
            reg.is_writable().then_some(Op::Mts { ra, reg })
        }
        _ => None,
    }
}

fn branch(rd: u8, field: u8, target: Operand) -> Option<Op> {
    if field == opcodes::BR_BREAK {
        return Some(Op::Break { rd, target });
    }
    let kind = BranchKind::from_field(field)?;
    if !kind.is_link() && rd != 0 {
        return None;
    }
    Some(Op::Branch { kind, rd, target })
}

fn cond_branch(field: u8, ra: u8, target: Operand) -> Option<Op> {
    if field & !(opcodes::BCC_DELAY | 0x7) != 0 {
        return None;
    }
    let cond = Condition::from_field(field)?;
    Some(Op::CondBranch {
        cond,
        delay: field & opcodes::BCC_DELAY != 0,
        ra,
        target,
    })
}

const fn width(opcode: u32) -> Width {
    match opcode & 0x3 {
        0 => Width::Byte,
        1 => Width::Half,
        _ => Width::Word,
    }
}
