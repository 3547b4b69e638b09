//! Instruction disassembler.
//!
//! Converts a 32-bit instruction encoding into assembler text for traces, logs and test
//! diagnostics. Immediates print as signed decimals, the way they are written in source.
//!
//! # Usage
//!
//! ```
//! use opbsim_core::isa::disasm::disassemble;
//!
//! assert_eq!(disassemble(0x3021_FFFC), "addik r1, r1, -4");
//! assert_eq!(disassemble(0), "illegal");
//! ```

use std::fmt;

use crate::isa::decode::decode_op;
use crate::isa::instruction::{Instruction, Op, Operand};

/// Disassembles a 32-bit word into assembler text, or `"illegal"` for unknown encodings.
pub fn disassemble(word: u32) -> String {
    decode_op(word).map_or_else(|| "illegal".to_owned(), |op| op.to_string())
}

struct Reg(u8);

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Reg(idx) => Reg(idx).fmt(f),
            Self::Imm(imm) => write!(f, "{}", imm as i16),
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        match *self {
            Self::Empty | Self::Illegal | Self::BusFault => f.write_str(name),
            Self::Arith { rd, ra, b, .. } | Self::Logic { rd, ra, b, .. } => {
                write!(f, "{name} {}, {}, {b}", Reg(rd), Reg(ra))
            }
            Self::Load { rd, ra, offset, .. } | Self::Store { rd, ra, offset, .. } => {
                write!(f, "{name} {}, {}, {offset}", Reg(rd), Reg(ra))
            }
            Self::Compare { rd, ra, rb, .. } => write!(f, "{name} {}, {}, {}", Reg(rd), Reg(ra), Reg(rb)),
            Self::Unary { rd, ra, .. } => write!(f, "{name} {}, {}", Reg(rd), Reg(ra)),
            Self::Branch { kind, rd, target } => {
                if kind.is_link() {
                    write!(f, "{name} {}, {target}", Reg(rd))
                } else {
                    write!(f, "{name} {target}")
                }
            }
            Self::Break { rd, target } => write!(f, "{name} {}, {target}", Reg(rd)),
            Self::CondBranch { ra, target, .. } => write!(f, "{name} {}, {target}", Reg(ra)),
            Self::Return { ra, imm, .. } => write!(f, "{name} {}, {}", Reg(ra), imm as i16),
            Self::Imm { imm } => write!(f, "{name} {imm:#x}"),
            Self::MsrSet { rd, imm } | Self::MsrClr { rd, imm } => write!(f, "{name} {}, {imm:#x}", Reg(rd)),
            Self::Mfs { rd, reg } => write!(f, "{name} {}, {}", Reg(rd), reg.name()),
            Self::Mts { ra, reg } => write!(f, "{name} {}, {}", reg.name(), Reg(ra)),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty");
        }
        write!(f, "{:#010x}: {}", self.pc, self.op)
    }
}
