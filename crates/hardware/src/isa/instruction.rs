//! Instruction encoding fields and the decoded instruction.
//!
//! This module provides the pieces the decoder produces and the pipeline steps:
//! 1. **Field Extraction:** The `InstructionBits` trait pulls register and immediate fields
//!    out of a 32-bit word.
//! 2. **Operations:** The closed `Op` enum with one variant per instruction family.
//! 3. **Instructions:** `Instruction` pairs an `Op` with its address, latencies, the
//!    latency counter and a run-control marker.

use crate::core::arch::SpecialRegister;
use crate::soc::interconnect::Width;

/// Bit shift of the major opcode (bits 31-26).
const OPCODE_SHIFT: u32 = 26;
/// Bit shift of the destination register field (bits 25-21).
const RD_SHIFT: u32 = 21;
/// Bit shift of the first source register field (bits 20-16).
const RA_SHIFT: u32 = 16;
/// Bit shift of the second source register field (bits 15-11).
const RB_SHIFT: u32 = 11;
/// Mask of a register field.
const REG_MASK: u32 = 0x1F;
/// Mask of the type A function field (bits 10-0).
const FUNC_MASK: u32 = 0x7FF;

/// Trait for extracting instruction fields from encoded instructions.
pub trait InstructionBits {
    /// Major opcode (bits 31-26).
    fn opcode(&self) -> u32;

    /// Destination register field (bits 25-21).
    fn rd(&self) -> u8;

    /// First source register field (bits 20-16).
    fn ra(&self) -> u8;

    /// Second source register field (bits 15-11).
    fn rb(&self) -> u8;

    /// Type B immediate (bits 15-0), not extended.
    fn imm16(&self) -> u16;

    /// Type A function field (bits 10-0).
    fn func(&self) -> u32;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u32 {
        self >> OPCODE_SHIFT
    }

    #[inline(always)]
    fn rd(&self) -> u8 {
        ((self >> RD_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn ra(&self) -> u8 {
        ((self >> RA_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn rb(&self) -> u8 {
        ((self >> RB_SHIFT) & REG_MASK) as u8
    }

    #[inline(always)]
    fn imm16(&self) -> u16 {
        *self as u16
    }

    #[inline(always)]
    fn func(&self) -> u32 {
        self & FUNC_MASK
    }
}

/// Second operand: a register or a 16-bit immediate awaiting assembly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Register index.
    Reg(u8),
    /// Raw immediate field; extended or combined with an `imm` prefix at execution.
    Imm(u16),
}

impl Operand {
    /// Returns `true` for the immediate form.
    pub const fn is_imm(self) -> bool {
        matches!(self, Self::Imm(_))
    }
}

/// Add or reverse-subtract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArithKind {
    /// `rD = rA + b`.
    Add,
    /// `rD = b - rA`.
    Rsub,
}

/// Bitwise logic operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LogicKind {
    /// `rA | b`.
    Or,
    /// `rA & b`.
    And,
    /// `rA ^ b`.
    Xor,
    /// `rA & !b`.
    Andn,
}

/// Pattern compare operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompareKind {
    /// 1-based index of the first equal byte lane, MSB first, else 0.
    ByteFind,
    /// 1 when equal, else 0.
    Equal,
    /// 1 when different, else 0.
    NotEqual,
}

/// Single-source shift or sign extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryKind {
    /// Arithmetic shift right by one; carry receives bit 0.
    Sra,
    /// Shift right through carry.
    Src,
    /// Logical shift right by one; carry receives bit 0.
    Srl,
    /// Sign-extend the low byte.
    Sext8,
    /// Sign-extend the low halfword.
    Sext16,
}

/// Unconditional branch form, from the `rA` field of the encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BranchKind {
    /// Relative.
    Relative,
    /// Relative with delay slot.
    RelativeDelay,
    /// Relative with delay slot, linking into `rD`.
    RelativeLink,
    /// Absolute.
    Absolute,
    /// Absolute with delay slot.
    AbsoluteDelay,
    /// Absolute with delay slot, linking into `rD`.
    AbsoluteLink,
}

impl BranchKind {
    /// Decodes the `rA` field. `None` for `brk` and unassigned combinations.
    pub const fn from_field(field: u8) -> Option<Self> {
        match field {
            0x00 => Some(Self::Relative),
            0x10 => Some(Self::RelativeDelay),
            0x14 => Some(Self::RelativeLink),
            0x08 => Some(Self::Absolute),
            0x18 => Some(Self::AbsoluteDelay),
            0x1C => Some(Self::AbsoluteLink),
            _ => None,
        }
    }

    /// Returns `true` when the target replaces the program counter.
    pub const fn is_absolute(self) -> bool {
        matches!(self, Self::Absolute | Self::AbsoluteDelay | Self::AbsoluteLink)
    }

    /// Returns `true` when the following instruction still executes.
    pub const fn has_delay(self) -> bool {
        !matches!(self, Self::Relative | Self::Absolute)
    }

    /// Returns `true` when the branch address is written into `rD`.
    pub const fn is_link(self) -> bool {
        matches!(self, Self::RelativeLink | Self::AbsoluteLink)
    }
}

/// Conditional branch comparison of `rA` against zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Condition {
    /// `rA == 0`.
    Eq,
    /// `rA != 0`.
    Ne,
    /// `rA < 0`.
    Lt,
    /// `rA <= 0`.
    Le,
    /// `rA > 0`.
    Gt,
    /// `rA >= 0`.
    Ge,
}

impl Condition {
    /// Decodes the low three bits of the `rD` field.
    pub const fn from_field(field: u8) -> Option<Self> {
        match field & 0x7 {
            0 => Some(Self::Eq),
            1 => Some(Self::Ne),
            2 => Some(Self::Lt),
            3 => Some(Self::Le),
            4 => Some(Self::Gt),
            5 => Some(Self::Ge),
            _ => None,
        }
    }
}

/// Return-from flavour, from the `rD` field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReturnKind {
    /// Return from subroutine.
    Subroutine,
    /// Return from interrupt; sets IE.
    Interrupt,
    /// Return from break; clears BIP.
    Break,
    /// Return from exception; sets EE and clears EIP.
    Exception,
}

/// Decoded operation with its operand fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Pipeline bubble.
    Empty,
    /// Undecodable word.
    Illegal,
    /// Fetch from an address nothing backs.
    BusFault,
    /// `add`, `rsub`, `addk`, `rsubk` and their immediate forms.
    Arith {
        /// Add or reverse-subtract.
        kind: ArithKind,
        /// `k` variants leave the carry alone.
        keep_carry: bool,
        /// Destination.
        rd: u8,
        /// First source.
        ra: u8,
        /// Second source.
        b: Operand,
    },
    /// `or`, `and`, `xor`, `andn` and their immediate forms.
    Logic {
        /// Operation.
        kind: LogicKind,
        /// Destination.
        rd: u8,
        /// First source.
        ra: u8,
        /// Second source.
        b: Operand,
    },
    /// `pcmpbf`, `pcmpeq`, `pcmpne`.
    Compare {
        /// Operation.
        kind: CompareKind,
        /// Destination.
        rd: u8,
        /// First source.
        ra: u8,
        /// Second source.
        rb: u8,
    },
    /// `sra`, `src`, `srl`, `sext8`, `sext16`.
    Unary {
        /// Operation.
        kind: UnaryKind,
        /// Destination.
        rd: u8,
        /// Source.
        ra: u8,
    },
    /// `br` and `bri` families.
    Branch {
        /// Form.
        kind: BranchKind,
        /// Link register (zero when not linking).
        rd: u8,
        /// Target or offset.
        target: Operand,
    },
    /// `brk` and `brki`.
    Break {
        /// Link register.
        rd: u8,
        /// Absolute target.
        target: Operand,
    },
    /// `beq`..`bge`, with delay and immediate forms.
    CondBranch {
        /// Comparison against zero.
        cond: Condition,
        /// The following instruction still executes when taken.
        delay: bool,
        /// Tested register.
        ra: u8,
        /// Offset from the branch address.
        target: Operand,
    },
    /// `rtsd`, `rtid`, `rtbd`, `rted`.
    Return {
        /// Flavour.
        kind: ReturnKind,
        /// Base register.
        ra: u8,
        /// Offset.
        imm: u16,
    },
    /// `imm` prefix.
    Imm {
        /// Upper halfword of the next immediate.
        imm: u16,
    },
    /// Zero-extending loads.
    Load {
        /// Access width.
        width: Width,
        /// Destination.
        rd: u8,
        /// Base register.
        ra: u8,
        /// Offset.
        offset: Operand,
    },
    /// Stores of the low `width` bits of `rD`.
    Store {
        /// Access width.
        width: Width,
        /// Source.
        rd: u8,
        /// Base register.
        ra: u8,
        /// Offset.
        offset: Operand,
    },
    /// `msrset`: `rD = MSR; MSR |= imm`.
    MsrSet {
        /// Receives the old MSR.
        rd: u8,
        /// Bits to set.
        imm: u16,
    },
    /// `msrclr`: `rD = MSR; MSR &= !imm`.
    MsrClr {
        /// Receives the old MSR.
        rd: u8,
        /// Bits to clear.
        imm: u16,
    },
    /// `mfs`: move from special register.
    Mfs {
        /// Destination.
        rd: u8,
        /// Source register.
        reg: SpecialRegister,
    },
    /// `mts`: move to special register.
    Mts {
        /// Source.
        ra: u8,
        /// Destination register.
        reg: SpecialRegister,
    },
}

impl Op {
    /// Assembler mnemonic, also the key of the latency tables.
    pub const fn name(&self) -> &'static str {
        match *self {
            Self::Empty => "empty",
            Self::Illegal => "illegal",
            Self::BusFault => "ibus",
            Self::Arith { kind, keep_carry, b, .. } => match (kind, keep_carry, b.is_imm()) {
                (ArithKind::Add, false, false) => "add",
                (ArithKind::Add, true, false) => "addk",
                (ArithKind::Add, false, true) => "addi",
                (ArithKind::Add, true, true) => "addik",
                (ArithKind::Rsub, false, false) => "rsub",
                (ArithKind::Rsub, true, false) => "rsubk",
                (ArithKind::Rsub, false, true) => "rsubi",
                (ArithKind::Rsub, true, true) => "rsubik",
            },
            Self::Logic { kind, b, .. } => match (kind, b.is_imm()) {
                (LogicKind::Or, false) => "or",
                (LogicKind::And, false) => "and",
                (LogicKind::Xor, false) => "xor",
                (LogicKind::Andn, false) => "andn",
                (LogicKind::Or, true) => "ori",
                (LogicKind::And, true) => "andi",
                (LogicKind::Xor, true) => "xori",
                (LogicKind::Andn, true) => "andni",
            },
            Self::Compare { kind, .. } => match kind {
                CompareKind::ByteFind => "pcmpbf",
                CompareKind::Equal => "pcmpeq",
                CompareKind::NotEqual => "pcmpne",
            },
            Self::Unary { kind, .. } => match kind {
                UnaryKind::Sra => "sra",
                UnaryKind::Src => "src",
                UnaryKind::Srl => "srl",
                UnaryKind::Sext8 => "sext8",
                UnaryKind::Sext16 => "sext16",
            },
            Self::Branch { kind, target, .. } => match (kind, target.is_imm()) {
                (BranchKind::Relative, false) => "br",
                (BranchKind::RelativeDelay, false) => "brd",
                (BranchKind::RelativeLink, false) => "brld",
                (BranchKind::Absolute, false) => "bra",
                (BranchKind::AbsoluteDelay, false) => "brad",
                (BranchKind::AbsoluteLink, false) => "brald",
                (BranchKind::Relative, true) => "bri",
                (BranchKind::RelativeDelay, true) => "brid",
                (BranchKind::RelativeLink, true) => "brlid",
                (BranchKind::Absolute, true) => "brai",
                (BranchKind::AbsoluteDelay, true) => "braid",
                (BranchKind::AbsoluteLink, true) => "bralid",
            },
            Self::Break { target, .. } => {
                if target.is_imm() {
                    "brki"
                } else {
                    "brk"
                }
            }
            Self::CondBranch { cond, delay, target, .. } => {
                const NAMES: [[&str; 6]; 4] = [
                    ["beq", "bne", "blt", "ble", "bgt", "bge"],
                    ["beqd", "bned", "bltd", "bled", "bgtd", "bged"],
                    ["beqi", "bnei", "blti", "blei", "bgti", "bgei"],
                    ["beqid", "bneid", "bltid", "bleid", "bgtid", "bgeid"],
                ];
                let row = (target.is_imm() as usize) * 2 + delay as usize;
                NAMES[row][cond as usize]
            }
            Self::Return { kind, .. } => match kind {
                ReturnKind::Subroutine => "rtsd",
                ReturnKind::Interrupt => "rtid",
                ReturnKind::Break => "rtbd",
                ReturnKind::Exception => "rted",
            },
            Self::Imm { .. } => "imm",
            Self::Load { width, offset, .. } => match (width, offset.is_imm()) {
                (Width::Byte, false) => "lbu",
                (Width::Half, false) => "lhu",
                (Width::Word, false) => "lw",
                (Width::Byte, true) => "lbui",
                (Width::Half, true) => "lhui",
                (Width::Word, true) => "lwi",
            },
            Self::Store { width, offset, .. } => match (width, offset.is_imm()) {
                (Width::Byte, false) => "sb",
                (Width::Half, false) => "sh",
                (Width::Word, false) => "sw",
                (Width::Byte, true) => "sbi",
                (Width::Half, true) => "shi",
                (Width::Word, true) => "swi",
            },
            Self::MsrSet { .. } => "msrset",
            Self::MsrClr { .. } => "msrclr",
            Self::Mfs { .. } => "mfs",
            Self::Mts { .. } => "mts",
        }
    }

    /// Returns `true` for the conditional branches, the only operations with a
    /// conditional latency.
    pub const fn is_conditional(&self) -> bool {
        matches!(self, Self::CondBranch { .. })
    }
}

/// Run-control wrapper armed on an instruction when it is fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Marker {
    /// Execute normally.
    #[default]
    None,
    /// Stop before executing; write `r16 = pc` and report a breakpoint.
    Breakpoint,
    /// The program's exit function; report stop.
    Stop,
}

/// A decoded instruction occupying a pipeline slot.
///
/// Operands are fixed at decode. The latency counter and the resolved memory address
/// are the only state that changes while the instruction sits in the execute slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    /// Address the instruction was fetched from.
    pub pc: u32,
    /// Raw encoding.
    pub word: u32,
    /// Decoded operation.
    pub op: Op,
    pub(crate) latency: u32,
    pub(crate) cond_latency: u32,
    pub(crate) cycles: u32,
    pub(crate) address: Option<u32>,
    pub(crate) marker: Marker,
}

impl Default for Instruction {
    fn default() -> Self {
        Self::empty()
    }
}

impl Instruction {
    /// Creates an instruction with its latencies. Zero latencies are raised to one.
    pub const fn new(pc: u32, word: u32, op: Op, latency: u32, cond_latency: u32) -> Self {
        Self {
            pc,
            word,
            op,
            latency: if latency == 0 { 1 } else { latency },
            cond_latency: if cond_latency == 0 { 1 } else { cond_latency },
            cycles: 1,
            address: None,
            marker: Marker::None,
        }
    }

    /// A pipeline bubble.
    pub const fn empty() -> Self {
        Self::new(0, 0, Op::Empty, 1, 1)
    }

    /// An undecodable word.
    pub const fn illegal(pc: u32, word: u32) -> Self {
        Self::new(pc, word, Op::Illegal, 1, 1)
    }

    /// A fetch from an address nothing backs.
    pub const fn bus_fault(pc: u32) -> Self {
        Self::new(pc, 0, Op::BusFault, 1, 1)
    }

    /// Returns `true` for a bubble.
    pub const fn is_empty(&self) -> bool {
        matches!(self.op, Op::Empty)
    }

    /// Fetch address, `None` for a bubble.
    pub const fn address(&self) -> Option<u32> {
        if self.is_empty() { None } else { Some(self.pc) }
    }

    /// Mnemonic.
    pub const fn name(&self) -> &'static str {
        self.op.name()
    }

    /// Cycles the instruction occupies the execute slot (not-taken path for branches).
    pub const fn latency(&self) -> u32 {
        self.latency
    }

    /// Cycles a taken conditional branch occupies the execute slot.
    pub const fn cond_latency(&self) -> u32 {
        self.cond_latency
    }

    /// Current value of the latency counter (1 when idle).
    pub const fn cycles(&self) -> u32 {
        self.cycles
    }

    /// Run-control marker.
    pub const fn marker(&self) -> Marker {
        self.marker
    }

    /// Arms or clears the run-control marker.
    pub const fn set_marker(&mut self, marker: Marker) {
        self.marker = marker;
    }

    /// Returns the instruction with `marker` armed.
    #[must_use]
    pub const fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = marker;
        self
    }
}
