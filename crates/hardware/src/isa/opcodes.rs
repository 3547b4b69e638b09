//! Major opcodes (bits 31-26) and sub-function codes.

/// `add` (type A, function 0).
pub const OP_ADD: u32 = 0x00;
/// `rsub` (type A, function 0).
pub const OP_RSUB: u32 = 0x01;
/// `addk` (type A, function 0).
pub const OP_ADDK: u32 = 0x04;
/// `rsubk` (type A, function 0).
pub const OP_RSUBK: u32 = 0x05;
/// `addi`.
pub const OP_ADDI: u32 = 0x08;
/// `rsubi`.
pub const OP_RSUBI: u32 = 0x09;
/// `addik`.
pub const OP_ADDIK: u32 = 0x0C;
/// `rsubik`.
pub const OP_RSUBIK: u32 = 0x0D;

/// `or` and `pcmpbf`.
pub const OP_OR: u32 = 0x20;
/// `and`.
pub const OP_AND: u32 = 0x21;
/// `xor` and `pcmpeq`.
pub const OP_XOR: u32 = 0x22;
/// `andn` and `pcmpne`.
pub const OP_ANDN: u32 = 0x23;
/// Shifts and sign extensions (`sra`, `src`, `srl`, `sext8`, `sext16`).
pub const OP_UNARY: u32 = 0x24;
/// Special register moves (`mfs`, `mts`, `msrset`, `msrclr`).
pub const OP_SPECIAL: u32 = 0x25;
/// Unconditional register branches and `brk`.
pub const OP_BR: u32 = 0x26;
/// Conditional register branches.
pub const OP_BCC: u32 = 0x27;
/// `ori`.
pub const OP_ORI: u32 = 0x28;
/// `andi`.
pub const OP_ANDI: u32 = 0x29;
/// `xori`.
pub const OP_XORI: u32 = 0x2A;
/// `andni`.
pub const OP_ANDNI: u32 = 0x2B;
/// `imm` prefix.
pub const OP_IMM: u32 = 0x2C;
/// Returns (`rtsd`, `rtid`, `rtbd`, `rted`).
pub const OP_RET: u32 = 0x2D;
/// Unconditional immediate branches and `brki`.
pub const OP_BRI: u32 = 0x2E;
/// Conditional immediate branches.
pub const OP_BCCI: u32 = 0x2F;

/// `lbu`.
pub const OP_LBU: u32 = 0x30;
/// `lhu`.
pub const OP_LHU: u32 = 0x31;
/// `lw`.
pub const OP_LW: u32 = 0x32;
/// `sb`.
pub const OP_SB: u32 = 0x34;
/// `sh`.
pub const OP_SH: u32 = 0x35;
/// `sw`.
pub const OP_SW: u32 = 0x36;
/// `lbui`.
pub const OP_LBUI: u32 = 0x38;
/// `lhui`.
pub const OP_LHUI: u32 = 0x39;
/// `lwi`.
pub const OP_LWI: u32 = 0x3A;
/// `sbi`.
pub const OP_SBI: u32 = 0x3C;
/// `shi`.
pub const OP_SHI: u32 = 0x3D;
/// `swi`.
pub const OP_SWI: u32 = 0x3E;

/// Pattern compare function bit shared by `pcmpbf`, `pcmpeq` and `pcmpne`.
pub const FUNC_PCMP: u32 = 0x400;

/// `sra` function code.
pub const FUNC_SRA: u32 = 0x01;
/// `src` function code.
pub const FUNC_SRC: u32 = 0x21;
/// `srl` function code.
pub const FUNC_SRL: u32 = 0x41;
/// `sext8` function code.
pub const FUNC_SEXT8: u32 = 0x60;
/// `sext16` function code.
pub const FUNC_SEXT16: u32 = 0x61;

/// Branch `rA` field bit: delay slot.
pub const BR_DELAY: u8 = 0x10;
/// Branch `rA` field bit: absolute target.
pub const BR_ABSOLUTE: u8 = 0x08;
/// Branch `rA` field bit: link into `rD`.
pub const BR_LINK: u8 = 0x04;
/// `rA` field of `brk`/`brki`.
pub const BR_BREAK: u8 = 0x0C;

/// Conditional branch `rD` field bit: delay slot.
pub const BCC_DELAY: u8 = 0x10;

/// `rD` field of `rtsd`.
pub const RET_SUBROUTINE: u8 = 0x10;
/// `rD` field of `rtid`.
pub const RET_INTERRUPT: u8 = 0x11;
/// `rD` field of `rtbd`.
pub const RET_BREAK: u8 = 0x12;
/// `rD` field of `rted`.
pub const RET_EXCEPTION: u8 = 0x14;

/// `mts` marker in bits 15-3 (bits 15 and 14 set, the rest clear).
pub const MTS_MARKER: u32 = 0x1800;
