//! Instruction Set Architecture (ISA) Definitions.
//!
//! Contains the opcodes, the decoder, the latency tables and the execution of every
//! implemented instruction.
//!
//! # Families
//!
//! * Arithmetic: `add`, `rsub` and their keep-carry and immediate forms.
//! * Logic and pattern compare: `or`, `and`, `xor`, `andn`, `pcmpbf`, `pcmpeq`, `pcmpne`.
//! * Shifts and sign extension: `sra`, `src`, `srl`, `sext8`, `sext16`.
//! * Branches: the `br`/`bri` families, conditional branches, returns and `brk`/`brki`.
//! * Memory: byte, halfword and word loads and stores.
//! * Special registers: `mfs`, `mts`, `msrset`, `msrclr`, and the `imm` prefix.

/// Instruction decoding from 32-bit words.
pub mod decode;

/// Instruction disassembler for traces and diagnostics.
pub mod disasm;

/// Step semantics of every instruction.
pub mod execute;

/// Encoding fields, operations and the decoded instruction.
pub mod instruction;

/// Per-mnemonic latency tables.
pub mod latency;

/// Major opcodes and function codes.
pub mod opcodes;

pub use decode::Decoder;
pub use instruction::{Instruction, Marker, Op};
