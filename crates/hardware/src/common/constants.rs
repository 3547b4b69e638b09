//! Global System Constants.
//!
//! This module defines system-wide constants used across the simulator. It includes:
//! 1. **Vectors:** Fixed addresses the processor jumps to on reset, interrupt and exception.
//! 2. **Register Conventions:** GPRs written implicitly by hardware (return addresses).
//! 3. **Word Geometry:** Instruction width and alignment masks.

/// Number of general purpose registers.
pub const GPR_COUNT: usize = 32;

/// Number of processor version registers.
pub const PVR_COUNT: usize = 12;

/// Size of every instruction in bytes.
pub const INSTRUCTION_SIZE: u32 = 4;

/// Address the processor starts fetching from after reset.
pub const RESET_VECTOR: u32 = 0x0000_0000;

/// Address taken when an external interrupt is accepted.
pub const INTERRUPT_VECTOR: u32 = 0x0000_0010;

/// Address taken when a hardware exception is raised.
pub const HW_EXCEPTION_VECTOR: u32 = 0x0000_0020;

/// Register receiving the return address on interrupt entry.
pub const INTERRUPT_RETURN_REG: usize = 14;

/// Register receiving the program counter when a breakpoint is hit.
pub const BREAK_RETURN_REG: usize = 16;

/// Register receiving the return address on hardware exception entry.
pub const EXCEPTION_RETURN_REG: usize = 17;

/// Mask selecting the word-aligned part of an address.
pub const WORD_MASK: u32 = !0x3;
