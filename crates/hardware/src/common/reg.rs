//! General Purpose Register File.
//!
//! This module provides the `RegisterFile` struct holding the 32 general purpose
//! registers. It provides:
//! 1. **Storage:** 32 words, `r0` hardwired to zero.
//! 2. **Access:** Read and write by index with the `r0` rule applied.
//! 3. **Observability:** A snapshot of all registers for tests and tracing.

use super::constants::GPR_COUNT;

/// General purpose register file (`r0`..`r31`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RegisterFile {
    regs: [u32; GPR_COUNT],
}

impl RegisterFile {
    /// Creates a new register file with all registers initialized to zero.
    pub const fn new() -> Self {
        Self {
            regs: [0; GPR_COUNT],
        }
    }

    /// Reads a general purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Register `r0` always returns 0.
    ///
    /// # Returns
    ///
    /// The 32-bit value stored in the register.
    #[inline]
    pub fn read(&self, idx: usize) -> u32 {
        if idx == 0 {
            0
        } else {
            self.regs[idx & (GPR_COUNT - 1)]
        }
    }

    /// Writes a general purpose register.
    ///
    /// # Arguments
    ///
    /// * `idx` - Register index (0-31). Writes to `r0` are ignored.
    /// * `val` - The value to write.
    #[inline]
    pub fn write(&mut self, idx: usize, val: u32) {
        if idx != 0 {
            self.regs[idx & (GPR_COUNT - 1)] = val;
        }
    }

    /// Clears every register.
    pub fn reset(&mut self) {
        self.regs = [0; GPR_COUNT];
    }

    /// Returns a copy of all 32 registers.
    pub const fn snapshot(&self) -> [u32; GPR_COUNT] {
        self.regs
    }
}
