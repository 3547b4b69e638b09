//! Architectural state an instruction reads and writes while it executes.

use crate::common::RegisterFile;
use crate::common::constants::{PVR_COUNT, RESET_VECTOR};
use crate::core::arch::{Msr, SpecialRegisters};

/// Registers, special registers, fetch address and the pending immediate prefix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CpuState {
    /// General purpose registers.
    pub regs: RegisterFile,
    /// Special purpose registers.
    pub special: SpecialRegisters,
    /// Address of the next instruction to fetch. Branches write their target here.
    pub pc: u32,
    /// Upper half set by the last `imm` prefix.
    pub imm_upper: u32,
    /// Set by `imm` and consumed by the next instruction that takes an immediate.
    pub imm_pending: bool,
}

impl CpuState {
    /// Creates reset state with the given version registers.
    pub fn new(pvr: [u32; PVR_COUNT]) -> Self {
        Self {
            regs: RegisterFile::new(),
            special: SpecialRegisters::new(pvr),
            pc: RESET_VECTOR,
            imm_upper: 0,
            imm_pending: false,
        }
    }

    /// Returns to reset state, keeping the version registers.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.special.reset();
        self.pc = RESET_VECTOR;
        self.imm_upper = 0;
        self.imm_pending = false;
    }

    /// Reads a general purpose register.
    #[inline]
    pub fn reg(&self, idx: u8) -> u32 {
        self.regs.read(usize::from(idx))
    }

    /// Writes a general purpose register.
    #[inline]
    pub fn set_reg(&mut self, idx: u8, value: u32) {
        self.regs.write(usize::from(idx), value);
    }

    /// Current machine status register.
    #[inline]
    pub const fn msr(&self) -> Msr {
        self.special.msr
    }

    /// Mutable machine status register.
    #[inline]
    pub const fn msr_mut(&mut self) -> &mut Msr {
        &mut self.special.msr
    }

    /// Records an `imm` prefix.
    pub const fn set_imm(&mut self, imm16: u16) {
        self.imm_upper = (imm16 as u32) << 16;
        self.imm_pending = true;
    }

    /// Assembles a 32-bit immediate from `imm16`.
    ///
    /// With a pending prefix the result is `upper | imm16` and the prefix is consumed;
    /// otherwise `imm16` is sign-extended.
    pub const fn take_imm(&mut self, imm16: u16) -> u32 {
        if self.imm_pending {
            self.imm_pending = false;
            self.imm_upper | imm16 as u32
        } else {
            imm16 as i16 as i32 as u32
        }
    }
}
