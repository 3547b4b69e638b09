//! Special purpose registers.
//!
//! This module defines the registers reachable through `mfs` and `mts`. It provides:
//! 1. **Selectors:** The 14-bit selector encoding used by the move instructions.
//! 2. **Storage:** The `SpecialRegisters` block (MSR, EAR, ESR, FSR, BTR, PVR).
//! 3. **Exception Causes:** ESR cause codes written on hardware exception entry.

use crate::common::constants::PVR_COUNT;
use crate::core::arch::msr::Msr;

/// ESR cause: unaligned data access.
pub const ESR_UNALIGNED: u32 = 0x1;
/// ESR cause: illegal opcode.
pub const ESR_ILLEGAL: u32 = 0x2;
/// ESR cause: instruction bus error.
pub const ESR_INSTRUCTION_BUS: u32 = 0x3;
/// ESR cause: data bus error.
pub const ESR_DATA_BUS: u32 = 0x4;
/// Mask of the cause field in the ESR.
pub const ESR_CAUSE_MASK: u32 = 0x1F;
/// ESR detail bit set when the unaligned access was a store.
pub const ESR_STORE: u32 = 0x400;

/// Selector of the first processor version register.
const PVR_BASE: u16 = 0x2000;

/// A special purpose register as named by a move selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialRegister {
    /// Program counter of the executing instruction (read only).
    Pc,
    /// Machine status register.
    Msr,
    /// Exception address register.
    Ear,
    /// Exception status register.
    Esr,
    /// Floating point status register.
    Fsr,
    /// Branch target register (read only).
    Btr,
    /// Processor version register `n` (read only).
    Pvr(u8),
}

impl SpecialRegister {
    /// Resolves an `mfs`/`mts` selector. Returns `None` for selectors with no register.
    pub const fn from_selector(selector: u16) -> Option<Self> {
        match selector {
            0x0 => Some(Self::Pc),
            0x1 => Some(Self::Msr),
            0x3 => Some(Self::Ear),
            0x5 => Some(Self::Esr),
            0x7 => Some(Self::Fsr),
            0xB => Some(Self::Btr),
            s if s >= PVR_BASE && s < PVR_BASE + PVR_COUNT as u16 => Some(Self::Pvr((s - PVR_BASE) as u8)),
            _ => None,
        }
    }

    /// The selector encoding this register.
    pub const fn selector(self) -> u16 {
        match self {
            Self::Pc => 0x0,
            Self::Msr => 0x1,
            Self::Ear => 0x3,
            Self::Esr => 0x5,
            Self::Fsr => 0x7,
            Self::Btr => 0xB,
            Self::Pvr(n) => PVR_BASE + n as u16,
        }
    }

    /// Returns `true` for registers `mts` may write.
    pub const fn is_writable(self) -> bool {
        matches!(self, Self::Msr | Self::Ear | Self::Esr | Self::Fsr)
    }

    /// Assembler name (`rmsr`, `rpvr3`, ...).
    pub fn name(self) -> String {
        match self {
            Self::Pc => "rpc".to_owned(),
            Self::Msr => "rmsr".to_owned(),
            Self::Ear => "rear".to_owned(),
            Self::Esr => "resr".to_owned(),
            Self::Fsr => "rfsr".to_owned(),
            Self::Btr => "rbtr".to_owned(),
            Self::Pvr(n) => format!("rpvr{n}"),
        }
    }
}

/// Special purpose register block, without the program counter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialRegisters {
    /// Machine status register.
    pub msr: Msr,
    /// Exception address register.
    pub ear: u32,
    /// Exception status register.
    pub esr: u32,
    /// Floating point status register.
    pub fsr: u32,
    /// Branch target register.
    pub btr: u32,
    /// Processor version registers.
    pub pvr: [u32; PVR_COUNT],
}

impl SpecialRegisters {
    /// Creates the block with the given version registers and everything else zero.
    pub fn new(pvr: [u32; PVR_COUNT]) -> Self {
        Self {
            pvr,
            ..Self::default()
        }
    }

    /// Reads a register. `Pc` has no storage here and reads as `pc`.
    pub fn read(&self, register: SpecialRegister, pc: u32) -> u32 {
        match register {
            SpecialRegister::Pc => pc,
            SpecialRegister::Msr => self.msr.bits(),
            SpecialRegister::Ear => self.ear,
            SpecialRegister::Esr => self.esr,
            SpecialRegister::Fsr => self.fsr,
            SpecialRegister::Btr => self.btr,
            SpecialRegister::Pvr(n) => self.pvr.get(usize::from(n)).copied().unwrap_or(0),
        }
    }

    /// Writes a register. Read-only registers are left unchanged.
    ///
    /// Writing the MSR keeps `CC` in step with the written `C` bit.
    pub fn write(&mut self, register: SpecialRegister, value: u32) {
        match register {
            SpecialRegister::Msr => {
                let mut msr = Msr::from_bits_retain(value);
                msr.set_carry(msr.contains(Msr::C));
                self.msr = msr;
            }
            SpecialRegister::Ear => self.ear = value,
            SpecialRegister::Esr => self.esr = value,
            SpecialRegister::Fsr => self.fsr = value,
            SpecialRegister::Pc | SpecialRegister::Btr | SpecialRegister::Pvr(_) => {
                tracing::warn!(register = ?register, value, "write to read-only special register ignored");
            }
        }
    }

    /// Clears everything except the version registers.
    pub fn reset(&mut self) {
        *self = Self::new(self.pvr);
    }

    /// Replaces the cause field of the ESR, keeping its detail bits.
    pub const fn set_cause(&mut self, cause: u32) {
        self.esr = (self.esr & !ESR_CAUSE_MASK) | cause;
    }
}
