//! Machine Status Register.
//!
//! The MSR holds the carry, interrupt, break and exception state of the processor. The
//! carry is kept twice: `C` is the architectural bit and `CC` is its read-only copy in the
//! sign position, so a single signed compare can test it.

use bitflags::bitflags;

bitflags! {
    /// Machine status register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Msr: u32 {
        /// Carry copy (mirror of `C`).
        const CC = 0x8000_0000;
        /// Processor version registers present.
        const PVR = 0x400;
        /// Exception in progress.
        const EIP = 0x200;
        /// Hardware exceptions enabled.
        const EE = 0x100;
        /// Data cache enabled.
        const DCE = 0x80;
        /// Division by zero.
        const DZ = 0x40;
        /// Instruction cache enabled.
        const ICE = 0x20;
        /// Fast simplex link error.
        const FSL = 0x10;
        /// Break in progress.
        const BIP = 0x8;
        /// Arithmetic carry.
        const C = 0x4;
        /// Interrupts enabled.
        const IE = 0x2;
        /// Buslock enable.
        const BE = 0x1;

        /// Both carry bits.
        const CARRY = Self::C.bits() | Self::CC.bits();
    }
}

impl Msr {
    /// Returns the carry bit.
    #[inline]
    pub const fn carry(self) -> bool {
        self.contains(Self::C)
    }

    /// Sets or clears both carry bits together.
    #[inline]
    pub fn set_carry(&mut self, carry: bool) {
        self.set(Self::CARRY, carry);
    }

    /// Returns `true` when an external interrupt may be taken: IE set, BIP and EIP clear.
    pub const fn accepts_interrupt(self) -> bool {
        self.intersection(Self::IE.union(Self::BIP).union(Self::EIP)).bits() == Self::IE.bits()
    }

    /// Returns `true` when a hardware exception may be taken: EE set, EIP clear.
    pub const fn accepts_exception(self) -> bool {
        self.intersection(Self::EE.union(Self::EIP)).bits() == Self::EE.bits()
    }
}
