//! Arithmetic Logic Unit (ALU).
//!
//! This module implements the integer operations instructions perform in the execute
//! slot. Operations are organized into submodules by category:
//! - [`arithmetic`]: Add and reverse-subtract with carry out
//! - [`logic`]:      Or, And, Xor, Andn and the pattern compares
//! - [`shifts`]:     Single-bit right shifts and sign extensions

/// Add and reverse-subtract with carry.
pub mod arithmetic;

/// Bitwise logic and pattern compare operations.
pub mod logic;

/// Shift and sign-extension operations.
pub mod shifts;

use crate::isa::instruction::{ArithKind, CompareKind, LogicKind, UnaryKind};

/// Arithmetic Logic Unit (ALU) for integer operations.
pub struct Alu;

impl Alu {
    /// Executes an add or reverse-subtract.
    ///
    /// # Arguments
    ///
    /// * `kind` - Add (`a + b`) or reverse-subtract (`b - a`).
    /// * `a`    - First operand (`rA`).
    /// * `b`    - Second operand (`rB` or the assembled immediate).
    ///
    /// # Returns
    ///
    /// The result and the carry out. For reverse-subtract the carry is set when no borrow
    /// occurred.
    ///
    /// # Examples
    ///
    /// ```
    /// use opbsim_core::core::units::alu::Alu;
    /// use opbsim_core::isa::instruction::ArithKind;
    ///
    /// assert_eq!(Alu::arith(ArithKind::Add, 0xFFFF_FFFF, 1), (0, true));
    /// assert_eq!(Alu::arith(ArithKind::Rsub, 3, 10), (7, true));
    /// assert_eq!(Alu::arith(ArithKind::Rsub, 10, 3), (0xFFFF_FFF9, false));
    /// ```
    pub const fn arith(kind: ArithKind, a: u32, b: u32) -> (u32, bool) {
        match kind {
            ArithKind::Add => arithmetic::add(a, b),
            ArithKind::Rsub => arithmetic::rsub(a, b),
        }
    }

    /// Executes a bitwise logic operation.
    pub const fn logic(kind: LogicKind, a: u32, b: u32) -> u32 {
        logic::execute(kind, a, b)
    }

    /// Executes a pattern compare.
    pub const fn compare(kind: CompareKind, a: u32, b: u32) -> u32 {
        logic::compare(kind, a, b)
    }

    /// Executes a shift or sign extension.
    ///
    /// Returns the result and, for shifts, the new carry.
    pub const fn unary(kind: UnaryKind, a: u32, carry: bool) -> (u32, Option<bool>) {
        shifts::execute(kind, a, carry)
    }
}
