//! Branch Resolution Unit (BRU).
//!
//! Evaluates conditional branch conditions and computes branch targets. The processor has
//! no prediction: every taken branch redirects fetch from the execute slot.

use crate::isa::instruction::Condition;

/// Branch resolution helpers.
pub struct Bru;

impl Bru {
    /// Returns `true` when `cond` holds for `value` read as a signed word.
    ///
    /// # Examples
    ///
    /// ```
    /// use opbsim_core::core::units::bru::Bru;
    /// use opbsim_core::isa::instruction::Condition;
    ///
    /// assert!(Bru::taken(Condition::Lt, 0x8000_0000));
    /// assert!(!Bru::taken(Condition::Gt, 0));
    /// assert!(Bru::taken(Condition::Ge, 0));
    /// ```
    pub const fn taken(cond: Condition, value: u32) -> bool {
        let value = value as i32;
        match cond {
            Condition::Eq => value == 0,
            Condition::Ne => value != 0,
            Condition::Lt => value < 0,
            Condition::Le => value <= 0,
            Condition::Gt => value > 0,
            Condition::Ge => value >= 0,
        }
    }

    /// Branch target: `offset` itself when absolute, else `pc + offset`.
    pub const fn target(pc: u32, offset: u32, absolute: bool) -> u32 {
        if absolute { offset } else { pc.wrapping_add(offset) }
    }
}
