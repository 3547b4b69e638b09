//! Processor architecture state.
//!
//! This module contains the architectural registers beyond the general purpose file.
//! It includes the following modules:
//! 1. **MSR:** Machine status register flags and their carry and enable helpers.
//! 2. **Special Registers:** Selector encoding, storage and exception cause codes.

/// Machine status register flags.
pub mod msr;

/// Special purpose registers reachable through `mfs`/`mts`.
pub mod special;

pub use msr::Msr;
pub use special::{SpecialRegister, SpecialRegisters};
