//! Execution units.
//!
//! This module contains the functional units instructions use in the execute slot:
//! the integer ALU, branch resolution and the load/store unit.

/// Arithmetic Logic Unit for integer operations.
pub mod alu;

/// Branch condition and target resolution.
pub mod bru;

/// Load/Store Unit for data-port accesses.
pub mod lsu;
