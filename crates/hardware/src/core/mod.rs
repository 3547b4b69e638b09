//! Core processor implementation.
//!
//! This module contains the CPU: its architectural registers, the three-slot pipeline, the
//! execution units instructions use, and the controller that steps them every cycle.

/// Architecture-specific components (machine status and special purpose registers).
pub mod arch;

/// CPU core implementation and per-cycle control.
pub mod cpu;

/// Fetch, decode and execute slots.
pub mod pipeline;

/// Execution units (ALU, branch unit, load/store unit).
pub mod units;

pub use self::cpu::Cpu;
