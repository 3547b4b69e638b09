//! Simulation orchestration and program loading.
//!
//! Provides the top-level [`Simulator`] with its run controls, program images and their ELF
//! front-end, and the per-function profiler.

/// Program images and ELF loading.
pub mod loader;

/// Per-function cycle and instruction profile.
pub mod profile;

/// Cycle orchestration and run controls.
pub mod simulator;

pub use loader::{FunctionSymbol, ProgramImage, Section};
pub use profile::{FunctionProfile, Profile};
pub use simulator::Simulator;
