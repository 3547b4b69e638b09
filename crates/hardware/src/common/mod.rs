//! Common utilities and types used throughout the simulator.
//!
//! This module provides the building blocks shared by the core, the bus and the
//! orchestrator. It includes:
//! 1. **Constants:** Exception vectors, register conventions and field masks.
//! 2. **Error Handling:** Configuration, bus-wiring and program-load errors.
//! 3. **Status Codes:** Per-instruction step results and per-cycle run results.
//! 4. **Register Management:** The 32-entry general purpose register file.

/// Common constants used throughout the simulator.
pub mod constants;

/// Error types for configuration, wiring and loading.
pub mod error;

/// Register file implementation.
pub mod reg;

/// Instruction and run status codes.
pub mod status;

pub use error::{BusError, ConfigError, LoadError};
pub use reg::RegisterFile;
pub use status::{ExecStatus, RunStatus};
