//! System-on-Chip (SoC) Components.
//!
//! This module organizes the components around the processor: the memory bus with its
//! LMB and OPB regions, the two-phase register protocol, the OPB peripherals, and the
//! builder that wires them together from configuration.

/// System builder for assembling SoC components.
pub mod builder;

/// OPB peripheral implementations.
pub mod devices;

/// Memory bus routing, latency and alignment.
pub mod interconnect;

/// Region descriptors and sparse word storage.
pub mod memory;

/// Two-phase device registers.
pub mod register;

/// Device trait definitions for OPB access.
pub mod traits;

pub use builder::{Console, System};
pub use interconnect::{Bus, BusResponse, Fetch};
