//! Cycle-accurate MicroBlaze-style system simulator library.
//!
//! This crate simulates a three-slot pipelined embedded processor attached to a local
//! memory bus and a peripheral bus. It provides the following:
//! 1. **Core:** Fetch, decode and execute slots, the general and special registers,
//!    interrupts and hardware exceptions.
//! 2. **ISA:** Decode-once instructions with configurable per-mnemonic latencies.
//! 3. **SoC:** The memory bus with LMB/OPB routing, latency and alignment checks, two-phase
//!    device registers, the timer/counter and the UART Lite.
//! 4. **Simulation:** Program images and ELF loading, run controls, breakpoints, profiling
//!    and statistics.
//!
//! # Example
//!
//! ```
//! use opbsim_core::sim::ProgramImage;
//! use opbsim_core::soc::Console;
//! use opbsim_core::{Config, RunStatus, Simulator};
//!
//! // addik r3, r0, 42 ; then the exit address.
//! let image = ProgramImage::new()
//!     .with_words(0, &[0x3060_002A, 0x8000_0000])
//!     .with_exit(4);
//! let mut sim = Simulator::new(Config::default(), &Console::default()).unwrap();
//! sim.load(&image, true).unwrap();
//! assert_eq!(sim.run(), RunStatus::Stop);
//! assert_eq!(sim.cpu().reg(3), 42);
//! ```

/// Common types and constants (status codes, errors, register file).
pub mod common;
/// Simulator configuration (defaults, device wiring, latency tables).
pub mod config;
/// CPU core (architectural state, pipeline, execution units, cycle control).
pub mod core;
/// Instruction set (opcodes, decoding, latencies, execution, disassembly).
pub mod isa;
/// Orchestration, program loading and profiling.
pub mod sim;
/// System-on-chip (builder, bus, registers, devices, memory).
pub mod soc;
/// Simulation statistics collection and reporting.
pub mod stats;

/// Per-cycle outcome returned by every run control.
pub use crate::common::RunStatus;
/// Root configuration type; use `Config::default()` or deserialize from JSON.
pub use crate::config::Config;
/// Main CPU type; holds registers, pipeline and stats.
pub use crate::core::Cpu;
/// Top-level simulator with run controls.
pub use crate::sim::Simulator;
/// Bus and devices built from configuration; construct with `System::new`.
pub use crate::soc::System;
