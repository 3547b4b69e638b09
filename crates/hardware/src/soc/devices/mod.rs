//! OPB peripheral devices.
//!
//! This module contains the peripherals that can sit on the on-chip peripheral bus:
//! a dual timer/counter and a byte-stream UART. Both follow the two-phase register
//! protocol defined in [`crate::soc::register`].

/// Dual 32-bit timer/counter.
pub mod timer;

/// UART Lite byte-stream serial port and its byte sources and sinks.
pub mod uart_lite;

pub use timer::{ControlStatus, Timer, TimerControl, TimerCounter};
pub use uart_lite::{ByteSink, ByteSource, SharedBuffer, StdinSource, StdoutSink, UartLite};

pub use crate::soc::traits::OpbDevice;
