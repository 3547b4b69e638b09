//! Device trait for OPB peripherals.
//!
//! This module defines the `OpbDevice` trait implemented by every peripheral attached to the
//! on-chip peripheral bus. It provides:
//! 1. **Identification:** `name` and the declared register set used to validate wiring.
//! 2. **Access:** Register-indexed `get`/`put`, plus a side-effect free `peek` for debuggers.
//! 3. **Lifecycle:** A per-cycle `cycle` that commits registers and reports the interrupt line.
//!
//! Register indices are positions in [`OpbDevice::register_names`]. The bus resolves
//! addresses to indices; devices never see bus addresses.

use std::fmt;

/// Trait for peripherals attached to the OPB.
///
/// Implementors must be `Send` so a whole simulator can move across threads.
pub trait OpbDevice: fmt::Debug + Send {
    /// Returns the instance name (e.g., `"opb_timer_0"`).
    fn name(&self) -> &str;

    /// Returns the register names in declaration order.
    fn register_names(&self) -> &'static [&'static str];

    /// Cycles needed to read a register over the bus.
    fn read_latency(&self) -> u32;

    /// Cycles needed to write a register over the bus.
    fn write_latency(&self) -> u32;

    /// Bus read of a register. Usually the committed value; may have side effects on
    /// receive FIFOs.
    fn get(&mut self, register: usize) -> u32;

    /// Reads a register without side effects.
    fn peek(&self, register: usize) -> u32;

    /// Bus write of a register. Only stages the value; it is committed by `cycle`.
    fn put(&mut self, register: usize, value: u32);

    /// Advances the device one cycle and commits staged writes.
    ///
    /// Returns `true` when the device drives its interrupt line this cycle.
    fn cycle(&mut self) -> bool;

    /// Returns the interrupt line as driven by the last `cycle`.
    fn interrupt(&self) -> bool;

    /// Returns the device to its power-on state.
    fn reset(&mut self);
}
