//! Instruction pipeline slots.
//!
//! The processor has three slots: fetch, decode and execute. Instructions are decoded when
//! they enter the fetch slot, so the slots hold ready [`Instruction`]s. Only the execute
//! slot steps; the other two are shift registers that the controller moves, flushes and
//! refills according to the step status.
//!
//! The execute slot carries a serial number that increments every time a new instruction
//! (bubbles included) enters it, so observers can tell a fresh instruction from one that is
//! still stalling.

use crate::isa::Instruction;

/// The three pipeline slots.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pipeline {
    /// Instruction fetched this cycle.
    pub fetch: Instruction,
    /// Instruction waiting to execute.
    pub decode: Instruction,
    /// Instruction being stepped.
    pub execute: Instruction,
    serial: u64,
}

impl Pipeline {
    /// Creates a pipeline of bubbles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serial number of the instruction in the execute slot.
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    /// Places `instruction` in the execute slot.
    pub fn issue(&mut self, instruction: Instruction) {
        self.execute = instruction;
        self.serial += 1;
    }

    /// Moves decode into execute, fetch into decode, and `fetched` into fetch.
    pub fn shift(&mut self, fetched: Instruction) {
        let decode = std::mem::replace(&mut self.decode, std::mem::replace(&mut self.fetch, fetched));
        self.issue(decode);
    }

    /// Advances only the front end: fetch into decode and `fetched` into fetch.
    ///
    /// Used while the execute slot is busy and the decode slot is empty.
    pub fn refill(&mut self, fetched: Instruction) {
        self.decode = std::mem::replace(&mut self.fetch, fetched);
    }

    /// Moves decode into execute (the delay slot), empties decode and loads `fetched`.
    pub fn delay_slot(&mut self, fetched: Instruction) {
        let decode = std::mem::take(&mut self.decode);
        self.issue(decode);
        self.fetch = fetched;
    }

    /// Empties every slot and loads `fetched` into the fetch slot.
    pub fn flush(&mut self, fetched: Instruction) {
        self.issue(Instruction::empty());
        self.decode = Instruction::empty();
        self.fetch = fetched;
    }

    /// Returns to the power-on state, serial included.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// The slots from fetch to execute.
    pub fn slots_mut(&mut self) -> [&mut Instruction; 3] {
        [&mut self.fetch, &mut self.decode, &mut self.execute]
    }
}
