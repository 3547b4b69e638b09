//! Two-phase device registers.
//!
//! Every OPB register follows the same protocol: `put` stages a value, `update` runs once
//! per cycle after all of that cycle's writes and commits it. A value written this cycle
//! becomes visible to `get` only after the next `update`.

/// A register whose writes become visible only after an explicit per-cycle commit.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TwoPhase {
    committed: u32,
    pending: u32,
    dirty: bool,
}

impl TwoPhase {
    /// Creates a register holding zero with nothing staged.
    pub const fn new() -> Self {
        Self {
            committed: 0,
            pending: 0,
            dirty: false,
        }
    }

    /// Returns the committed value.
    #[inline]
    pub const fn get(&self) -> u32 {
        self.committed
    }

    /// Stages `value` for the next [`update`](Self::update). A later `put` in the same cycle wins.
    #[inline]
    pub const fn put(&mut self, value: u32) {
        self.pending = value;
        self.dirty = true;
    }

    /// Returns `true` when a value is staged.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Takes the staged value, if any, clearing the dirty flag without committing.
    ///
    /// Registers that decode bit-fields use this to inspect the written value before
    /// deciding what to commit.
    pub const fn take(&mut self) -> Option<u32> {
        if self.dirty {
            self.dirty = false;
            Some(self.pending)
        } else {
            None
        }
    }

    /// Commits the staged value. Returns `true` when a value was committed.
    pub const fn update(&mut self) -> bool {
        match self.take() {
            Some(value) => {
                self.committed = value;
                true
            }
            None => false,
        }
    }

    /// Writes the committed value directly, bypassing the staging path.
    ///
    /// Reserved for the owning device (reset, hardware-set status bits, sibling propagation).
    #[inline]
    pub const fn force(&mut self, value: u32) {
        self.committed = value;
    }

    /// Zeroes the register and drops anything staged.
    pub const fn clear(&mut self) {
        *self = Self::new();
    }
}
