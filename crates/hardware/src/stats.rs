//! Simulation statistics collection and reporting.
//!
//! This module tracks performance counters for the simulated processor. It provides:
//! 1. **Cycles and CPI:** Total cycles, retired instructions and the derived CPI.
//! 2. **Stalls:** Cycles lost to instruction latency, memory waits and pipeline bubbles.
//! 3. **Control Flow:** Redirections, accepted interrupts and hardware exceptions.
//! 4. **Time:** Simulated seconds at a given core clock.

use std::fmt;

/// Simulation statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SimStats {
    /// Total processor cycles elapsed.
    pub cycles: u64,
    /// Number of instructions retired.
    pub retired: u64,
    /// Cycles an instruction spent waiting on its own latency.
    pub stall_cycles: u64,
    /// Cycles a load or store spent waiting on the bus.
    pub memory_wait_cycles: u64,
    /// Cycles the execute slot held a bubble.
    pub bubbles: u64,
    /// Taken branches, jumps and returns.
    pub jumps: u64,
    /// External interrupts accepted.
    pub interrupts: u64,
    /// Hardware exceptions taken.
    pub exceptions: u64,
}

impl SimStats {
    /// Clears every counter.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Cycles per retired instruction, or 0.0 before anything retired.
    pub fn cpi(&self) -> f64 {
        if self.retired == 0 {
            0.0
        } else {
            self.cycles as f64 / self.retired as f64
        }
    }

    /// Simulated wall-clock time at `frequency_hz`.
    pub fn simulated_seconds(&self, frequency_hz: u64) -> f64 {
        if frequency_hz == 0 {
            0.0
        } else {
            self.cycles as f64 / frequency_hz as f64
        }
    }
}

impl fmt::Display for SimStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cyc = self.cycles.max(1) as f64;
        let pct = |n: u64| (n as f64 / cyc) * 100.0;

        writeln!(f, "sim_cycles               {}", self.cycles)?;
        writeln!(f, "sim_insts                {}", self.retired)?;
        writeln!(f, "sim_cpi                  {:.4}", self.cpi())?;
        writeln!(f, "stalls.latency           {} ({:.2}%)", self.stall_cycles, pct(self.stall_cycles))?;
        writeln!(
            f,
            "stalls.memory            {} ({:.2}%)",
            self.memory_wait_cycles,
            pct(self.memory_wait_cycles)
        )?;
        writeln!(f, "bubbles                  {} ({:.2}%)", self.bubbles, pct(self.bubbles))?;
        writeln!(f, "jumps                    {}", self.jumps)?;
        writeln!(f, "interrupts               {}", self.interrupts)?;
        write!(f, "exceptions               {}", self.exceptions)
    }
}
