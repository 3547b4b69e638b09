//! CPU Core Definition and Initialization.
//!
//! This module defines the central `Cpu` structure, which holds the entire processor state
//! apart from the bus. It coordinates the following:
//! 1. **State Management:** Registers, special registers, the fetch address and the pending
//!    immediate prefix.
//! 2. **Pipeline Control:** The fetch, decode and execute slots and the decoder that fills them.
//! 3. **Debug Markers:** Breakpoint addresses and the program exit address, applied to
//!    instructions as they are fetched.
//! 4. **Statistics:** Cycle, retirement and stall counters.

/// Per-cycle pipeline control, interrupts and hardware exceptions.
pub mod execution;

/// Architectural state visible to instructions.
pub mod state;

pub use state::CpuState;

use std::collections::BTreeSet;

use crate::common::constants::INSTRUCTION_SIZE;
use crate::config::CpuConfig;
use crate::core::arch::{Msr, SpecialRegisters};
use crate::core::pipeline::Pipeline;
use crate::isa::latency::LatencyTable;
use crate::isa::{Decoder, Instruction, Marker};
use crate::soc::interconnect::{Bus, Fetch};
use crate::stats::SimStats;

/// Main CPU structure.
///
/// The CPU owns its pipeline and architectural state; the bus is lent to it every cycle so
/// that devices stay reachable from the simulator between cycles.
#[derive(Clone, Debug)]
pub struct Cpu {
    /// Architectural state.
    pub state: CpuState,
    /// Fetch, decode and execute slots.
    pub pipeline: Pipeline,
    decoder: Decoder,
    breakpoints: BTreeSet<u32>,
    exit: Option<u32>,
    /// Performance statistics.
    pub stats: SimStats,
}

impl Cpu {
    /// Creates a CPU in reset state.
    ///
    /// # Arguments
    ///
    /// * `config` - Latencies and version registers of the processor.
    ///
    /// # Returns
    ///
    /// A CPU with an empty pipeline that will start fetching at the reset vector.
    pub fn new(config: &CpuConfig) -> Self {
        Self {
            state: CpuState::new(config.pvr),
            pipeline: Pipeline::new(),
            decoder: Decoder::new(LatencyTable::from_config(config)),
            breakpoints: BTreeSet::new(),
            exit: None,
            stats: SimStats::default(),
        }
    }

    /// Returns registers, pipeline and statistics to the power-on state.
    ///
    /// Breakpoints and the exit address survive a reset.
    pub fn reset(&mut self) {
        self.state.reset();
        self.pipeline.reset();
        self.stats.reset();
    }

    /// Reads a general purpose register.
    pub fn reg(&self, idx: u8) -> u32 {
        self.state.reg(idx)
    }

    /// Writes a general purpose register. Writes to `r0` are ignored.
    pub fn set_reg(&mut self, idx: u8, value: u32) {
        self.state.set_reg(idx, value);
    }

    /// Address of the next instruction to fetch.
    pub const fn pc(&self) -> u32 {
        self.state.pc
    }

    /// Current machine status register.
    pub const fn msr(&self) -> Msr {
        self.state.msr()
    }

    /// Special purpose registers.
    pub const fn special(&self) -> &SpecialRegisters {
        &self.state.special
    }

    /// Instruction in the execute slot.
    pub const fn execute(&self) -> &Instruction {
        &self.pipeline.execute
    }

    /// Serial number of the instruction in the execute slot.
    pub const fn serial(&self) -> u64 {
        self.pipeline.serial()
    }

    /// Number of instructions retired since reset.
    pub const fn retired(&self) -> u64 {
        self.stats.retired
    }

    /// The decoder and its latency table.
    pub const fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Sets the address whose execution stops the simulation.
    pub fn set_exit(&mut self, exit: Option<u32>) {
        self.exit = exit;
    }

    /// Address whose execution stops the simulation.
    pub const fn exit(&self) -> Option<u32> {
        self.exit
    }

    /// Arms a breakpoint at `address`.
    ///
    /// Instructions from `address` already in flight are armed too.
    pub fn set_breakpoint(&mut self, address: u32) {
        let _ = self.breakpoints.insert(address);
        for slot in self.pipeline.slots_mut() {
            if !slot.is_empty() && slot.pc == address {
                slot.set_marker(Marker::Breakpoint);
            }
        }
    }

    /// Disarms the breakpoint at `address`. Returns `false` when none was set.
    pub fn clear_breakpoint(&mut self, address: u32) -> bool {
        let removed = self.breakpoints.remove(&address);
        let exit = self.exit;
        for slot in self.pipeline.slots_mut() {
            if slot.marker() == Marker::Breakpoint && slot.pc == address {
                let marker = if exit == Some(address) {
                    Marker::Stop
                } else {
                    Marker::None
                };
                slot.set_marker(marker);
            }
        }
        removed
    }

    /// Armed breakpoint addresses in ascending order.
    pub fn breakpoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.breakpoints.iter().copied()
    }

    /// Fetches and decodes the instruction at `pc` without moving the fetch address.
    ///
    /// Unpopulated words decode as illegal and unbacked addresses produce an instruction
    /// bus fault. The breakpoint marker takes precedence over the exit marker.
    pub fn fetch_at(&self, bus: &Bus, pc: u32) -> Instruction {
        let instruction = match bus.fetch(pc) {
            Fetch::Word(word) => self.decoder.decode(pc, word),
            Fetch::Unpopulated => Instruction::illegal(pc, 0),
            Fetch::Unmapped => Instruction::bus_fault(pc),
        };

        let marker = if self.breakpoints.contains(&pc) {
            Marker::Breakpoint
        } else if self.exit == Some(pc) {
            Marker::Stop
        } else {
            Marker::None
        };
        instruction.with_marker(marker)
    }

    /// Fetches the instruction at the fetch address and advances it by one word.
    pub fn fetch_next(&mut self, bus: &Bus) -> Instruction {
        let instruction = self.fetch_at(bus, self.state.pc);
        self.state.pc = self.state.pc.wrapping_add(INSTRUCTION_SIZE);
        instruction
    }
}
