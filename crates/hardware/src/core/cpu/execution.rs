//! Main Execution Loop.
//!
//! This module implements the per-cycle control of the three-slot pipeline. It performs the
//! following:
//! 1. **Step:** The instruction in the execute slot is stepped once.
//! 2. **Pipeline Reaction:** The step status decides whether the slots advance, hold, flush
//!    or keep the delay slot.
//! 3. **Interrupts:** A raised interrupt line is accepted when the slots advance normally and
//!    the machine status allows it.
//! 4. **Hardware Exceptions:** Faulting statuses enter the exception vector when exceptions
//!    are enabled and stop the run otherwise.

use tracing::{debug, trace};

use super::Cpu;
use crate::common::constants::{
    EXCEPTION_RETURN_REG, HW_EXCEPTION_VECTOR, INSTRUCTION_SIZE, INTERRUPT_RETURN_REG,
    INTERRUPT_VECTOR,
};
use crate::common::status::{ExecStatus, RunStatus};
use crate::core::arch::Msr;
use crate::core::arch::special::{
    ESR_DATA_BUS, ESR_ILLEGAL, ESR_INSTRUCTION_BUS, ESR_UNALIGNED,
};
use crate::soc::interconnect::Bus;

impl Cpu {
    /// Runs one processor cycle.
    ///
    /// # Arguments
    ///
    /// * `bus` - The memory bus and the devices behind it.
    /// * `interrupt` - Interrupt line as sampled at the end of the previous cycle.
    ///
    /// # Returns
    ///
    /// `RunStatus::Normal` while the simulation may continue, otherwise the reason to stop.
    pub fn cycle(&mut self, bus: &mut Bus, interrupt: bool) -> RunStatus {
        self.stats.cycles += 1;

        let status = self.pipeline.execute.step(&mut self.state, bus);
        trace!(
            pc = format_args!("{:#010x}", self.pipeline.execute.pc),
            op = self.pipeline.execute.name(),
            ?status,
            "execute"
        );

        match status {
            ExecStatus::Normal => {
                self.stats.retired += 1;
                self.advance(bus, interrupt);
                RunStatus::Normal
            }
            ExecStatus::Empty => {
                self.stats.bubbles += 1;
                self.advance(bus, interrupt);
                RunStatus::Normal
            }
            ExecStatus::Jump => {
                self.stats.retired += 1;
                self.stats.jumps += 1;
                let fetched = self.fetch_next(bus);
                self.pipeline.flush(fetched);
                RunStatus::Normal
            }
            ExecStatus::DelaySlot => {
                self.stats.retired += 1;
                self.stats.jumps += 1;
                let fetched = self.fetch_next(bus);
                self.pipeline.delay_slot(fetched);
                RunStatus::Normal
            }
            ExecStatus::Stall => {
                self.stats.stall_cycles += 1;
                self.hold(bus);
                RunStatus::Normal
            }
            ExecStatus::MemAccess => {
                self.stats.memory_wait_cycles += 1;
                self.hold(bus);
                RunStatus::Normal
            }
            ExecStatus::MemMapped => {
                if self.msr().accepts_exception() {
                    self.state.special.esr = ESR_DATA_BUS;
                    self.raise(bus, status)
                } else {
                    self.stats.retired += 1;
                    self.advance(bus, interrupt);
                    RunStatus::Normal
                }
            }
            ExecStatus::MemUnaligned => {
                if self.msr().accepts_exception() {
                    self.state.special.set_cause(ESR_UNALIGNED);
                    self.raise(bus, status)
                } else {
                    RunStatus::MemUnaligned
                }
            }
            ExecStatus::Illegal => {
                if self.msr().accepts_exception() {
                    self.state.special.esr = ESR_ILLEGAL;
                    self.raise(bus, status)
                } else {
                    RunStatus::Illegal
                }
            }
            ExecStatus::InstructionBus => {
                if self.msr().accepts_exception() {
                    self.state.special.esr = ESR_INSTRUCTION_BUS;
                    self.state.special.ear = self.pipeline.execute.pc;
                    self.raise(bus, status)
                } else {
                    RunStatus::Illegal
                }
            }
            ExecStatus::Breakpoint => {
                debug!(pc = format_args!("{:#010x}", self.pipeline.execute.pc), "breakpoint");
                RunStatus::Breakpoint
            }
            ExecStatus::Stop => {
                self.stats.retired += 1;
                RunStatus::Stop
            }
        }
    }

    /// Shifts the slots by one, entering the interrupt vector instead when allowed.
    fn advance(&mut self, bus: &Bus, interrupt: bool) {
        let fetched = self.fetch_next(bus);

        let accept = interrupt
            && self.msr().accepts_interrupt()
            && !self.state.imm_pending
            && !self.pipeline.decode.is_empty();
        if !accept {
            self.pipeline.shift(fetched);
            return;
        }

        // The decoded instruction is abandoned and re-executed on return.
        let resume = self.pipeline.decode.pc;
        self.state.regs.write(INTERRUPT_RETURN_REG, resume);
        self.state.msr_mut().remove(Msr::IE);
        self.pipeline.refill(fetched);
        let entry = self.decoder.interrupt_entry(resume, INTERRUPT_VECTOR);
        self.pipeline.issue(entry);
        self.stats.interrupts += 1;
        debug!(resume = format_args!("{:#010x}", resume), "interrupt accepted");
    }

    /// Keeps the execute slot and fills an empty decode slot.
    fn hold(&mut self, bus: &Bus) {
        if self.pipeline.decode.is_empty() {
            let fetched = self.fetch_next(bus);
            self.pipeline.refill(fetched);
        }
    }

    /// Enters the hardware exception vector. The ESR cause is already set.
    fn raise(&mut self, bus: &Bus, status: ExecStatus) -> RunStatus {
        let pc = self.pipeline.execute.pc;
        self.state
            .regs
            .write(EXCEPTION_RETURN_REG, pc.wrapping_add(INSTRUCTION_SIZE));

        let msr = self.state.msr_mut();
        msr.insert(Msr::EIP);
        msr.remove(Msr::EE);

        self.state.imm_pending = false;
        self.state.pc = HW_EXCEPTION_VECTOR;
        let fetched = self.fetch_next(bus);
        self.pipeline.flush(fetched);
        self.stats.exceptions += 1;

        debug!(
            pc = format_args!("{:#010x}", pc),
            ?status,
            esr = format_args!("{:#x}", self.state.special.esr),
            "hardware exception"
        );
        RunStatus::Normal
    }
}
