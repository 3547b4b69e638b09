//! Instruction execution.
//!
//! This module implements the step contract every instruction follows in the execute slot:
//! 1. **Latency Gate:** The counter starts at 1 and counts up; while it is below the
//!    latency the step returns `Stall` and touches nothing else.
//! 2. **Effect:** Once the gate opens the effect is applied exactly once and the counter
//!    returns to 1.
//! 3. **Memory Retries:** Loads and stores resolve their effective address once, then keep
//!    the gate open and re-issue the same bus request while it reports `Access`.

use crate::common::constants::BREAK_RETURN_REG;
use crate::common::status::ExecStatus;
use crate::core::arch::Msr;
use crate::core::arch::special::ESR_STORE;
use crate::core::cpu::CpuState;
use crate::core::units::alu::Alu;
use crate::core::units::bru::Bru;
use crate::core::units::lsu::Lsu;
use crate::isa::instruction::{Instruction, Marker, Op, Operand, ReturnKind};
use crate::soc::interconnect::{Bus, BusResponse};

/// Bit shift of the register number in the ESR detail field.
const ESR_REG_SHIFT: u32 = 5;

impl Instruction {
    /// Advances the instruction one cycle.
    ///
    /// # Arguments
    ///
    /// * `cpu` - Architectural state read and written by the effect.
    /// * `bus` - Data port for loads and stores.
    ///
    /// # Returns
    ///
    /// The status the pipeline reacts to.
    pub fn step(&mut self, cpu: &mut CpuState, bus: &mut Bus) -> ExecStatus {
        match self.marker {
            Marker::Breakpoint => {
                cpu.regs.write(BREAK_RETURN_REG, self.pc);
                return ExecStatus::Breakpoint;
            }
            Marker::Stop => return ExecStatus::Stop,
            Marker::None => {}
        }

        match self.op {
            Op::Empty => ExecStatus::Empty,
            Op::Illegal => ExecStatus::Illegal,
            Op::BusFault => ExecStatus::InstructionBus,
            Op::CondBranch { cond, delay, ra, target } => {
                let taken = Bru::taken(cond, cpu.reg(ra));
                let latency = if taken { self.cond_latency } else { self.latency };
                if !self.gate(latency) {
                    return ExecStatus::Stall;
                }
                self.cycles = 1;

                let offset = operand(cpu, target);
                if !taken {
                    ExecStatus::Normal
                } else {
                    cpu.pc = Bru::target(self.pc, offset, false);
                    redirect(delay)
                }
            }
            Op::Load { .. } | Op::Store { .. } => {
                if !self.gate(self.latency) {
                    return ExecStatus::Stall;
                }
                self.memory(cpu, bus)
            }
            _ => {
                if !self.gate(self.latency) {
                    return ExecStatus::Stall;
                }
                self.cycles = 1;
                self.apply(cpu)
            }
        }
    }

    /// Counts one tick against `latency`. Returns `true` once the effect may fire.
    fn gate(&mut self, latency: u32) -> bool {
        if self.cycles < latency {
            self.cycles += 1;
            false
        } else {
            true
        }
    }

    /// Effects of every operation that neither branches conditionally nor touches memory.
    fn apply(&self, cpu: &mut CpuState) -> ExecStatus {
        match self.op {
            Op::Arith { kind, keep_carry, rd, ra, b } => {
                let b = operand(cpu, b);
                let (value, carry) = Alu::arith(kind, cpu.reg(ra), b);
                cpu.set_reg(rd, value);
                if !keep_carry {
                    cpu.msr_mut().set_carry(carry);
                }
                ExecStatus::Normal
            }
            Op::Logic { kind, rd, ra, b } => {
                let b = operand(cpu, b);
                cpu.set_reg(rd, Alu::logic(kind, cpu.reg(ra), b));
                ExecStatus::Normal
            }
            Op::Compare { kind, rd, ra, rb } => {
                cpu.set_reg(rd, Alu::compare(kind, cpu.reg(ra), cpu.reg(rb)));
                ExecStatus::Normal
            }
            Op::Unary { kind, rd, ra } => {
                let (value, carry) = Alu::unary(kind, cpu.reg(ra), cpu.msr().carry());
                cpu.set_reg(rd, value);
                if let Some(carry) = carry {
                    cpu.msr_mut().set_carry(carry);
                }
                ExecStatus::Normal
            }
            Op::Branch { kind, rd, target } => {
                let offset = operand(cpu, target);
                if kind.is_link() {
                    cpu.set_reg(rd, self.pc);
                }
                cpu.pc = Bru::target(self.pc, offset, kind.is_absolute());
                redirect(kind.has_delay())
            }
            Op::Break { rd, target } => {
                let target = operand(cpu, target);
                cpu.set_reg(rd, self.pc);
                cpu.pc = target;
                cpu.msr_mut().insert(Msr::BIP);
                ExecStatus::Jump
            }
            Op::Return { kind, ra, imm } => {
                let offset = cpu.take_imm(imm);
                cpu.pc = cpu.reg(ra).wrapping_add(offset);
                let msr = cpu.msr_mut();
                match kind {
                    ReturnKind::Subroutine => {}
                    ReturnKind::Interrupt => msr.insert(Msr::IE),
                    ReturnKind::Break => msr.remove(Msr::BIP),
                    ReturnKind::Exception => {
                        msr.insert(Msr::EE);
                        msr.remove(Msr::EIP);
                    }
                }
                ExecStatus::DelaySlot
            }
            Op::Imm { imm } => {
                cpu.set_imm(imm);
                ExecStatus::Normal
            }
            Op::MsrSet { rd, imm } => {
                let old = cpu.msr();
                cpu.set_reg(rd, old.bits());
                *cpu.msr_mut() = with_carry_of(old.union(Msr::from_bits_retain(u32::from(imm))), old);
                ExecStatus::Normal
            }
            Op::MsrClr { rd, imm } => {
                let old = cpu.msr();
                cpu.set_reg(rd, old.bits());
                *cpu.msr_mut() = with_carry_of(old.difference(Msr::from_bits_retain(u32::from(imm))), old);
                ExecStatus::Normal
            }
            Op::Mfs { rd, reg } => {
                cpu.set_reg(rd, cpu.special.read(reg, self.pc));
                ExecStatus::Normal
            }
            Op::Mts { ra, reg } => {
                let value = cpu.reg(ra);
                cpu.special.write(reg, value);
                ExecStatus::Normal
            }
            Op::Empty => ExecStatus::Empty,
            Op::Illegal => ExecStatus::Illegal,
            Op::BusFault => ExecStatus::InstructionBus,
            Op::CondBranch { .. } | Op::Load { .. } | Op::Store { .. } => ExecStatus::Normal,
        }
    }

    /// One attempt of a load or store. The gate is already open.
    fn memory(&mut self, cpu: &mut CpuState, bus: &mut Bus) -> ExecStatus {
        let (width, rd, ra, offset, store) = match self.op {
            Op::Load { width, rd, ra, offset } => (width, rd, ra, offset, false),
            Op::Store { width, rd, ra, offset } => (width, rd, ra, offset, true),
            _ => return ExecStatus::Normal,
        };

        let address = match self.address {
            Some(address) => address,
            None => {
                let address = cpu.reg(ra).wrapping_add(operand(cpu, offset));
                self.address = Some(address);
                address
            }
        };

        let response = if store {
            match Lsu::store(bus, address, width, cpu.reg(rd)) {
                BusResponse::Ready(()) => BusResponse::Ready(0),
                BusResponse::Access => BusResponse::Access,
                BusResponse::Unaligned => BusResponse::Unaligned,
                BusResponse::Mapped => BusResponse::Mapped,
            }
        } else {
            Lsu::load(bus, address, width)
        };

        let status = match response {
            BusResponse::Access => return ExecStatus::MemAccess,
            BusResponse::Ready(value) => {
                if !store {
                    cpu.set_reg(rd, value);
                }
                ExecStatus::Normal
            }
            BusResponse::Unaligned => {
                cpu.special.esr = (u32::from(rd) << ESR_REG_SHIFT) | if store { ESR_STORE } else { 0 };
                cpu.special.ear = address;
                ExecStatus::MemUnaligned
            }
            BusResponse::Mapped => {
                cpu.special.ear = address;
                ExecStatus::MemMapped
            }
        };
        self.cycles = 1;
        self.address = None;
        status
    }
}

/// Resolves a second operand; immediates consume a pending `imm` prefix.
fn operand(cpu: &mut CpuState, operand: Operand) -> u32 {
    match operand {
        Operand::Reg(idx) => cpu.reg(idx),
        Operand::Imm(imm) => cpu.take_imm(imm),
    }
}

const fn redirect(delay: bool) -> ExecStatus {
    if delay {
        ExecStatus::DelaySlot
    } else {
        ExecStatus::Jump
    }
}

/// `msr` with both carry bits copied from `old`.
fn with_carry_of(mut msr: Msr, old: Msr) -> Msr {
    msr.set_carry(old.carry());
    msr
}
