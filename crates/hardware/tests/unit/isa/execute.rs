//! Step semantics: latency gating, effects and memory retries.

use crate::common::asm;
use opbsim_core::common::ExecStatus;
use opbsim_core::common::constants::PVR_COUNT;
use opbsim_core::config::{Config, MemoryConfig};
use opbsim_core::core::arch::Msr;
use opbsim_core::core::cpu::CpuState;
use opbsim_core::isa::latency::LatencyTable;
use opbsim_core::isa::{Decoder, Instruction, Marker};
use opbsim_core::soc::{Bus, Console, System};
use pretty_assertions::assert_eq;
use rstest::rstest;

const OPB: u32 = 0x8000_0000;

struct Bench {
    cpu: CpuState,
    bus: Bus,
    decoder: Decoder,
}

impl Bench {
    fn new() -> Self {
        Self::with(Config::default())
    }

    fn with(config: Config) -> Self {
        let mut pvr = [0; PVR_COUNT];
        pvr[0] = 0xCAFE_0001;
        Self {
            cpu: CpuState::new(pvr),
            bus: System::new(&config, &Console::default()).unwrap().bus,
            decoder: Decoder::new(LatencyTable::from_config(&config.cpu)),
        }
    }

    fn latencies(pairs: &[(&str, u32)], cond: &[(&str, u32)]) -> Self {
        let mut config = Config::default();
        for (name, cycles) in pairs {
            let _ = config.cpu.latencies.insert((*name).to_owned(), *cycles);
        }
        for (name, cycles) in cond {
            let _ = config.cpu.cond_latencies.insert((*name).to_owned(), *cycles);
        }
        Self::with(config)
    }

    fn decode(&self, pc: u32, word: u32) -> Instruction {
        self.decoder.decode(pc, word)
    }

    /// Steps `inst` until it leaves the stall and retry states.
    fn run(&mut self, inst: &mut Instruction) -> (ExecStatus, u32) {
        let mut ticks = 0;
        loop {
            ticks += 1;
            let status = inst.step(&mut self.cpu, &mut self.bus);
            if !matches!(status, ExecStatus::Stall | ExecStatus::MemAccess) {
                return (status, ticks);
            }
            assert!(ticks < 100, "instruction never completed");
        }
    }

    fn exec(&mut self, pc: u32, word: u32) -> ExecStatus {
        let mut inst = self.decode(pc, word);
        self.run(&mut inst).0
    }
}

#[rstest]
#[case::taken(0, ExecStatus::Jump, 4, 0x110)]
#[case::not_taken(7, ExecStatus::Normal, 2, 0x104)]
fn conditional_branch_latency_follows_the_outcome(
    #[case] value: u32,
    #[case] status: ExecStatus,
    #[case] ticks: u32,
    #[case] pc: u32,
) {
    let mut bench = Bench::latencies(&[("beqi", 2)], &[("beqi", 4)]);
    bench.cpu.set_reg(3, value);
    bench.cpu.pc = 0x104;

    let mut inst = bench.decode(0x100, asm::beqi(3, 0x10));
    assert_eq!(bench.run(&mut inst), (status, ticks));
    assert_eq!(bench.cpu.pc, pc);
    assert_eq!(inst.cycles(), 1);
}

#[rstest]
#[case::negative_taken(0x8000_0000, 0x40, ExecStatus::Jump, 3, 0x140)]
#[case::negative_backwards(-1i32 as u32, -0x20i32 as u32, ExecStatus::Jump, 3, 0xE0)]
#[case::zero_not_taken(0, 0x40, ExecStatus::Normal, 2, 0x104)]
#[case::positive_not_taken(5, 0x40, ExecStatus::Normal, 2, 0x104)]
fn register_branch_on_negative_uses_the_register_offset(
    #[case] value: u32,
    #[case] offset: u32,
    #[case] status: ExecStatus,
    #[case] ticks: u32,
    #[case] pc: u32,
) {
    let mut bench = Bench::latencies(&[("blt", 2)], &[("blt", 3)]);
    bench.cpu.set_reg(5, value);
    bench.cpu.set_reg(6, offset);
    bench.cpu.pc = 0x104;

    let mut inst = bench.decode(0x100, asm::blt(5, 6));
    assert_eq!(inst.name(), "blt");
    assert_eq!(bench.run(&mut inst), (status, ticks));
    assert_eq!(bench.cpu.pc, pc);
    assert_eq!(inst.cycles(), 1);
}

#[test]
fn register_branch_ignores_a_pending_immediate_offset() {
    let mut bench = Bench::new();
    let _ = bench.exec(0xFC, asm::imm(0x1234));
    bench.cpu.set_reg(5, 0xFFFF_FFF0);
    bench.cpu.set_reg(6, 0x10);
    assert_eq!(bench.exec(0x100, asm::blt(5, 6)), ExecStatus::Jump);
    assert_eq!(bench.cpu.pc, 0x110);
    assert!(bench.cpu.imm_pending);
}

#[test]
fn taken_delayed_branch_keeps_its_slot() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(3, 1);
    assert_eq!(bench.exec(0x200, asm::bneid(3, -0x20)), ExecStatus::DelaySlot);
    assert_eq!(bench.cpu.pc, 0x1E0);
}

#[test]
fn multi_cycle_instruction_applies_once_at_the_end() {
    let mut bench = Bench::latencies(&[("addk", 3)], &[]);
    bench.cpu.set_reg(1, 40);
    bench.cpu.set_reg(2, 2);
    let mut inst = bench.decode(0, asm::addk(3, 1, 2));

    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::Stall);
    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::Stall);
    assert_eq!(bench.cpu.reg(3), 0);
    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::Normal);
    assert_eq!(bench.cpu.reg(3), 42);
    assert_eq!(inst.cycles(), 1);
}

#[test]
fn imm_prefix_feeds_only_the_next_immediate() {
    let mut bench = Bench::new();
    assert_eq!(bench.exec(0, asm::imm(0x1234)), ExecStatus::Normal);
    assert!(bench.cpu.imm_pending);
    assert_eq!(bench.exec(4, asm::addik(3, 0, 0x5678)), ExecStatus::Normal);
    assert_eq!(bench.cpu.reg(3), 0x1234_5678);
    assert!(!bench.cpu.imm_pending);

    let _ = bench.exec(8, asm::addik(4, 0, -1));
    assert_eq!(bench.cpu.reg(4), 0xFFFF_FFFF);
}

#[test]
fn carry_is_kept_by_k_variants() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(1, 0xFFFF_FFFF);
    bench.cpu.set_reg(2, 1);

    let _ = bench.exec(0, asm::add(3, 1, 2));
    assert_eq!(bench.cpu.reg(3), 0);
    assert!(bench.cpu.msr().contains(Msr::CARRY));

    let _ = bench.exec(4, asm::addk(4, 2, 2));
    assert_eq!(bench.cpu.reg(4), 2);
    assert!(bench.cpu.msr().carry());

    let _ = bench.exec(8, asm::rsub(5, 1, 2));
    assert_eq!(bench.cpu.reg(5), 2);
    assert!(!bench.cpu.msr().carry());
}

#[test]
fn load_retries_until_the_bus_answers() {
    let mut config = Config::default();
    let mut opb = MemoryConfig::opb_region(OPB, OPB + 0xFFFF);
    opb.read_latency = 3;
    config.memory.opb = Some(opb);
    let mut bench = Bench::with(config);
    assert!(bench.bus.poke_word(OPB + 8, 0xDEAD_BEEF));
    bench.cpu.set_reg(1, OPB);

    let mut inst = bench.decode(0, asm::lwi(5, 1, 8));
    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::MemAccess);
    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::MemAccess);
    // The effective address is fixed at the first attempt.
    bench.cpu.set_reg(1, 0);
    assert_eq!(inst.step(&mut bench.cpu, &mut bench.bus), ExecStatus::Normal);
    assert_eq!(bench.cpu.reg(5), 0xDEAD_BEEF);
}

#[test]
fn sub_word_accesses_are_big_endian() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(5, 0x1234_56AB);
    assert_eq!(bench.exec(0, asm::sbi(5, 0, 0x101)), ExecStatus::Normal);
    assert_eq!(bench.exec(4, asm::shi(5, 0, 0x106)), ExecStatus::Normal);
    assert_eq!(bench.bus.peek_word(0x100), Some(0x00AB_0000));
    assert_eq!(bench.bus.peek_word(0x104), Some(0x0000_56AB));

    let _ = bench.exec(8, asm::lbui(6, 0, 0x101));
    let _ = bench.exec(12, asm::lhui(7, 0, 0x106));
    assert_eq!(bench.cpu.reg(6), 0xAB);
    assert_eq!(bench.cpu.reg(7), 0x56AB);
}

#[test]
fn register_indexed_store_and_load() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(1, 0x200);
    bench.cpu.set_reg(2, 0x10);
    bench.cpu.set_reg(3, 77);
    let _ = bench.exec(0, asm::sw(3, 1, 2));
    let _ = bench.exec(4, asm::lw(4, 1, 2));
    assert_eq!(bench.cpu.reg(4), 77);
}

#[rstest]
#[case::load(asm::lwi(5, 0, 0x102), 5 << 5, 0x102)]
#[case::store(asm::swi(6, 0, 0x106), (6 << 5) | 0x400, 0x106)]
#[case::half(asm::lhui(7, 0, 0x101), 7 << 5, 0x101)]
fn unaligned_access_reports_cause(#[case] word: u32, #[case] esr: u32, #[case] ear: u32) {
    let mut bench = Bench::new();
    assert_eq!(bench.exec(0, word), ExecStatus::MemUnaligned);
    assert_eq!(bench.cpu.special.esr, esr);
    assert_eq!(bench.cpu.special.ear, ear);
}

#[test]
fn access_outside_every_region_is_mapped() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(1, 0x9000_0000);
    assert_eq!(bench.exec(0, asm::lwi(5, 1, 4)), ExecStatus::MemMapped);
    assert_eq!(bench.cpu.special.ear, 0x9000_0004);
    assert_eq!(bench.cpu.reg(5), 0);
}

#[test]
fn branch_and_link_records_its_own_address() {
    let mut bench = Bench::new();
    assert_eq!(bench.exec(0x100, asm::brlid(15, 0x40)), ExecStatus::DelaySlot);
    assert_eq!(bench.cpu.reg(15), 0x100);
    assert_eq!(bench.cpu.pc, 0x140);

    assert_eq!(bench.exec(0x140, asm::brai(0x80)), ExecStatus::Jump);
    assert_eq!(bench.cpu.pc, 0x80);

    bench.cpu.set_reg(9, 0x300);
    assert_eq!(bench.exec(0x80, asm::br(9)), ExecStatus::Jump);
    assert_eq!(bench.cpu.pc, 0x380);
}

#[test]
fn returns_update_the_status_register() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(15, 0x100);
    assert_eq!(bench.exec(0x400, asm::rtsd(15, 8)), ExecStatus::DelaySlot);
    assert_eq!(bench.cpu.pc, 0x108);

    bench.cpu.set_reg(14, 0x200);
    let _ = bench.exec(0x10, asm::rtid(14, 0));
    assert_eq!(bench.cpu.pc, 0x200);
    assert!(bench.cpu.msr().contains(Msr::IE));

    bench.cpu.msr_mut().insert(Msr::EIP);
    bench.cpu.set_reg(17, 0x304);
    let _ = bench.exec(0x20, asm::rted(17, 0));
    assert_eq!(bench.cpu.pc, 0x304);
    assert!(bench.cpu.msr().contains(Msr::EE));
    assert!(!bench.cpu.msr().contains(Msr::EIP));
}

#[test]
fn break_links_and_sets_bip() {
    let mut bench = Bench::new();
    assert_eq!(bench.exec(0x50, asm::brki(16, 0x18)), ExecStatus::Jump);
    assert_eq!(bench.cpu.reg(16), 0x50);
    assert_eq!(bench.cpu.pc, 0x18);
    assert!(bench.cpu.msr().contains(Msr::BIP));
}

#[test]
fn msr_moves_return_the_old_value_and_keep_the_carry() {
    let mut bench = Bench::new();
    bench.cpu.msr_mut().set_carry(true);
    let before = bench.cpu.msr().bits();

    let _ = bench.exec(0, asm::msrset(3, 0x6));
    assert_eq!(bench.cpu.reg(3), before);
    assert!(bench.cpu.msr().contains(Msr::IE));

    let _ = bench.exec(4, asm::msrclr(4, 0x6));
    assert!(!bench.cpu.msr().contains(Msr::IE));
    assert!(bench.cpu.msr().carry());
}

#[test]
fn special_register_moves() {
    let mut bench = Bench::new();
    let _ = bench.exec(0x40, asm::mfs(3, 0x2000));
    assert_eq!(bench.cpu.reg(3), 0xCAFE_0001);

    let _ = bench.exec(0x44, asm::mfs(4, 0x0));
    assert_eq!(bench.cpu.reg(4), 0x44);

    bench.cpu.set_reg(5, 0x1234);
    let _ = bench.exec(0x48, asm::mts(5, 0x3));
    assert_eq!(bench.cpu.special.ear, 0x1234);
}

#[test]
fn unary_operations() {
    let mut bench = Bench::new();
    bench.cpu.set_reg(1, 0x8000_0081);
    let _ = bench.exec(0, asm::sra(2, 1));
    assert_eq!(bench.cpu.reg(2), 0xC000_0040);
    assert!(bench.cpu.msr().carry());

    let _ = bench.exec(4, asm::src(3, 2));
    assert_eq!(bench.cpu.reg(3), 0xE000_0020);
    assert!(!bench.cpu.msr().carry());

    let _ = bench.exec(8, asm::sext8(4, 1));
    assert_eq!(bench.cpu.reg(4), 0xFFFF_FF81);
}

#[test]
fn register_zero_ignores_writes() {
    let mut bench = Bench::new();
    let _ = bench.exec(0, asm::addik(0, 0, 5));
    assert_eq!(bench.cpu.reg(0), 0);
}

#[rstest]
#[case::bubble(Instruction::empty(), ExecStatus::Empty)]
#[case::illegal(Instruction::illegal(0x10, 0), ExecStatus::Illegal)]
#[case::bus_fault(Instruction::bus_fault(0x10), ExecStatus::InstructionBus)]
fn placeholder_slots_report_their_status(#[case] inst: Instruction, #[case] status: ExecStatus) {
    let mut bench = Bench::new();
    let mut inst = inst;
    assert_eq!(bench.run(&mut inst).0, status);
}

#[test]
fn markers_preempt_the_effect() {
    let mut bench = Bench::new();
    let mut inst = bench.decode(0x24, asm::addik(3, 0, 9)).with_marker(Marker::Breakpoint);
    assert_eq!(bench.run(&mut inst).0, ExecStatus::Breakpoint);
    assert_eq!(bench.cpu.reg(16), 0x24);
    assert_eq!(bench.cpu.reg(3), 0);

    let mut inst = bench.decode(0x28, asm::NOP).with_marker(Marker::Stop);
    assert_eq!(bench.run(&mut inst).0, ExecStatus::Stop);
}
