//! Pipeline slot movement and the cycle-level reactions built on it.

use crate::common::{TestContext, asm};
use opbsim_core::RunStatus;
use opbsim_core::config::CpuConfig;
use opbsim_core::core::pipeline::Pipeline;
use opbsim_core::isa::Decoder;
use opbsim_core::isa::Instruction;
use opbsim_core::isa::latency::LatencyTable;
use pretty_assertions::assert_eq;

fn inst(pc: u32) -> Instruction {
    Decoder::new(LatencyTable::from_config(&CpuConfig::default())).decode(pc, asm::NOP)
}

#[test]
fn shift_moves_every_slot_forward() {
    let mut p = Pipeline::new();
    assert_eq!(p.serial(), 0);

    p.shift(inst(0));
    p.shift(inst(4));
    assert!(p.execute.is_empty());
    p.shift(inst(8));

    assert_eq!(p.execute.address(), Some(0));
    assert_eq!(p.decode.address(), Some(4));
    assert_eq!(p.fetch.address(), Some(8));
    assert_eq!(p.serial(), 3);
}

#[test]
fn refill_leaves_execute_alone() {
    let mut p = Pipeline::new();
    p.issue(inst(0x40));
    p.refill(inst(0));
    p.refill(inst(4));

    assert_eq!(p.execute.address(), Some(0x40));
    assert_eq!(p.decode.address(), Some(0));
    assert_eq!(p.fetch.address(), Some(4));
    assert_eq!(p.serial(), 1);
}

#[test]
fn delay_slot_issues_decode_and_drops_fetch() {
    let mut p = Pipeline::new();
    p.shift(inst(0));
    p.shift(inst(4));
    p.shift(inst(8));

    p.delay_slot(inst(0x100));
    assert_eq!(p.execute.address(), Some(4));
    assert!(p.decode.is_empty());
    assert_eq!(p.fetch.address(), Some(0x100));
    assert_eq!(p.serial(), 4);
}

#[test]
fn flush_leaves_only_the_new_fetch() {
    let mut p = Pipeline::new();
    p.shift(inst(0));
    p.shift(inst(4));
    p.shift(inst(8));

    p.flush(inst(0x100));
    assert!(p.execute.is_empty());
    assert!(p.decode.is_empty());
    assert_eq!(p.fetch.address(), Some(0x100));
    assert_eq!(p.serial(), 4);

    p.reset();
    assert_eq!(p, Pipeline::new());
}

#[test]
fn first_instruction_executes_after_three_bubbles() {
    let mut ctx = TestContext::new().program(&[asm::addik(3, 0, 1), asm::NOP]);
    assert_eq!(ctx.run(3), RunStatus::Normal);
    assert_eq!(ctx.sim.cpu().execute().address(), Some(0));
    assert_eq!(ctx.sim.stats().bubbles, 3);
    assert_eq!(ctx.reg(3), 0);

    assert_eq!(ctx.run(1), RunStatus::Normal);
    assert_eq!(ctx.reg(3), 1);
}

#[test]
fn jump_discards_the_fall_through_path() {
    let mut ctx = TestContext::new().program(&[
        asm::bri(12),
        asm::addik(3, 0, 1),
        asm::addik(4, 0, 1),
        asm::NOP,
    ]);
    assert_eq!(ctx.run(100), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 0);
    assert_eq!(ctx.sim.stats().jumps, 1);
}

#[test]
fn delay_slot_instruction_still_executes() {
    let mut ctx = TestContext::new().program(&[
        asm::brid(12),
        asm::addik(3, 0, 1),
        asm::addik(4, 0, 1),
        asm::NOP,
    ]);
    assert_eq!(ctx.run(100), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 1);
    assert_eq!(ctx.reg(4), 0);
}

#[test]
fn counted_loop_runs_to_completion() {
    // r3 counts down from 5 while r4 accumulates.
    let mut ctx = TestContext::new().program(&[
        asm::addik(3, 0, 5),
        asm::addik(4, 4, 2),
        asm::addik(3, 3, -1),
        asm::bnei(3, -8),
        asm::NOP,
    ]);
    assert_eq!(ctx.run(1_000), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 10);
    assert_eq!(ctx.sim.stats().jumps, 4);
}

#[test]
fn stalled_instruction_holds_the_front_end() {
    let mut ctx = TestContext::builder()
        .latency("addk", 3)
        .build()
        .program(&[asm::addk(3, 0, 0), asm::addik(4, 0, 1), asm::NOP]);

    assert_eq!(ctx.run(100), RunStatus::Stop);
    let stats = *ctx.sim.stats();
    assert_eq!(stats.stall_cycles, 2);
    assert_eq!(stats.retired, 3);
    assert_eq!(stats.cycles, 3 + 3 + 1 + 1);
    assert_eq!(ctx.reg(4), 1);
}

#[test]
fn memory_wait_cycles_are_counted() {
    let mut ctx = TestContext::builder()
        .with_opb()
        .build()
        .program(&[
            asm::imm(0x8000),
            asm::lwi(5, 0, 0),
            asm::NOP,
        ]);
    let latency = ctx.sim.config().memory.opb.map(|r| r.read_latency).unwrap();

    assert_eq!(ctx.run(100), RunStatus::Stop);
    assert_eq!(ctx.sim.stats().memory_wait_cycles, u64::from(latency - 1));
}
