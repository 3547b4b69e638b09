//! Breakpoint arming, hitting and clearing.

use crate::common::{TestContext, asm};
use opbsim_core::RunStatus;
use pretty_assertions::assert_eq;

fn counter() -> TestContext {
    TestContext::new().program(&[
        asm::addik(3, 0, 1),
        asm::addik(3, 3, 1),
        asm::addik(3, 3, 1),
        asm::NOP,
    ])
}

#[test]
fn breakpoint_stops_before_the_instruction() {
    let mut ctx = counter();
    ctx.sim.set_breakpoint(8);

    assert_eq!(ctx.run(100), RunStatus::Breakpoint);
    assert_eq!(ctx.reg(16), 8);
    assert_eq!(ctx.reg(3), 2);

    // Hitting it again makes no progress.
    let retired = ctx.sim.stats().retired;
    assert_eq!(ctx.run(100), RunStatus::Breakpoint);
    assert_eq!(ctx.sim.stats().retired, retired);

    assert!(ctx.sim.clear_breakpoint(8));
    assert_eq!(ctx.run(100), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 3);
}

#[test]
fn breakpoint_arms_instructions_already_in_flight() {
    let mut ctx = counter();
    assert_eq!(ctx.sim.run_to(4), RunStatus::Normal);
    assert_eq!(ctx.sim.cpu().pipeline.decode.address(), Some(8));

    ctx.sim.set_breakpoint(8);
    assert_eq!(ctx.run(100), RunStatus::Breakpoint);
    assert_eq!(ctx.reg(3), 2);
}

#[test]
fn clearing_a_breakpoint_on_the_exit_restores_stop() {
    let mut ctx = counter();
    ctx.sim.set_breakpoint(12);
    assert_eq!(ctx.run(100), RunStatus::Breakpoint);
    assert!(ctx.sim.clear_breakpoint(12));
    assert_eq!(ctx.run(100), RunStatus::Stop);
}

#[test]
fn breakpoints_are_listed_in_order_and_survive_reload() {
    let mut ctx = counter();
    ctx.sim.set_breakpoint(8);
    ctx.sim.set_breakpoint(4);
    assert!(!ctx.sim.clear_breakpoint(0x40));
    assert_eq!(ctx.sim.cpu().breakpoints().collect::<Vec<_>>(), vec![4, 8]);

    let mut ctx = ctx.program(&[asm::addik(3, 0, 1), asm::addik(3, 3, 1), asm::NOP]);
    assert_eq!(ctx.run(100), RunStatus::Breakpoint);
    assert_eq!(ctx.reg(16), 4);
}
