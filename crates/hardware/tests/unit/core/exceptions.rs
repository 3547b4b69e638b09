//! Hardware exceptions: vector entry when enabled, terminal statuses otherwise.

use crate::common::harness::layout;
use crate::common::{TestContext, asm};
use opbsim_core::RunStatus;
use opbsim_core::core::arch::Msr;
use pretty_assertions::assert_eq;
use rstest::rstest;

const MAIN: u32 = 0x40;
const HANDLER_EXIT: u32 = 0x28;

/// A program that enables exceptions, runs `body` at `MAIN + 4` and parks the handler's
/// view of ESR and EAR in r10 and r11.
fn with_handler(enable: bool, body: &[u32]) -> Vec<u32> {
    let enable = if enable { asm::msrset(0, 0x100) } else { asm::NOP };
    let mut main = vec![enable];
    main.extend_from_slice(body);
    layout(&[
        (0x00, &[asm::brai(MAIN as i16)]),
        (0x20, &[asm::mfs(10, 0x5), asm::mfs(11, 0x3), asm::NOP]),
        (MAIN, &main),
    ])
}

fn run(program: &[u32], exit: u32) -> TestContext {
    let mut ctx = TestContext::builder()
        .build()
        .load(program, Some(exit));
    let status = ctx.run(500);
    assert_eq!(status, RunStatus::Stop);
    ctx
}

#[rstest]
#[case::unaligned(&[asm::lwi(5, 0, 0x102)], (5 << 5) | 0x1, Some(0x102))]
#[case::illegal(&[0], 0x2, None)]
#[case::data_bus(&[asm::imm(0x9000), asm::lwi(5, 0, 0)], 0x4, Some(0x9000_0000))]
fn exception_enters_the_vector(#[case] body: &[u32], #[case] esr: u32, #[case] ear: Option<u32>) {
    let ctx = run(&with_handler(true, body), HANDLER_EXIT);
    let faulting = MAIN + 4 * body.len() as u32;

    assert_eq!(ctx.reg(10), esr);
    if let Some(ear) = ear {
        assert_eq!(ctx.reg(11), ear);
    }
    assert_eq!(ctx.reg(17), faulting + 4);
    let msr = ctx.sim.cpu().msr();
    assert!(msr.contains(Msr::EIP));
    assert!(!msr.contains(Msr::EE));
    assert_eq!(ctx.sim.stats().exceptions, 1);
}

#[test]
fn instruction_bus_fault_records_the_address() {
    let program = with_handler(true, &[asm::imm(0x9000), asm::brai(0x10)]);
    let ctx = run(&program, HANDLER_EXIT);
    assert_eq!(ctx.reg(10), 0x3);
    assert_eq!(ctx.reg(11), 0x9000_0010);
    assert_eq!(ctx.reg(17), 0x9000_0014);
}

#[rstest]
#[case::unaligned(&[asm::lhui(5, 0, 0x101)], RunStatus::MemUnaligned)]
#[case::illegal(&[0], RunStatus::Illegal)]
#[case::unpopulated(&[asm::bri(0x400)], RunStatus::Illegal)]
#[case::instruction_bus(&[asm::imm(0x9000), asm::brai(0)], RunStatus::Illegal)]
fn disabled_exception_stops_the_run(#[case] body: &[u32], #[case] status: RunStatus) {
    let mut ctx = TestContext::new().load(&with_handler(false, body), Some(HANDLER_EXIT));
    assert_eq!(ctx.run(500), status);
    assert_eq!(ctx.sim.stats().exceptions, 0);
    // The fault repeats rather than making progress.
    assert_eq!(ctx.run(10), status);
}

#[test]
fn mapped_access_without_exceptions_continues() {
    let body = [asm::imm(0x9000), asm::lwi(5, 0, 0), asm::addik(3, 0, 1), asm::NOP];
    let exit = MAIN + 4 * body.len() as u32;
    let mut ctx = TestContext::new().load(&with_handler(false, &body), Some(exit));
    assert_eq!(ctx.run(500), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 1);
    assert_eq!(ctx.reg(5), 0);
}

#[test]
fn rted_resumes_after_the_fault() {
    let program = layout(&[
        (0x00, &[asm::brai(MAIN as i16)]),
        (0x20, &[asm::mfs(10, 0x5), asm::rted(17, 0), asm::NOP]),
        (MAIN, &[asm::msrset(0, 0x100), 0, asm::addik(3, 0, 7), asm::NOP]),
    ]);
    let mut ctx = TestContext::new().load(&program, Some(MAIN + 12));

    assert_eq!(ctx.run(500), RunStatus::Stop);
    assert_eq!(ctx.reg(10), 0x2);
    assert_eq!(ctx.reg(3), 7);
    let msr = ctx.sim.cpu().msr();
    assert!(msr.contains(Msr::EE));
    assert!(!msr.contains(Msr::EIP));
}

#[test]
fn nested_fault_inside_the_handler_is_terminal() {
    let program = layout(&[
        (0x00, &[asm::brai(MAIN as i16)]),
        (0x20, &[0]),
        (MAIN, &[asm::msrset(0, 0x100), 0]),
    ]);
    let mut ctx = TestContext::new().load(&program, None);
    assert_eq!(ctx.run(500), RunStatus::Illegal);
    assert_eq!(ctx.sim.stats().exceptions, 1);
}
