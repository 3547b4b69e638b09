//! Run controls, reset and program loading through the simulator.

use crate::common::harness::{OPB_BEGIN, OPB_END, UART_BASE};
use crate::common::{TestContext, asm};
use opbsim_core::RunStatus;
use opbsim_core::common::LoadError;
use opbsim_core::config::{Config, MemoryConfig};
use opbsim_core::sim::{ProgramImage, Simulator};
use opbsim_core::soc::Console;
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Five single-cycle instructions followed by the exit.
fn straight_line() -> TestContext {
    TestContext::new().program(&[
        asm::addik(3, 0, 1),
        asm::addik(3, 3, 1),
        asm::addik(3, 3, 1),
        asm::addik(3, 3, 1),
        asm::addik(3, 3, 1),
        asm::NOP,
    ])
}

#[test]
fn run_cycles_counts_every_cycle() {
    let mut ctx = straight_line();
    assert_eq!(ctx.sim.run_cycles(5), RunStatus::Normal);
    assert_eq!(ctx.sim.cycles(), 5);
    assert_eq!(ctx.reg(3), 2);

    assert_eq!(ctx.sim.run_cycles(0), RunStatus::Normal);
    assert_eq!(ctx.sim.cycles(), 5);
}

#[test]
fn run_cycles_stops_early_on_a_terminal_status() {
    let mut ctx = straight_line();
    assert_eq!(ctx.sim.run_cycles(1_000), RunStatus::Stop);
    assert_eq!(ctx.sim.cycles(), 3 + 6);
}

#[test]
fn run_instructions_counts_retirements() {
    let mut ctx = straight_line();
    assert_eq!(ctx.sim.run_instructions(2), RunStatus::Normal);
    assert_eq!(ctx.sim.stats().retired, 2);
    assert_eq!(ctx.reg(3), 2);

    assert_eq!(ctx.sim.step(), RunStatus::Normal);
    assert_eq!(ctx.reg(3), 3);
    assert_eq!(ctx.sim.stats().retired, 3);
}

#[test]
fn step_over_a_stalled_instruction_takes_its_latency() {
    let mut ctx = TestContext::builder()
        .latency("addik", 4)
        .build()
        .program(&[asm::addik(3, 0, 1), asm::NOP]);
    assert_eq!(ctx.sim.step(), RunStatus::Normal);
    assert_eq!(ctx.sim.cycles(), 3 + 4);
}

#[test]
fn step_over_a_taken_branch_runs_through_the_bubbles() {
    let mut ctx = TestContext::new().program(&[
        asm::bri(8),
        asm::addik(4, 0, 9),
        asm::addik(3, 0, 7),
        asm::NOP,
    ]);
    assert_eq!(ctx.sim.run_to(0), RunStatus::Normal);
    let before = ctx.sim.cycles();

    assert_eq!(ctx.sim.step(), RunStatus::Normal);
    let execute = ctx.sim.cpu().execute();
    assert!(!execute.is_empty());
    assert_eq!(execute.pc, 8);
    assert_eq!(ctx.sim.cycles() - before, 3);
    assert_eq!(ctx.sim.stats().retired, 1);
    assert_eq!(ctx.reg(4), 0);

    assert_eq!(ctx.sim.step(), RunStatus::Normal);
    assert_eq!(ctx.reg(3), 7);
}

#[test]
fn run_to_stops_with_the_address_in_execute() {
    let mut ctx = straight_line();
    assert_eq!(ctx.sim.run_to(12), RunStatus::Normal);
    assert_eq!(ctx.sim.cpu().execute().address(), Some(12));
    assert_eq!(ctx.reg(3), 3);

    // An address never reached runs into the exit instead.
    assert_eq!(ctx.sim.run_to(0x400), RunStatus::Stop);
}

#[test]
fn run_returns_on_stop() {
    let mut ctx = straight_line();
    assert_eq!(ctx.sim.run(), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 5);
    assert_eq!(ctx.sim.stats().retired, 6);
}

#[test]
fn reset_returns_to_power_on_state() {
    let mut ctx = straight_line();
    let _ = ctx.sim.run();
    ctx.sim.reset();

    assert_eq!(ctx.sim.cycles(), 0);
    assert_eq!(*ctx.sim.stats(), Default::default());
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.sim.cpu().pc(), 0);
    assert_eq!(ctx.sim.bus().peek_word(0), None);
    assert!(!ctx.sim.interrupt());
}

#[test]
fn seconds_follow_the_configured_clock() {
    let mut config = Config::default();
    config.cpu.frequency_hz = 1_000;
    let mut sim = Simulator::new(config, &Console::default()).unwrap();
    sim.load(&ProgramImage::new().with_words(0, &[asm::NOP]).with_exit(0), true)
        .unwrap();
    assert_eq!(sim.run(), RunStatus::Stop);
    assert_eq!(sim.cycles(), 4);
    assert!((sim.simulated_seconds() - 0.004).abs() < 1e-12);
}

#[rstest]
#[case::past_lmb(0xFFFC, 2, LoadError::SectionOutOfRange { begin: 0xFFFC, end: 0x1_0003 })]
#[case::unmapped(0x2000_0000, 1, LoadError::SectionOutOfRange { begin: 0x2000_0000, end: 0x2000_0003 })]
fn section_outside_memory_is_rejected(#[case] base: u32, #[case] len: usize, #[case] error: LoadError) {
    let mut ctx = TestContext::new();
    let image = ProgramImage::new().with_words(base, &vec![asm::NOP; len]).with_exit(base);
    assert_eq!(ctx.sim.load(&image, true), Err(error));
    assert_eq!(ctx.sim.bus().peek_word(0xFFFC), None);
}

#[test]
fn stray_word_outside_memory_is_rejected() {
    let mut ctx = TestContext::new();
    let image = ProgramImage::new()
        .with_words(0, &[asm::NOP])
        .with_word(0x4000_0000, asm::NOP)
        .with_exit(0);
    assert_eq!(
        ctx.sim.load(&image, true),
        Err(LoadError::SectionOutOfRange {
            begin: 0x4000_0000,
            end: 0x4000_0003,
        })
    );
    assert_eq!(ctx.sim.bus().peek_word(0), None);
}

#[test]
fn section_spanning_adjacent_regions_is_accepted() {
    let mut config = Config::default();
    config.memory.opb = Some(MemoryConfig::opb_region(0x1_0000, 0x1_FFFF));
    let mut sim = Simulator::new(config, &Console::default()).unwrap();
    let image = ProgramImage::new().with_words(0xFFF8, &[asm::NOP; 4]).with_exit(0xFFF8);
    assert_eq!(sim.load(&image, true), Ok(()));
    assert_eq!(sim.bus().peek_word(0x1_0004), Some(asm::NOP));
}

#[test]
fn section_spanning_a_gap_is_rejected() {
    let mut ctx = TestContext::builder().with_opb().build();
    let image = ProgramImage::new().with_section(0xFFF0, OPB_BEGIN + 4);
    assert!(matches!(
        ctx.sim.load(&image, false),
        Err(LoadError::SectionOutOfRange { .. })
    ));

    let image = ProgramImage::new().with_words(OPB_END - 7, &[asm::NOP, asm::NOP]);
    assert_eq!(ctx.sim.load(&image, false), Ok(()));
}

#[test]
fn missing_exit_is_rejected_only_when_required() {
    let mut ctx = TestContext::new();
    let image = ProgramImage::new().with_words(0, &[asm::NOP]);
    assert_eq!(ctx.sim.load(&image, true), Err(LoadError::MissingExit));
    assert_eq!(ctx.sim.load(&image, false), Ok(()));
    assert_eq!(ctx.sim.cpu().exit(), None);
}

#[test]
fn reload_replaces_the_previous_program() {
    let mut ctx = straight_line();
    let _ = ctx.sim.run();
    let mut ctx = ctx.program(&[asm::addik(4, 0, 9), asm::NOP]);
    assert_eq!(ctx.sim.cycles(), 0);
    assert_eq!(ctx.sim.bus().peek_word(8), None);
    assert_eq!(ctx.sim.run(), RunStatus::Stop);
    assert_eq!(ctx.reg(3), 0);
    assert_eq!(ctx.reg(4), 9);
}

#[test]
fn uart_output_reaches_the_console() {
    let program = [
        asm::imm((UART_BASE >> 16) as u16),
        asm::addik(1, 0, 0),
        asm::addik(2, 0, i16::from(b'h')),
        asm::swi(2, 1, 4),
        asm::addik(2, 0, i16::from(b'i')),
        asm::swi(2, 1, 4),
        asm::NOP,
    ];
    let mut ctx = TestContext::builder().with_uart().build().program(&program);
    assert_eq!(ctx.sim.run_cycles(500), RunStatus::Stop);
    assert_eq!(ctx.output.contents(), b"hi");
}
