//! Timer/counter device tests.

use opbsim_core::soc::devices::{OpbDevice, Timer, TimerControl, TimerCounter};

const TCSR0: usize = 0;
const TLR0: usize = 1;
const TCR0: usize = 2;
const TCSR1: usize = 3;

fn timer() -> TimerCounter {
    TimerCounter::new("opb_timer_0", 2, 2)
}

/// Writes a control word and lets the device commit it without counting.
fn configure(timer: &mut TimerCounter, which: Timer, flags: TimerControl) {
    timer.control_mut(which).put(flags.bits());
    timer.update();
}

#[test]
fn up_count_wraps_and_raises_interrupt_once() {
    let mut t = timer();
    t.set_counter(Timer::Zero, 0xFFFF_FFFE);
    configure(&mut t, Timer::Zero, TimerControl::ENT | TimerControl::ENIT);

    assert!(!t.cycle());
    assert_eq!(t.counter(Timer::Zero), 0xFFFF_FFFF);
    assert!(!t.control(Timer::Zero).contains(TimerControl::TINT));

    assert!(t.cycle());
    assert_eq!(t.counter(Timer::Zero), 0);
    assert!(t.control(Timer::Zero).contains(TimerControl::TINT));
}

#[test]
fn down_count_expires_then_reloads() {
    let mut t = timer();
    t.set_counter(Timer::Zero, 1);
    t.load_mut(Timer::Zero).put(5);
    configure(
        &mut t,
        Timer::Zero,
        TimerControl::ENT | TimerControl::UDT | TimerControl::ARHT,
    );

    let _ = t.cycle();
    assert_eq!(t.counter(Timer::Zero), 0);
    assert!(!t.control(Timer::Zero).contains(TimerControl::TINT));

    let _ = t.cycle();
    assert_eq!(t.counter(Timer::Zero), 4);
    assert!(t.control(Timer::Zero).contains(TimerControl::TINT));
}

#[test]
fn down_count_without_reload_underflows_to_all_ones() {
    let mut t = timer();
    configure(&mut t, Timer::Zero, TimerControl::ENT | TimerControl::UDT);

    let _ = t.cycle();
    assert_eq!(t.counter(Timer::Zero), u32::MAX);
    assert!(t.control(Timer::Zero).contains(TimerControl::TINT));
}

#[test]
fn cleared_underflow_interrupt_stays_clear_until_the_next_underflow() {
    let mut t = timer();
    let flags = TimerControl::ENT | TimerControl::UDT | TimerControl::ARHT | TimerControl::ENIT;
    t.load_mut(Timer::Zero).put(5);
    configure(&mut t, Timer::Zero, flags);

    assert!(t.cycle());
    assert_eq!(t.counter(Timer::Zero), 4);

    // Acknowledge while the line is still high; it drops once the write commits.
    t.put(TCSR0, (flags | TimerControl::TINT).bits());
    assert!(t.cycle());
    assert!(!t.control(Timer::Zero).contains(TimerControl::TINT));
    assert_eq!(t.counter(Timer::Zero), 3);

    for expected in [2, 1, 0] {
        assert!(!t.cycle());
        assert_eq!(t.counter(Timer::Zero), expected);
    }
    assert!(t.cycle());
    assert_eq!(t.counter(Timer::Zero), 4);
}

#[test]
fn disabled_timer_holds_its_count() {
    let mut t = timer();
    t.set_counter(Timer::Zero, 10);
    for _ in 0..5 {
        let _ = t.cycle();
    }
    assert_eq!(t.counter(Timer::Zero), 10);
}

#[test]
fn load_bit_copies_load_register() {
    let mut t = timer();
    t.load_mut(Timer::Zero).put(0x1234);
    configure(&mut t, Timer::Zero, TimerControl::LOAD);
    let _ = t.cycle();
    assert_eq!(t.counter(Timer::Zero), 0x1234);
}

#[test]
fn enable_all_propagates_to_sibling_within_one_update() {
    let mut t = timer();
    t.control_mut(Timer::Zero).put(TimerControl::ENALL.bits());
    t.update();

    let sibling = t.control(Timer::One);
    assert!(sibling.contains(TimerControl::ENT));
    assert!(sibling.contains(TimerControl::ENALL));
}

#[test]
fn writing_tint_clears_pending_interrupt() {
    let mut t = timer();
    t.control_mut(Timer::Zero).force(TimerControl::TINT | TimerControl::ENIT, true);

    // Writing 0 to TINT keeps it.
    t.put(TCSR0, TimerControl::ENIT.bits());
    t.update();
    assert!(t.control(Timer::Zero).contains(TimerControl::TINT));

    t.put(TCSR0, (TimerControl::ENIT | TimerControl::TINT).bits());
    t.update();
    assert!(!t.control(Timer::Zero).contains(TimerControl::TINT));
}

#[test]
fn interrupt_requires_enable() {
    let mut t = timer();
    t.control_mut(Timer::One).force(TimerControl::TINT, true);
    assert!(!t.cycle());
    t.control_mut(Timer::One).force(TimerControl::ENIT, true);
    assert!(t.cycle());
    assert!(t.interrupt());
}

#[test]
fn counter_register_is_read_only_over_the_bus() {
    let mut t = timer();
    t.put(TCR0, 99);
    t.update();
    assert_eq!(t.get(TCR0), 0);
}

#[test]
fn staged_writes_are_invisible_until_cycle() {
    let mut t = timer();
    t.put(TLR0, 42);
    assert_eq!(t.peek(TLR0), 0);
    let _ = t.cycle();
    assert_eq!(t.peek(TLR0), 42);
}

#[test]
fn reset_clears_all_registers() {
    let mut t = timer();
    t.set_counter(Timer::One, 3);
    t.control_mut(Timer::One).force(TimerControl::ENT, true);
    t.reset();
    assert_eq!(t.counter(Timer::One), 0);
    assert_eq!(t.peek(TCSR1), 0);
}
