//! OPB Timer/Counter.
//!
//! Two independent 32-bit timers, each with a control/status register (TCSR), a load
//! register (TLR) and a live counter (TCR). This module provides:
//! 1. **Control Decoding:** TCSR writes are decoded into [`TimerControl`] flags at commit time.
//! 2. **Counting:** Up or down counting with auto-reload or hold on wraparound.
//! 3. **Interrupts:** The interrupt line is the OR of enabled, pending timer interrupts.
//!
//! The global enable bit (ENALL) is special: committing it into one TCSR writes ENALL and
//! ENT straight into the other TCSR's committed value within the same update.

use bitflags::bitflags;

use crate::soc::register::TwoPhase;
use crate::soc::traits::OpbDevice;

bitflags! {
    /// Timer control/status register bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TimerControl: u32 {
        /// Enable all timers (mirrored into the sibling TCSR).
        const ENALL = 0x400;
        /// Pulse width modulation.
        const PWMA = 0x200;
        /// Interrupt pending; write 1 to clear.
        const TINT = 0x100;
        /// Enable the timer.
        const ENT = 0x80;
        /// Enable the interrupt output.
        const ENIT = 0x40;
        /// Load TCR from TLR.
        const LOAD = 0x20;
        /// Auto-reload on wraparound instead of holding.
        const ARHT = 0x10;
        /// Enable external capture trigger.
        const CAPT = 0x8;
        /// Enable external generate signal.
        const GENT = 0x4;
        /// Count down instead of up.
        const UDT = 0x2;
        /// Capture mode; the timer does not count while set.
        const MDT = 0x1;
    }
}

/// A timer control/status register.
///
/// The committed value is the flag word itself, so `get` and `flags` always agree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlStatus {
    reg: TwoPhase,
}

impl ControlStatus {
    /// Creates a cleared register.
    pub const fn new() -> Self {
        Self {
            reg: TwoPhase::new(),
        }
    }

    /// Returns the committed register value.
    pub const fn get(&self) -> u32 {
        self.reg.get()
    }

    /// Stages a write; decoded on the next update.
    pub const fn put(&mut self, value: u32) {
        self.reg.put(value);
    }

    /// Returns the committed flags.
    pub const fn flags(&self) -> TimerControl {
        TimerControl::from_bits_retain(self.reg.get())
    }

    /// Returns `true` when every flag in `flag` is set.
    pub const fn contains(&self, flag: TimerControl) -> bool {
        self.flags().contains(flag)
    }

    /// Sets or clears flags directly in the committed value.
    pub fn force(&mut self, flag: TimerControl, on: bool) {
        let mut flags = self.flags();
        flags.set(flag, on);
        self.reg.force(flags.bits());
    }

    /// Mirrors a global enable change from the sibling register.
    ///
    /// Setting ENALL also sets ENT; clearing ENALL leaves ENT alone.
    pub fn force_enable_all(&mut self, on: bool) {
        if on {
            self.force(TimerControl::ENALL | TimerControl::ENT, true);
        } else {
            self.force(TimerControl::ENALL, false);
        }
    }

    /// Commits a staged write, if any.
    ///
    /// The written TINT bit clears a pending interrupt; writing 0 there keeps the current
    /// state. The written ENALL bit is propagated into `sibling` immediately.
    pub fn update(&mut self, sibling: &mut Self) {
        let Some(value) = self.reg.take() else {
            return;
        };

        let mut flags = TimerControl::from_bits_retain(value);
        sibling.force_enable_all(flags.contains(TimerControl::ENALL));

        if flags.contains(TimerControl::TINT) {
            flags.remove(TimerControl::TINT);
        } else {
            flags.set(TimerControl::TINT, self.contains(TimerControl::TINT));
        }
        self.reg.force(flags.bits());
    }

    /// Zeroes the register and drops anything staged.
    pub const fn clear(&mut self) {
        self.reg.clear();
    }
}

/// Selects one of the two timers of a [`TimerCounter`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Timer 0 (`tcsr0`, `tlr0`, `tcr0`).
    Zero,
    /// Timer 1 (`tcsr1`, `tlr1`, `tcr1`).
    One,
}

impl Timer {
    /// Both timers in register order.
    pub const ALL: [Self; TIMERS] = [Self::Zero, Self::One];

    const fn index(self) -> usize {
        self as usize
    }
}

const TIMERS: usize = 2;

/// Dual timer/counter peripheral.
#[derive(Debug)]
pub struct TimerCounter {
    name: String,
    control: [ControlStatus; TIMERS],
    load: [TwoPhase; TIMERS],
    counter: [u32; TIMERS],
    read_latency: u32,
    write_latency: u32,
    interrupt: bool,
}

impl TimerCounter {
    /// Register names in declaration order.
    pub const REGISTERS: &'static [&'static str] = &["tcsr0", "tlr0", "tcr0", "tcsr1", "tlr1", "tcr1"];

    /// Creates a timer with all registers cleared.
    ///
    /// # Arguments
    ///
    /// * `name` - Instance name.
    /// * `read_latency` - Bus read latency in cycles.
    /// * `write_latency` - Bus write latency in cycles.
    pub fn new(name: impl Into<String>, read_latency: u32, write_latency: u32) -> Self {
        Self {
            name: name.into(),
            control: [ControlStatus::new(); TIMERS],
            load: [TwoPhase::new(); TIMERS],
            counter: [0; TIMERS],
            read_latency,
            write_latency,
            interrupt: false,
        }
    }

    /// Control/status register of `timer`.
    pub const fn control(&self, timer: Timer) -> &ControlStatus {
        &self.control[timer.index()]
    }

    /// Mutable control/status register of `timer`.
    pub const fn control_mut(&mut self, timer: Timer) -> &mut ControlStatus {
        &mut self.control[timer.index()]
    }

    /// Load register of `timer`.
    pub const fn load(&self, timer: Timer) -> &TwoPhase {
        &self.load[timer.index()]
    }

    /// Mutable load register of `timer`.
    pub const fn load_mut(&mut self, timer: Timer) -> &mut TwoPhase {
        &mut self.load[timer.index()]
    }

    /// Live counter of `timer`.
    pub const fn counter(&self, timer: Timer) -> u32 {
        self.counter[timer.index()]
    }

    /// Sets the live counter of `timer`.
    pub const fn set_counter(&mut self, timer: Timer, value: u32) {
        self.counter[timer.index()] = value;
    }

    /// Commits staged writes of all four writable registers.
    ///
    /// TCSR0 is committed before TCSR1, so when both are written in one cycle the ENALL
    /// bit written into TCSR1 decides both.
    pub fn update(&mut self) {
        let [tcsr0, tcsr1] = &mut self.control;
        tcsr0.update(tcsr1);
        tcsr1.update(tcsr0);
        for load in &mut self.load {
            let _ = load.update();
        }
    }

    fn advance(&mut self, timer: Timer) {
        let index = timer.index();
        let flags = self.control[index].flags();
        if flags.contains(TimerControl::MDT) {
            return;
        }
        if flags.contains(TimerControl::LOAD) {
            self.counter[index] = self.load[index].get();
        }
        if !flags.contains(TimerControl::ENT) {
            return;
        }

        let reload = flags.contains(TimerControl::ARHT);
        let load = self.load[index].get();
        let counter = self.counter[index];
        let mut expired = false;

        self.counter[index] = if flags.contains(TimerControl::UDT) {
            if counter == 0 {
                expired = true;
                if reload { load.wrapping_sub(1) } else { u32::MAX }
            } else {
                counter - 1
            }
        } else if counter == u32::MAX {
            expired = true;
            if reload { load.wrapping_add(1) } else { 0 }
        } else {
            counter + 1
        };

        if expired {
            tracing::trace!(device = %self.name, ?timer, "timer expired");
            self.control[index].force(TimerControl::TINT, true);
        }
    }

    fn pending(&self, timer: Timer) -> bool {
        self.control(timer).contains(TimerControl::ENIT | TimerControl::TINT)
    }
}

impl OpbDevice for TimerCounter {
    fn name(&self) -> &str {
        &self.name
    }

    fn register_names(&self) -> &'static [&'static str] {
        Self::REGISTERS
    }

    fn read_latency(&self) -> u32 {
        self.read_latency
    }

    fn write_latency(&self) -> u32 {
        self.write_latency
    }

    fn get(&mut self, register: usize) -> u32 {
        self.peek(register)
    }

    fn peek(&self, register: usize) -> u32 {
        match register {
            0 => self.control[0].get(),
            1 => self.load[0].get(),
            2 => self.counter[0],
            3 => self.control[1].get(),
            4 => self.load[1].get(),
            5 => self.counter[1],
            _ => 0,
        }
    }

    fn put(&mut self, register: usize, value: u32) {
        match register {
            0 => self.control[0].put(value),
            1 => self.load[0].put(value),
            3 => self.control[1].put(value),
            4 => self.load[1].put(value),
            2 | 5 => {
                tracing::warn!(device = %self.name, value, "write to read-only counter register ignored");
            }
            _ => {}
        }
    }

    fn cycle(&mut self) -> bool {
        let pwm = self.control.iter().all(|c| c.contains(TimerControl::PWMA));
        if !pwm {
            for timer in Timer::ALL {
                self.advance(timer);
            }
        }

        self.interrupt = Timer::ALL.into_iter().any(|timer| self.pending(timer));
        self.update();
        self.interrupt
    }

    fn interrupt(&self) -> bool {
        self.interrupt
    }

    fn reset(&mut self) {
        for control in &mut self.control {
            control.clear();
        }
        for load in &mut self.load {
            load.clear();
        }
        self.counter = [0; TIMERS];
        self.interrupt = false;
    }
}
