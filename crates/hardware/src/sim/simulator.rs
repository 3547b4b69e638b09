//! Simulator: owns the CPU and the bus side by side.
//!
//! The bus (with the devices behind it) is lent to the CPU for the execute step and then
//! ticked on its own, so every cycle runs in a fixed order:
//! 1. **CPU:** One pipeline cycle with the interrupt line sampled last cycle.
//! 2. **Devices:** Every device in registration order; their interrupt lines are OR-ed into
//!    the value the CPU sees next cycle.
//! 3. **Counters:** The global cycle count advances.

use tracing::debug;

use crate::common::error::{ConfigResult, LoadError, LoadResult};
use crate::common::status::RunStatus;
use crate::config::Config;
use crate::core::Cpu;
use crate::sim::loader::{FunctionSymbol, ProgramImage};
use crate::sim::profile::Profile;
use crate::soc::{Bus, Console, System};
use crate::stats::SimStats;

/// Top-level simulator.
#[derive(Debug)]
pub struct Simulator {
    cpu: Cpu,
    bus: Bus,
    interrupt: bool,
    config: Config,
    functions: Vec<FunctionSymbol>,
    profile: Profile,
}

impl Simulator {
    /// Builds a simulator from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Memory map, processor latencies and device wiring.
    /// * `console` - Byte endpoints for UART Lite devices.
    ///
    /// # Errors
    ///
    /// Returns the first configuration or wiring error. No simulator is built.
    pub fn new(config: Config, console: &Console) -> ConfigResult<Self> {
        let System { bus } = System::new(&config, console)?;
        let cpu = Cpu::new(&config.cpu);
        debug!(devices = bus.devices().len(), "simulator ready");
        Ok(Self {
            cpu,
            bus,
            interrupt: false,
            config,
            functions: Vec::new(),
            profile: Profile::default(),
        })
    }

    /// Resets and loads `image`.
    ///
    /// # Arguments
    ///
    /// * `image` - Words, sections, functions and exit address of the program.
    /// * `require_exit` - Fail when the program has no exit address.
    ///
    /// # Errors
    ///
    /// Returns `SectionOutOfRange` for a section or word outside the memory regions and
    /// `MissingExit` when an exit is required but absent. The simulator is left in its
    /// reset state on error.
    pub fn load(&mut self, image: &ProgramImage, require_exit: bool) -> LoadResult<()> {
        self.reset();

        let map = self.bus.map();
        if let Some(section) = image.sections().iter().find(|s| !map.covers(s.begin, s.end)) {
            return Err(LoadError::SectionOutOfRange {
                begin: section.begin,
                end: section.end,
            });
        }
        if require_exit && image.exit().is_none() {
            return Err(LoadError::MissingExit);
        }

        for (&address, &word) in image.words() {
            if !self.bus.poke_word(address, word) {
                self.reset();
                return Err(LoadError::SectionOutOfRange {
                    begin: address,
                    end: address.wrapping_add(3),
                });
            }
        }

        self.cpu.set_exit(image.exit());
        self.functions = image.functions().to_vec();
        self.profile = Profile::new(&self.functions);
        debug!(
            words = image.words().len(),
            functions = self.functions.len(),
            exit = ?image.exit(),
            "program loaded"
        );
        Ok(())
    }

    /// Returns CPU, memory, devices, counters and profile to the power-on state.
    ///
    /// Configuration, breakpoints and the loaded function table are kept.
    pub fn reset(&mut self) {
        self.cpu.reset();
        self.bus.reset();
        self.interrupt = false;
        self.profile.reset();
    }

    /// Runs one system cycle.
    pub fn cycle(&mut self) -> RunStatus {
        let status = self.cpu.cycle(&mut self.bus, self.interrupt);
        self.interrupt = self.bus.tick_devices();
        status
    }

    /// Runs `n` cycles or until a terminal status.
    pub fn run_cycles(&mut self, n: u64) -> RunStatus {
        for _ in 0..n {
            let status = self.cycle();
            if status.is_terminal() {
                return status;
            }
        }
        RunStatus::Normal
    }

    /// Runs until `n` more instructions have retired or a terminal status.
    pub fn run_instructions(&mut self, n: u64) -> RunStatus {
        let target = self.cpu.retired().saturating_add(n);
        while self.cpu.retired() < target {
            let status = self.cycle();
            if status.is_terminal() {
                return status;
            }
        }
        RunStatus::Normal
    }

    /// Runs until an instruction has retired and a real instruction fills the execute slot.
    ///
    /// Bubbles left behind by a taken branch are run through, so the execute slot never
    /// shows an empty instruction after a step that did not stop.
    pub fn step(&mut self) -> RunStatus {
        let retired = self.cpu.retired();
        loop {
            let status = self.cycle();
            if status.is_terminal() {
                return status;
            }
            if self.cpu.retired() != retired && !self.cpu.execute().is_empty() {
                return RunStatus::Normal;
            }
        }
    }

    /// Runs until an instruction at `address` reaches the execute slot or a terminal status.
    pub fn run_to(&mut self, address: u32) -> RunStatus {
        loop {
            let status = self.cycle();
            if status.is_terminal() {
                return status;
            }
            let execute = self.cpu.execute();
            if !execute.is_empty() && execute.pc == address {
                return RunStatus::Normal;
            }
        }
    }

    /// Runs until a terminal status.
    pub fn run(&mut self) -> RunStatus {
        loop {
            let status = self.cycle();
            if status.is_terminal() {
                return status;
            }
        }
    }

    /// Runs until a terminal status, profiling every cycle.
    pub fn run_profiled(&mut self) -> RunStatus {
        loop {
            let status = self.cycle_profiled();
            if status.is_terminal() {
                return status;
            }
        }
    }

    /// Runs `n` profiled cycles or until a terminal status.
    pub fn run_cycles_profiled(&mut self, n: u64) -> RunStatus {
        for _ in 0..n {
            let status = self.cycle_profiled();
            if status.is_terminal() {
                return status;
            }
        }
        RunStatus::Normal
    }

    fn cycle_profiled(&mut self) -> RunStatus {
        self.profile.record(self.cpu.execute(), self.cpu.serial());
        self.cycle()
    }

    /// Arms a breakpoint at `address`.
    pub fn set_breakpoint(&mut self, address: u32) {
        self.cpu.set_breakpoint(address);
    }

    /// Disarms the breakpoint at `address`. Returns `false` when none was set.
    pub fn clear_breakpoint(&mut self, address: u32) -> bool {
        self.cpu.clear_breakpoint(address)
    }

    /// Interrupt line the CPU will see next cycle.
    pub const fn interrupt(&self) -> bool {
        self.interrupt
    }

    /// Cycles since reset.
    pub const fn cycles(&self) -> u64 {
        self.cpu.stats.cycles
    }

    /// Performance counters.
    pub const fn stats(&self) -> &SimStats {
        &self.cpu.stats
    }

    /// Simulated time at the configured core clock.
    pub fn simulated_seconds(&self) -> f64 {
        self.cpu.stats.simulated_seconds(self.config.cpu.frequency_hz)
    }

    /// Profiling tables of the last profiled run.
    pub const fn profile(&self) -> &Profile {
        &self.profile
    }

    /// Function table of the loaded program.
    pub fn functions(&self) -> &[FunctionSymbol] {
        &self.functions
    }

    /// The configuration the simulator was built from.
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The processor.
    pub const fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Mutable processor, for seeding registers before a run.
    pub const fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    /// The bus and its devices.
    pub const fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Mutable bus, for poking memory or device state between cycles.
    pub const fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }
}
