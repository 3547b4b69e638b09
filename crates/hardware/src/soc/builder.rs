//! System-on-Chip construction and top-level `System` type.
//!
//! This module builds the complete SoC from configuration. It performs:
//! 1. **Bus setup:** Creates the interconnect over the configured LMB, OPB and mapped latency.
//! 2. **Device registration:** Instantiates each configured OPB device through a closed factory.
//! 3. **Register mapping:** Binds every declared register of a device to its configured address.

use crate::config::{Config, DeviceConfig, DeviceKind};
use crate::common::error::ConfigResult;
use crate::soc::devices::{ByteSink, ByteSource, SharedBuffer, StdinSource, StdoutSink, TimerCounter, UartLite};
use crate::soc::interconnect::Bus;
use crate::soc::memory::MemoryMap;
use crate::soc::traits::OpbDevice;

/// Where UART Lite devices read and write their bytes.
#[derive(Debug, Clone, Default)]
pub enum Console {
    /// Host standard input and output.
    #[default]
    Standard,
    /// In-memory queues shared with the caller.
    Buffered {
        /// Bytes the program will receive.
        input: SharedBuffer,
        /// Bytes the program has transmitted.
        output: SharedBuffer,
    },
}

impl Console {
    /// Creates a buffered console and returns it together with handles on its queues.
    pub fn buffered() -> (Self, SharedBuffer, SharedBuffer) {
        let input = SharedBuffer::new();
        let output = SharedBuffer::new();
        let console = Self::Buffered {
            input: input.clone(),
            output: output.clone(),
        };
        (console, input, output)
    }

    /// Byte source and sink for one UART.
    pub fn endpoints(&self) -> (Box<dyn ByteSource>, Box<dyn ByteSink>) {
        match self {
            Self::Standard => (Box::new(StdinSource), Box::new(StdoutSink)),
            Self::Buffered { input, output } => (Box::new(input.clone()), Box::new(output.clone())),
        }
    }
}

/// Top-level system instance: the bus together with the devices it owns.
#[derive(Debug)]
pub struct System {
    /// System interconnect; routes accesses to memory and device registers.
    pub bus: Bus,
}

impl System {
    /// Builds a new system from configuration.
    ///
    /// # Arguments
    ///
    /// * `config` - Simulator configuration (memory map, devices).
    /// * `console` - Byte endpoints handed to every UART Lite.
    ///
    /// # Returns
    ///
    /// A fully constructed `System` ready for a program to be loaded.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure, or a bus error if two registers share an
    /// address or a register address is not word aligned.
    pub fn new(config: &Config, console: &Console) -> ConfigResult<Self> {
        config.validate()?;

        let mut bus = Bus::new(MemoryMap::from_config(&config.memory));
        for (index, device_config) in config.devices.iter().enumerate() {
            let device = instantiate(device_config, index, console);
            let names = device.register_names();
            let device_index = bus.add_device(device);

            for binding in &device_config.registers {
                let Some(register) = names.iter().position(|name| *name == binding.name) else {
                    continue;
                };
                bus.map_register(binding.address, device_index, register)?;
                tracing::debug!(
                    register = %binding.name,
                    address = format_args!("{:#010x}", binding.address),
                    "mapped device register"
                );
            }
        }

        Ok(Self { bus })
    }
}

/// Device factory over the closed set of variants.
fn instantiate(config: &DeviceConfig, index: usize, console: &Console) -> Box<dyn OpbDevice> {
    let name = config.instance_name(index);
    match config.kind {
        DeviceKind::TimerCounter => Box::new(TimerCounter::new(name, config.read_latency, config.write_latency)),
        DeviceKind::UartLite => {
            let (source, sink) = console.endpoints();
            Box::new(UartLite::new(name, config.read_latency, config.write_latency, source, sink))
        }
    }
}
