//! Configuration system for the simulator.
//!
//! This module defines the configuration structures used to build a system. It provides:
//! 1. **Defaults:** Baseline memory map, latencies and processor identification.
//! 2. **Structures:** Hierarchical config for memory regions, the processor and OPB devices.
//! 3. **Validation:** Checks run before any component is constructed.
//!
//! Configuration is supplied as JSON (`Config::from_json`) or built in code from
//! `Config::default()`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::common::constants::PVR_COUNT;
use crate::common::error::{ConfigError, ConfigResult};
use crate::isa::latency;
use crate::soc::devices::{TimerCounter, UartLite};

/// Default configuration constants for the simulator.
mod defaults {
    /// First address of the local memory bus region.
    pub const LMB_BEGIN: u32 = 0x0000_0000;

    /// Last address of the local memory bus region (64 KiB of block RAM).
    pub const LMB_END: u32 = 0x0000_FFFF;

    /// LMB block RAM answers in a single cycle.
    pub const LMB_LATENCY: u32 = 1;

    /// Default OPB memory latency in cycles.
    pub const OPB_LATENCY: u32 = 3;

    /// Cycles spent on an access that falls outside every region.
    pub const MAPPED_LATENCY: u32 = 1;

    /// Latency of an instruction absent from the latency table.
    pub const INSTRUCTION_LATENCY: u32 = 1;

    /// Default OPB device register latency in cycles.
    pub const DEVICE_LATENCY: u32 = 2;

    /// ELF machine id of the processor (`EM_MICROBLAZE`).
    pub const ELF_MACHINE: u16 = 0xBD;

    /// Core clock used to turn cycle counts into simulated time (100 MHz).
    pub const FREQUENCY_HZ: u64 = 100_000_000;
}

/// Closed set of OPB device variants the system can instantiate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DeviceKind {
    /// Dual 32-bit timer/counter (`opb_timer`).
    #[default]
    TimerCounter,
    /// Byte-stream serial port (`opb_uartlite`).
    UartLite,
}

impl DeviceKind {
    /// Register names the device implements, in declaration order.
    pub const fn register_names(self) -> &'static [&'static str] {
        match self {
            Self::TimerCounter => TimerCounter::REGISTERS,
            Self::UartLite => UartLite::REGISTERS,
        }
    }

    /// Short lowercase name used when a device is not given one explicitly.
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::TimerCounter => "opb_timer",
            Self::UartLite => "opb_uartlite",
        }
    }
}

/// A contiguous memory region with its access latencies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RegionConfig {
    /// First byte address of the region.
    pub begin: u32,
    /// Last byte address of the region (inclusive).
    pub end: u32,
    /// Cycles needed to complete a read.
    #[serde(default = "RegionConfig::default_latency")]
    pub read_latency: u32,
    /// Cycles needed to complete a write.
    #[serde(default = "RegionConfig::default_latency")]
    pub write_latency: u32,
}

impl RegionConfig {
    const fn default_latency() -> u32 {
        defaults::LMB_LATENCY
    }

    /// Returns `true` when the two inclusive ranges share an address.
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.begin <= other.end && other.begin <= self.end
    }

    fn validate(&self, region: &'static str) -> ConfigResult<()> {
        if self.end < self.begin {
            return Err(ConfigError::EmptyRegion {
                region,
                begin: self.begin,
                end: self.end,
            });
        }
        check_latency(self.read_latency, || format!("{region} read"))?;
        check_latency(self.write_latency, || format!("{region} write"))
    }
}

/// Memory map configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemoryConfig {
    /// Local memory bus region (fast block RAM).
    #[serde(default = "MemoryConfig::default_lmb")]
    pub lmb: RegionConfig,
    /// Optional on-chip peripheral bus memory region.
    #[serde(default)]
    pub opb: Option<RegionConfig>,
    /// Latency of accesses that fall outside every region and device.
    #[serde(default = "MemoryConfig::default_mapped_latency")]
    pub mapped_latency: u32,
}

impl MemoryConfig {
    const fn default_lmb() -> RegionConfig {
        RegionConfig {
            begin: defaults::LMB_BEGIN,
            end: defaults::LMB_END,
            read_latency: defaults::LMB_LATENCY,
            write_latency: defaults::LMB_LATENCY,
        }
    }

    const fn default_mapped_latency() -> u32 {
        defaults::MAPPED_LATENCY
    }

    /// Convenience constructor for an OPB memory region with the default OPB latency.
    pub const fn opb_region(begin: u32, end: u32) -> RegionConfig {
        RegionConfig {
            begin,
            end,
            read_latency: defaults::OPB_LATENCY,
            write_latency: defaults::OPB_LATENCY,
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            lmb: Self::default_lmb(),
            opb: None,
            mapped_latency: defaults::MAPPED_LATENCY,
        }
    }
}

/// Processor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CpuConfig {
    /// Per-instruction latency in cycles, keyed by mnemonic. Missing entries take one cycle.
    #[serde(default)]
    pub latencies: BTreeMap<String, u32>,
    /// Taken-path latency of conditional branches, keyed by mnemonic.
    #[serde(default)]
    pub cond_latencies: BTreeMap<String, u32>,
    /// Processor version register contents.
    #[serde(default)]
    pub pvr: [u32; PVR_COUNT],
    /// ELF machine id programs must carry; zero disables the check.
    #[serde(default = "CpuConfig::default_elf_machine")]
    pub elf_machine: u16,
    /// Core clock frequency, used to report simulated time.
    #[serde(default = "CpuConfig::default_frequency")]
    pub frequency_hz: u64,
}

impl CpuConfig {
    const fn default_elf_machine() -> u16 {
        defaults::ELF_MACHINE
    }

    const fn default_frequency() -> u64 {
        defaults::FREQUENCY_HZ
    }

    /// Latency of an instruction that has no table entry.
    pub const fn default_latency() -> u32 {
        defaults::INSTRUCTION_LATENCY
    }
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self {
            latencies: BTreeMap::new(),
            cond_latencies: BTreeMap::new(),
            pvr: [0; PVR_COUNT],
            elf_machine: defaults::ELF_MACHINE,
            frequency_hz: defaults::FREQUENCY_HZ,
        }
    }
}

/// One register of a device mapped at a bus address.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterBinding {
    /// Register name as declared by the device.
    pub name: String,
    /// Word address the register answers at.
    pub address: u32,
}

impl RegisterBinding {
    /// Creates a binding.
    pub fn new(name: impl Into<String>, address: u32) -> Self {
        Self {
            name: name.into(),
            address,
        }
    }
}

/// OPB device configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DeviceConfig {
    /// Device variant.
    pub kind: DeviceKind,
    /// Instance name; defaults to the variant name followed by its index.
    #[serde(default)]
    pub name: Option<String>,
    /// Register name to address bindings; must cover the device's declared set exactly.
    pub registers: Vec<RegisterBinding>,
    /// Cycles needed to read any register of the device.
    #[serde(default = "DeviceConfig::default_latency")]
    pub read_latency: u32,
    /// Cycles needed to write any register of the device.
    #[serde(default = "DeviceConfig::default_latency")]
    pub write_latency: u32,
}

impl DeviceConfig {
    const fn default_latency() -> u32 {
        defaults::DEVICE_LATENCY
    }

    /// Builds a configuration mapping every declared register of `kind` on consecutive
    /// words starting at `base`.
    pub fn contiguous(kind: DeviceKind, base: u32) -> Self {
        let registers = kind
            .register_names()
            .iter()
            .zip((base..).step_by(4))
            .map(|(name, address)| RegisterBinding::new(*name, address))
            .collect();
        Self {
            kind,
            name: None,
            registers,
            read_latency: defaults::DEVICE_LATENCY,
            write_latency: defaults::DEVICE_LATENCY,
        }
    }

    /// Instance name, falling back to `<variant>_<index>`.
    pub fn instance_name(&self, index: usize) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("{}_{index}", self.kind.default_name()))
    }

    fn validate(&self, index: usize) -> ConfigResult<()> {
        let declared = self.kind.register_names();
        if declared.len() != self.registers.len() {
            return Err(ConfigError::RegisterCount {
                index,
                kind: self.kind,
                expected: declared.len(),
                found: self.registers.len(),
            });
        }

        let mut seen = BTreeSet::new();
        for binding in &self.registers {
            if !declared.contains(&binding.name.as_str()) {
                return Err(ConfigError::UnknownRegister {
                    index,
                    kind: self.kind,
                    name: binding.name.clone(),
                });
            }
            if !seen.insert(binding.name.as_str()) {
                return Err(ConfigError::DuplicateRegister {
                    index,
                    kind: self.kind,
                    name: binding.name.clone(),
                });
            }
        }

        check_latency(self.read_latency, || format!("device {index} read"))?;
        check_latency(self.write_latency, || format!("device {index} write"))
    }
}

/// Root configuration structure containing all simulator settings.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use opbsim_core::config::Config;
///
/// let config = Config::default();
/// assert_eq!(config.memory.lmb.end, 0xFFFF);
/// assert!(config.devices.is_empty());
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use opbsim_core::config::{Config, DeviceKind};
///
/// let json = r#"{
///     "memory": {
///         "lmb": { "begin": 0, "end": 32767, "read_latency": 1, "write_latency": 1 },
///         "opb": { "begin": 32768, "end": 65535, "read_latency": 3, "write_latency": 2 },
///         "mapped_latency": 4
///     },
///     "cpu": {
///         "latencies": { "addik": 1, "lhu": 2, "beqi": 1 },
///         "cond_latencies": { "beqi": 3 }
///     },
///     "devices": [
///         {
///             "kind": "UartLite",
///             "registers": [
///                 { "name": "rx", "address": 1073741824 },
///                 { "name": "tx", "address": 1073741828 },
///                 { "name": "status", "address": 1073741832 },
///                 { "name": "control", "address": 1073741836 }
///             ]
///         }
///     ]
/// }"#;
///
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.cpu.cond_latencies["beqi"], 3);
/// assert_eq!(config.devices[0].kind, DeviceKind::UartLite);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Memory regions and their latencies.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Processor latencies and identification.
    #[serde(default)]
    pub cpu: CpuConfig,
    /// OPB devices in registration order.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

impl Config {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON or unknown device variants, and any
    /// validation error from [`Config::validate`].
    pub fn from_json(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the configuration for errors that would make construction fail.
    ///
    /// # Errors
    ///
    /// Returns the first problem found: an empty or overlapping region, a zero latency,
    /// an unknown instruction or register name, a misplaced conditional latency, or a
    /// register count that does not match the device.
    pub fn validate(&self) -> ConfigResult<()> {
        self.memory.lmb.validate("LMB")?;
        if let Some(opb) = &self.memory.opb {
            opb.validate("OPB")?;
            if opb.overlaps(&self.memory.lmb) {
                return Err(ConfigError::OverlappingRegions);
            }
        }
        check_latency(self.memory.mapped_latency, || "mapped".to_owned())?;

        for (name, cycles) in &self.cpu.latencies {
            if !latency::is_known(name) {
                return Err(ConfigError::UnknownInstruction(name.clone()));
            }
            check_latency(*cycles, || format!("instruction `{name}`"))?;
        }
        for (name, cycles) in &self.cpu.cond_latencies {
            if !latency::is_known(name) {
                return Err(ConfigError::UnknownInstruction(name.clone()));
            }
            if !latency::is_conditional(name) {
                return Err(ConfigError::NotConditional(name.clone()));
            }
            if *cycles == 0 {
                return Err(ConfigError::ZeroConditionalLatency(name.clone()));
            }
        }

        for (index, device) in self.devices.iter().enumerate() {
            device.validate(index)?;
        }
        Ok(())
    }
}

fn check_latency(cycles: u32, what: impl FnOnce() -> String) -> ConfigResult<()> {
    if cycles == 0 {
        Err(ConfigError::ZeroLatency { what: what() })
    } else {
        Ok(())
    }
}
