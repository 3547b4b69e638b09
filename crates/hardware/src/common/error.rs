//! Configuration, wiring and load error definitions.
//!
//! Run-time outcomes of the simulated program are never errors; they are reported as
//! [`RunStatus`](super::status::RunStatus) values. The types here cover the two phases that
//! happen before a run may begin. It provides:
//! 1. **Configuration Errors:** Invalid latencies, unknown names, bad device wiring.
//! 2. **Bus Errors:** Conflicts while mapping device registers into the address space.
//! 3. **Load Errors:** Program images that do not fit the configured memory regions.

use thiserror::Error;

use crate::config::DeviceKind;

/// Errors raised while mapping device registers onto the bus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// Another register already occupies this word address.
    #[error("address {0:#010x} is already in use")]
    AddressInUse(u32),

    /// Device registers must sit on word boundaries.
    #[error("register address {0:#010x} is not word aligned")]
    UnalignedRegister(u32),

    /// No device was registered under this index.
    #[error("no device with index {0}")]
    UnknownDevice(usize),

    /// The device declares fewer registers than the index implies.
    #[error("device {device} has no register {register}")]
    RegisterOutOfRange {
        /// Device index.
        device: usize,
        /// Register index within the device.
        register: usize,
    },
}

/// Errors raised while validating a [`Config`](crate::config::Config) or building a system from it.
///
/// Every variant is fatal: no simulation proceeds once one is returned.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration text is not valid JSON for the configuration schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// A region whose end lies below its begin.
    #[error("{region} range {begin:#010x}..={end:#010x} is empty")]
    EmptyRegion {
        /// Region name (`"LMB"` or `"OPB"`).
        region: &'static str,
        /// Configured first address.
        begin: u32,
        /// Configured last address.
        end: u32,
    },

    /// The LMB and OPB ranges share addresses.
    #[error("OPB range overlaps the LMB range")]
    OverlappingRegions,

    /// A latency configured as zero cycles.
    #[error("{what} latency must be at least one cycle")]
    ZeroLatency {
        /// What the latency belongs to.
        what: String,
    },

    /// An instruction name the processor does not implement.
    #[error("the instruction `{0}` is not part of the processor")]
    UnknownInstruction(String),

    /// A conditional latency given for an instruction that never branches conditionally.
    #[error("the instruction `{0}` is not a conditional branch")]
    NotConditional(String),

    /// A conditional branch whose conditional latency is zero.
    #[error("the conditional branch `{0}` needs a conditional latency above zero")]
    ZeroConditionalLatency(String),

    /// The number of configured registers differs from the device's declared set.
    #[error("device {index} ({kind:?}) declares {expected} registers, {found} configured")]
    RegisterCount {
        /// Position of the device in the configuration.
        index: usize,
        /// Device variant.
        kind: DeviceKind,
        /// Number of registers the device implements.
        expected: usize,
        /// Number of registers in the configuration.
        found: usize,
    },

    /// A register name the device does not implement.
    #[error("the register `{name}` is not part of device {index} ({kind:?})")]
    UnknownRegister {
        /// Position of the device in the configuration.
        index: usize,
        /// Device variant.
        kind: DeviceKind,
        /// Offending register name.
        name: String,
    },

    /// The same register name mapped twice for one device.
    #[error("the register `{name}` of device {index} ({kind:?}) is mapped twice")]
    DuplicateRegister {
        /// Position of the device in the configuration.
        index: usize,
        /// Device variant.
        kind: DeviceKind,
        /// Offending register name.
        name: String,
    },

    /// Register mapping failed on the bus.
    #[error(transparent)]
    Bus(#[from] BusError),
}

/// Errors raised while loading a program image.
///
/// The simulator is left in its reset state whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// A section lies outside every configured memory region.
    #[error("section {begin:#010x}..={end:#010x} lies outside the LMB and OPB regions")]
    SectionOutOfRange {
        /// First byte of the section.
        begin: u32,
        /// Last byte of the section.
        end: u32,
    },

    /// The program has no exit function but one was required.
    #[error("the program has no `exit` function")]
    MissingExit,

    /// The ELF header names a different processor.
    #[error("the ELF file targets machine {found:#x}, the system expects {expected:#x}")]
    MachineMismatch {
        /// Machine id the configuration expects.
        expected: u16,
        /// Machine id found in the file.
        found: u16,
    },

    /// The ELF file could not be parsed.
    #[error("malformed ELF image: {0}")]
    Elf(String),
}

/// Result alias for configuration and construction.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Result alias for program loading.
pub type LoadResult<T> = Result<T, LoadError>;
