//! Instruction latency tables.
//!
//! Latencies are configured per mnemonic. Conditional branches carry two: `latency` for the
//! fall-through path and `cond_latency` for the taken path. Mnemonics missing from the
//! configuration take the default of one cycle on both paths.

use std::collections::BTreeMap;

use crate::config::CpuConfig;

/// Every mnemonic the decoder can produce.
pub const MNEMONICS: &[&str] = &[
    "add", "rsub", "addk", "rsubk", "addi", "rsubi", "addik", "rsubik", "or", "and", "xor",
    "andn", "ori", "andi", "xori", "andni", "pcmpbf", "pcmpeq", "pcmpne", "sra", "src", "srl",
    "sext8", "sext16", "msrset", "msrclr", "mfs", "mts", "br", "brd", "brld", "bra", "brad",
    "brald", "brk", "bri", "brid", "brlid", "brai", "braid", "bralid", "brki", "imm", "rtsd",
    "rtid", "rtbd", "rted", "lbu", "lhu", "lw", "sb", "sh", "sw", "lbui", "lhui", "lwi", "sbi",
    "shi", "swi",
];

/// Conditional branch mnemonics.
pub const CONDITIONAL: &[&str] = &[
    "beq", "bne", "blt", "ble", "bgt", "bge", "beqd", "bned", "bltd", "bled", "bgtd", "bged",
    "beqi", "bnei", "blti", "blei", "bgti", "bgei", "beqid", "bneid", "bltid", "bleid", "bgtid",
    "bgeid",
];

/// Returns `true` when `name` is an instruction of the processor.
pub fn is_known(name: &str) -> bool {
    MNEMONICS.contains(&name) || is_conditional(name)
}

/// Returns `true` when `name` is a conditional branch.
pub fn is_conditional(name: &str) -> bool {
    CONDITIONAL.contains(&name)
}

/// Resolved latency lookups for the decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LatencyTable {
    latencies: BTreeMap<String, u32>,
    cond_latencies: BTreeMap<String, u32>,
    default: u32,
}

impl LatencyTable {
    /// Builds the table from a validated processor configuration.
    pub fn from_config(config: &CpuConfig) -> Self {
        Self {
            latencies: config.latencies.clone(),
            cond_latencies: config.cond_latencies.clone(),
            default: CpuConfig::default_latency(),
        }
    }

    /// Fall-through latency of `name`.
    pub fn latency(&self, name: &str) -> u32 {
        self.latencies.get(name).copied().unwrap_or(self.default)
    }

    /// Taken-path latency of `name`.
    pub fn cond_latency(&self, name: &str) -> u32 {
        self.cond_latencies.get(name).copied().unwrap_or(self.default)
    }
}
