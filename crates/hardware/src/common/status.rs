//! Instruction and run status codes.
//!
//! Each instruction step reports an [`ExecStatus`]; the pipeline folds that into a
//! [`RunStatus`] for the orchestrator. Soft statuses keep the simulation going,
//! terminal ones end the current run-loop call.

use std::fmt;

/// Outcome of one `step` call on the instruction in the execute slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExecStatus {
    /// The effect was applied; fall through to the next instruction.
    Normal,
    /// The execute slot held a pipeline bubble.
    Empty,
    /// The program counter was redirected; fetched and decoded successors are discarded.
    Jump,
    /// The program counter was redirected; the decoded successor still executes.
    DelaySlot,
    /// The instruction latency has not elapsed yet.
    Stall,
    /// A multi-cycle memory access is in flight.
    MemAccess,
    /// The access hit the generic mapped region.
    MemMapped,
    /// The access address is not naturally aligned for its width.
    MemUnaligned,
    /// The instruction word does not decode.
    Illegal,
    /// The instruction was fetched from an address no region backs.
    InstructionBus,
    /// A breakpoint was armed on this instruction.
    Breakpoint,
    /// The program reached its exit function.
    Stop,
}

impl ExecStatus {
    /// Returns `true` for statuses that end a run-loop call when no exception handler takes them.
    pub const fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::MemUnaligned | Self::Illegal | Self::InstructionBus | Self::Breakpoint | Self::Stop
        )
    }
}

/// Outcome of one system cycle as seen by the run-control loops.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RunStatus {
    /// Simulation may continue.
    #[default]
    Normal,
    /// An unaligned data access reached the pipeline with exceptions disabled.
    MemUnaligned,
    /// An undecodable or unbacked instruction reached the pipeline with exceptions disabled.
    Illegal,
    /// An armed breakpoint was executed.
    Breakpoint,
    /// The program reached its exit function.
    Stop,
}

impl RunStatus {
    /// Returns `true` when the run loop must stop.
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Normal)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Normal => "normal",
            Self::MemUnaligned => "unaligned memory access",
            Self::Illegal => "illegal instruction",
            Self::Breakpoint => "breakpoint",
            Self::Stop => "stop",
        };
        f.write_str(text)
    }
}
