//! Per-function execution profile.
//!
//! The profiler samples the execute slot once per cycle and attributes the cycle to the
//! function whose range contains its address. Bubbles are charged to the function that was
//! executing last. Moving into a different function counts as an entry, and an entry at the
//! function's first address also counts as a call. Returning into the middle of a caller is
//! an entry but not a call.

use std::collections::BTreeMap;

use crate::isa::Instruction;
use crate::sim::loader::FunctionSymbol;

/// Counters of one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionProfile {
    /// The function range.
    pub symbol: FunctionSymbol,
    /// Entries at the function's first address.
    pub calls: u64,
    /// Entries from elsewhere at any address, calls included.
    pub entries: u64,
    /// Cycles charged to the function.
    pub cycles: u64,
    /// Instructions that entered the execute slot inside the function.
    pub retired: u64,
    /// Instruction counts by mnemonic.
    pub histogram: BTreeMap<&'static str, u64>,
}

impl FunctionProfile {
    fn new(symbol: FunctionSymbol) -> Self {
        Self {
            symbol,
            calls: 0,
            entries: 0,
            cycles: 0,
            retired: 0,
            histogram: BTreeMap::new(),
        }
    }

    fn clear(&mut self) {
        self.calls = 0;
        self.entries = 0;
        self.cycles = 0;
        self.retired = 0;
        self.histogram.clear();
    }
}

/// Profiling tables over a fixed function list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Profile {
    functions: Vec<FunctionProfile>,
    current: Option<usize>,
    last_serial: Option<u64>,
}

impl Profile {
    /// Creates empty tables for `functions`.
    pub fn new(functions: &[FunctionSymbol]) -> Self {
        Self {
            functions: functions.iter().cloned().map(FunctionProfile::new).collect(),
            current: None,
            last_serial: None,
        }
    }

    /// Zeroes every counter, keeping the function list.
    pub fn reset(&mut self) {
        for function in &mut self.functions {
            function.clear();
        }
        self.current = None;
        self.last_serial = None;
    }

    /// Attributes one cycle.
    ///
    /// # Arguments
    ///
    /// * `execute` - The instruction in the execute slot at the start of the cycle.
    /// * `serial` - Its pipeline serial number.
    pub fn record(&mut self, execute: &Instruction, serial: u64) {
        if !execute.is_empty() {
            let index = self.functions.iter().position(|f| f.symbol.contains(execute.pc));
            if index != self.current {
                if let Some(entered) = index.and_then(|i| self.functions.get_mut(i)) {
                    entered.entries += 1;
                    if execute.pc == entered.symbol.begin {
                        entered.calls += 1;
                    }
                }
                self.current = index;
            }
        }

        let fresh = self.last_serial != Some(serial);
        self.last_serial = Some(serial);

        let Some(function) = self.current.and_then(|i| self.functions.get_mut(i)) else {
            return;
        };
        function.cycles += 1;
        if fresh && !execute.is_empty() {
            function.retired += 1;
            *function.histogram.entry(execute.name()).or_default() += 1;
        }
    }

    /// All function tables in symbol order.
    pub fn functions(&self) -> &[FunctionProfile] {
        &self.functions
    }

    /// The table of the function named `name`.
    pub fn function(&self, name: &str) -> Option<&FunctionProfile> {
        self.functions.iter().find(|f| f.symbol.name == name)
    }
}
