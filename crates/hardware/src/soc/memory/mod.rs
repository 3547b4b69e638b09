//! Memory regions and sparse word storage.
//!
//! This module provides the pieces the bus routes between:
//! 1. **Regions:** Address ranges with their own read and write latency (LMB, OPB).
//! 2. **Memory Map:** The configured regions plus the latency of the unbacked "mapped" space.
//! 3. **Storage:** A sparse, big-endian word store shared by every backed region.

use std::collections::HashMap;

use crate::common::constants::WORD_MASK;
use crate::config::{MemoryConfig, RegionConfig};

/// An inclusive address range with access latencies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// First byte address.
    pub begin: u32,
    /// Last byte address (inclusive).
    pub end: u32,
    /// Cycles per read.
    pub read_latency: u32,
    /// Cycles per write.
    pub write_latency: u32,
}

impl Region {
    /// Returns `true` when `address` lies in the region.
    #[inline]
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.begin && address <= self.end
    }

    /// Returns `true` when the whole inclusive range `begin..=end` lies in the region.
    pub const fn covers(&self, begin: u32, end: u32) -> bool {
        begin >= self.begin && end <= self.end
    }

    /// Latency for a read (`write == false`) or a write.
    pub const fn latency(&self, write: bool) -> u32 {
        if write {
            self.write_latency
        } else {
            self.read_latency
        }
    }
}

impl From<RegionConfig> for Region {
    fn from(config: RegionConfig) -> Self {
        Self {
            begin: config.begin,
            end: config.end,
            read_latency: config.read_latency,
            write_latency: config.write_latency,
        }
    }
}

/// The configured memory regions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemoryMap {
    /// Local memory bus region.
    pub lmb: Region,
    /// Optional OPB memory region.
    pub opb: Option<Region>,
    /// Latency of accesses outside every region and device register.
    pub mapped_latency: u32,
}

impl MemoryMap {
    /// Builds the map from validated configuration.
    pub fn from_config(config: &MemoryConfig) -> Self {
        Self {
            lmb: config.lmb.into(),
            opb: config.opb.map(Region::from),
            mapped_latency: config.mapped_latency,
        }
    }

    /// Returns the region backing `address`; the LMB wins over the OPB.
    pub fn region(&self, address: u32) -> Option<&Region> {
        if self.lmb.contains(address) {
            Some(&self.lmb)
        } else {
            self.opb.as_ref().filter(|opb| opb.contains(address))
        }
    }

    /// Returns `true` when `begin..=end` lies inside the LMB, inside the OPB, or inside
    /// their union when the two regions are adjacent.
    pub fn covers(&self, begin: u32, end: u32) -> bool {
        if self.lmb.covers(begin, end) {
            return true;
        }
        let Some(opb) = self.opb else {
            return false;
        };
        if opb.covers(begin, end) {
            return true;
        }

        let (low, high) = if self.lmb.begin < opb.begin {
            (self.lmb, opb)
        } else {
            (opb, self.lmb)
        };
        low.end.checked_add(1) == Some(high.begin) && begin >= low.begin && end <= high.end
    }
}

/// Sparse big-endian word storage.
///
/// Byte 0 of a word is its most significant byte; the halfword at offset 0 is the upper
/// sixteen bits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SparseMemory {
    words: HashMap<u32, u32>,
}

impl SparseMemory {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the word containing `address`, or `None` if it was never written.
    #[inline]
    pub fn word(&self, address: u32) -> Option<u32> {
        self.words.get(&(address & WORD_MASK)).copied()
    }

    /// Stores the word containing `address`.
    #[inline]
    pub fn set_word(&mut self, address: u32, value: u32) {
        let _ = self.words.insert(address & WORD_MASK, value);
    }

    /// Forgets every stored word.
    pub fn clear(&mut self) {
        self.words.clear();
    }
}

#[inline]
const fn halfword_shift(address: u32) -> u32 {
    16 - (address & 0x2) * 8
}

#[inline]
const fn byte_shift(address: u32) -> u32 {
    (3 - (address & 0x3)) * 8
}

/// Extracts the big-endian halfword lane addressed by `address` from `word`.
pub const fn extract_halfword(word: u32, address: u32) -> u16 {
    (word >> halfword_shift(address)) as u16
}

/// Replaces the big-endian halfword lane addressed by `address` in `word`.
pub const fn insert_halfword(word: u32, address: u32, value: u16) -> u32 {
    let shift = halfword_shift(address);
    (word & !(0xFFFF << shift)) | ((value as u32) << shift)
}

/// Extracts the big-endian byte lane addressed by `address` from `word`.
pub const fn extract_byte(word: u32, address: u32) -> u8 {
    (word >> byte_shift(address)) as u8
}

/// Replaces the big-endian byte lane addressed by `address` in `word`.
pub const fn insert_byte(word: u32, address: u32, value: u8) -> u32 {
    let shift = byte_shift(address);
    (word & !(0xFF << shift)) | ((value as u32) << shift)
}
