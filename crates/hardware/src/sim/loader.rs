//! Program Images and ELF Loading.
//!
//! This module describes a program ready to be placed in simulated memory. It provides:
//! 1. **Program Image:** A sparse word map, the sections it spans, the function symbol table
//!    and the optional exit address.
//! 2. **Synthetic Images:** Builder methods for assembling small programs word by word.
//! 3. **ELF Front-End:** Reading loadable segments and text symbols from 32-bit ELF files.

use std::collections::BTreeMap;

use object::read::elf::{ElfFile32, FileHeader};
use object::{Endianness, Object, ObjectSegment, ObjectSymbol, SymbolKind};

use crate::common::constants::INSTRUCTION_SIZE;
use crate::common::error::{LoadError, LoadResult};

/// Name of the symbol whose address stops the simulation.
pub const EXIT_SYMBOL: &str = "exit";

/// A named function address range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionSymbol {
    /// Symbol name.
    pub name: String,
    /// First byte of the function.
    pub begin: u32,
    /// Last byte of the function.
    pub end: u32,
}

impl FunctionSymbol {
    /// Creates a symbol spanning `begin..=end`.
    pub fn new(name: impl Into<String>, begin: u32, end: u32) -> Self {
        Self {
            name: name.into(),
            begin,
            end,
        }
    }

    /// Returns `true` when `address` lies inside the function.
    pub const fn contains(&self, address: u32) -> bool {
        address >= self.begin && address <= self.end
    }
}

/// An inclusive byte range the image occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Section {
    /// First byte.
    pub begin: u32,
    /// Last byte.
    pub end: u32,
}

/// A program ready to be loaded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProgramImage {
    words: BTreeMap<u32, u32>,
    sections: Vec<Section>,
    functions: Vec<FunctionSymbol>,
    exit: Option<u32>,
}

impl ProgramImage {
    /// Creates an empty image.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one word at a word-aligned `address`.
    ///
    /// The address is rounded down to a word boundary. No section is added.
    #[must_use]
    pub fn with_word(mut self, address: u32, word: u32) -> Self {
        let _ = self.words.insert(address & !(INSTRUCTION_SIZE - 1), word);
        self
    }

    /// Adds consecutive words starting at `base` together with the section they span.
    #[must_use]
    pub fn with_words(mut self, base: u32, words: &[u32]) -> Self {
        let mut address = base;
        for &word in words {
            self = self.with_word(address, word);
            address = address.wrapping_add(INSTRUCTION_SIZE);
        }
        if !words.is_empty() {
            let bytes = words.len() as u32 * INSTRUCTION_SIZE;
            self = self.with_section(base, base.wrapping_add(bytes - 1));
        }
        self
    }

    /// Declares a section spanning `begin..=end`.
    #[must_use]
    pub fn with_section(mut self, begin: u32, end: u32) -> Self {
        self.sections.push(Section { begin, end });
        self
    }

    /// Adds a function symbol. A function named `exit` also sets the exit address.
    #[must_use]
    pub fn with_function(mut self, name: &str, begin: u32, end: u32) -> Self {
        if name == EXIT_SYMBOL {
            self.exit = Some(begin);
        }
        self.functions.push(FunctionSymbol::new(name, begin, end));
        self
    }

    /// Sets the exit address without a symbol.
    #[must_use]
    pub const fn with_exit(mut self, address: u32) -> Self {
        self.exit = Some(address);
        self
    }

    /// Word contents by address.
    pub const fn words(&self) -> &BTreeMap<u32, u32> {
        &self.words
    }

    /// Sections the image occupies.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Function symbols in declaration order.
    pub fn functions(&self) -> &[FunctionSymbol] {
        &self.functions
    }

    /// Exit address, if the program has one.
    pub const fn exit(&self) -> Option<u32> {
        self.exit
    }

    /// Reads a 32-bit ELF file.
    ///
    /// # Arguments
    ///
    /// * `bytes` - The whole file.
    /// * `machine` - Expected `e_machine`, or 0 to accept any processor.
    ///
    /// # Returns
    ///
    /// An image holding every loadable segment (zero-filled past the file contents), every
    /// text symbol as a function and the `exit` symbol as the exit address.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Elf` for files `object` cannot parse and
    /// `LoadError::MachineMismatch` when the processor differs.
    pub fn from_elf(bytes: &[u8], machine: u16) -> LoadResult<Self> {
        let file = ElfFile32::<Endianness>::parse(bytes).map_err(|e| LoadError::Elf(e.to_string()))?;

        let found = file.elf_header().e_machine(file.endian());
        if machine != 0 && found != machine {
            return Err(LoadError::MachineMismatch {
                expected: machine,
                found,
            });
        }

        let little = file.is_little_endian();
        let mut image = Self::new();

        for segment in file.segments() {
            let size = segment.size();
            if size == 0 {
                continue;
            }
            let begin = segment.address() as u32;
            let data = segment.data().map_err(|e| LoadError::Elf(e.to_string()))?;

            let mut offset = 0u64;
            while offset < size {
                let mut chunk = [0u8; 4];
                let start = offset as usize;
                if start < data.len() {
                    let end = (start + 4).min(data.len());
                    chunk[..end - start].copy_from_slice(&data[start..end]);
                }
                let word = if little {
                    u32::from_le_bytes(chunk)
                } else {
                    u32::from_be_bytes(chunk)
                };
                image = image.with_word(begin.wrapping_add(offset as u32), word);
                offset += u64::from(INSTRUCTION_SIZE);
            }
            image = image.with_section(begin, begin.wrapping_add(size as u32 - 1));
        }

        for symbol in file.symbols() {
            if symbol.kind() != SymbolKind::Text {
                continue;
            }
            let Ok(name) = symbol.name() else {
                continue;
            };
            if name.is_empty() {
                continue;
            }
            let begin = symbol.address() as u32;
            let end = begin.wrapping_add((symbol.size() as u32).max(1) - 1);
            image = image.with_function(name, begin, end);
        }

        tracing::debug!(
            words = image.words.len(),
            sections = image.sections.len(),
            functions = image.functions.len(),
            exit = ?image.exit,
            "read ELF image"
        );
        Ok(image)
    }
}
