//! Memory bus: routing, latency and alignment.
//!
//! This module implements the bus the processor's data port talks to. It provides:
//! 1. **Routing:** LMB first, then OPB, then device registers, else the generic mapped space.
//! 2. **Latency:** One in-flight access with its own countdown; the caller re-issues the
//!    identical request each cycle until it completes.
//! 3. **Alignment:** Halfwords need 2-byte and words 4-byte alignment; misaligned requests
//!    are refused before anything happens.
//! 4. **Devices:** The bus owns the OPB devices and ticks them in registration order.

use std::collections::HashMap;

use crate::common::constants::WORD_MASK;
use crate::common::error::BusError;
use crate::soc::memory::{
    MemoryMap, Region, SparseMemory, extract_byte, extract_halfword, insert_byte, insert_halfword,
};
use crate::soc::traits::OpbDevice;

/// Result of one data-port access attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BusResponse<T> {
    /// The access is still in flight; re-issue the identical request next cycle.
    Access,
    /// The access completed this call.
    Ready(T),
    /// The address is not aligned for the access width; nothing was done.
    Unaligned,
    /// The access fell into the unbacked mapped space; nothing was stored.
    Mapped,
}

impl<T> BusResponse<T> {
    /// Returns `true` for [`BusResponse::Ready`].
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// What the instruction port sees at an address.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Fetch {
    /// A word is available.
    Word(u32),
    /// The address is in a memory region but nothing was loaded there, or it is misaligned.
    Unpopulated,
    /// No region or device backs the address.
    Unmapped,
}

/// Access width.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Width {
    /// 8 bits.
    Byte,
    /// 16 bits.
    Half,
    /// 32 bits.
    Word,
}

impl Width {
    /// Width in bytes.
    pub const fn bytes(self) -> u32 {
        match self {
            Self::Byte => 1,
            Self::Half => 2,
            Self::Word => 4,
        }
    }

    /// Returns `true` when `address` is naturally aligned for this width.
    pub const fn is_aligned(self, address: u32) -> bool {
        address & (self.bytes() - 1) == 0
    }
}

/// Location of a device register: device index and register index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RegisterHandle {
    /// Index of the owning device in registration order.
    pub device: usize,
    /// Index of the register in the device's declared set.
    pub register: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Target {
    Memory(Region),
    Register(RegisterHandle),
    Mapped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Request {
    address: u32,
    width: Width,
    write: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Pending {
    request: Request,
    remaining: u32,
}

/// The system memory bus.
#[derive(Debug)]
pub struct Bus {
    map: MemoryMap,
    storage: SparseMemory,
    registers: HashMap<u32, RegisterHandle>,
    devices: Vec<Box<dyn OpbDevice>>,
    pending: Option<Pending>,
}

impl Bus {
    /// Creates a bus over `map` with empty memory and no devices.
    pub fn new(map: MemoryMap) -> Self {
        Self {
            map,
            storage: SparseMemory::new(),
            registers: HashMap::new(),
            devices: Vec::new(),
            pending: None,
        }
    }

    /// The configured memory map.
    pub const fn map(&self) -> &MemoryMap {
        &self.map
    }

    /// Registers a device and returns its index. Its registers are mapped separately.
    pub fn add_device(&mut self, device: Box<dyn OpbDevice>) -> usize {
        tracing::debug!(device = device.name(), "registered OPB device");
        self.devices.push(device);
        self.devices.len() - 1
    }

    /// Maps register `register` of device `device` at `address`.
    ///
    /// # Errors
    ///
    /// Fails when `device` or `register` names nothing, when `address` is not word aligned
    /// and when `address` is already taken by another register.
    pub fn map_register(&mut self, address: u32, device: usize, register: usize) -> Result<(), BusError> {
        let Some(owner) = self.devices.get(device) else {
            return Err(BusError::UnknownDevice(device));
        };
        if register >= owner.register_names().len() {
            return Err(BusError::RegisterOutOfRange { device, register });
        }
        if address & !WORD_MASK != 0 {
            return Err(BusError::UnalignedRegister(address));
        }
        if self.registers.contains_key(&address) {
            return Err(BusError::AddressInUse(address));
        }
        let _ = self.registers.insert(address, RegisterHandle { device, register });
        Ok(())
    }

    /// Returns the register mapped at `address`, if any.
    pub fn register_at(&self, address: u32) -> Option<RegisterHandle> {
        self.registers.get(&(address & WORD_MASK)).copied()
    }

    /// The registered devices in registration order.
    pub fn devices(&self) -> &[Box<dyn OpbDevice>] {
        &self.devices
    }

    /// A registered device.
    pub fn device(&self, index: usize) -> Option<&dyn OpbDevice> {
        self.devices.get(index).map(|device| &**device)
    }

    /// Mutable access to a registered device.
    pub fn device_mut(&mut self, index: usize) -> Option<&mut (dyn OpbDevice + 'static)> {
        self.devices.get_mut(index).map(|device| &mut **device)
    }

    /// Advances every device one cycle in registration order.
    ///
    /// Returns the OR of their interrupt lines. Every device is ticked even after one
    /// has raised its line.
    pub fn tick_devices(&mut self) -> bool {
        self.devices
            .iter_mut()
            .fold(false, |irq, device| device.cycle() | irq)
    }

    /// Drops any in-flight access, forgets stored memory and resets every device.
    pub fn reset(&mut self) {
        self.pending = None;
        self.storage.clear();
        for device in &mut self.devices {
            device.reset();
        }
    }

    fn route(&self, address: u32) -> Target {
        if let Some(region) = self.map.region(address) {
            return Target::Memory(*region);
        }
        match self.register_at(address) {
            Some(handle) => Target::Register(handle),
            None => Target::Mapped,
        }
    }

    fn latency(&self, target: Target, write: bool) -> u32 {
        match target {
            Target::Memory(region) => region.latency(write),
            Target::Register(handle) => {
                let device = &self.devices[handle.device];
                if write {
                    device.write_latency()
                } else {
                    device.read_latency()
                }
            }
            Target::Mapped => self.map.mapped_latency,
        }
    }

    /// Counts one issue of `request` against its latency. Returns `true` once it completes.
    fn wait(&mut self, request: Request, latency: u32) -> bool {
        let remaining = match self.pending {
            Some(pending) if pending.request == request => pending.remaining,
            _ => latency.max(1),
        } - 1;

        if remaining == 0 {
            self.pending = None;
            true
        } else {
            self.pending = Some(Pending { request, remaining });
            false
        }
    }

    /// Common front half of every access: alignment, routing and latency.
    fn arbitrate(&mut self, address: u32, width: Width, write: bool) -> BusResponse<Target> {
        if !width.is_aligned(address) {
            return BusResponse::Unaligned;
        }
        let target = self.route(address);
        let request = Request { address, width, write };
        let latency = self.latency(target, write);
        if !self.wait(request, latency) {
            return BusResponse::Access;
        }
        match target {
            Target::Mapped => {
                if write {
                    tracing::warn!(address = format_args!("{address:#010x}"), "write into mapped space dropped");
                }
                BusResponse::Mapped
            }
            target => BusResponse::Ready(target),
        }
    }

    fn read_target(&mut self, target: Target, address: u32) -> u32 {
        match target {
            Target::Memory(_) => self.storage.word(address).unwrap_or(0),
            Target::Register(handle) => self.devices[handle.device].get(handle.register),
            Target::Mapped => 0,
        }
    }

    fn write_target(&mut self, target: Target, address: u32, value: u32) {
        match target {
            Target::Memory(_) => self.storage.set_word(address, value),
            Target::Register(handle) => self.devices[handle.device].put(handle.register, value),
            Target::Mapped => {}
        }
    }

    fn read(&mut self, address: u32, width: Width) -> BusResponse<u32> {
        match self.arbitrate(address, width, false) {
            BusResponse::Ready(target) => BusResponse::Ready(self.read_target(target, address)),
            BusResponse::Access => BusResponse::Access,
            BusResponse::Unaligned => BusResponse::Unaligned,
            BusResponse::Mapped => BusResponse::Mapped,
        }
    }

    fn write(&mut self, address: u32, width: Width, value: u32) -> BusResponse<()> {
        let target = match self.arbitrate(address, width, true) {
            BusResponse::Ready(target) => target,
            BusResponse::Access => return BusResponse::Access,
            BusResponse::Unaligned => return BusResponse::Unaligned,
            BusResponse::Mapped => return BusResponse::Mapped,
        };

        let word = match width {
            Width::Word => value,
            Width::Half => {
                let old = self.merge_base(target, address);
                insert_halfword(old, address, value as u16)
            }
            Width::Byte => {
                let old = self.merge_base(target, address);
                insert_byte(old, address, value as u8)
            }
        };
        self.write_target(target, address, word);
        BusResponse::Ready(())
    }

    /// Current word a sub-word write merges into. Device registers merge into their
    /// committed value without triggering read side effects.
    fn merge_base(&self, target: Target, address: u32) -> u32 {
        match target {
            Target::Memory(_) => self.storage.word(address).unwrap_or(0),
            Target::Register(handle) => self.devices[handle.device].peek(handle.register),
            Target::Mapped => 0,
        }
    }

    /// Reads a word. Requires 4-byte alignment.
    pub fn read_word(&mut self, address: u32) -> BusResponse<u32> {
        self.read(address, Width::Word)
    }

    /// Reads a halfword, zero-extended. Requires 2-byte alignment.
    pub fn read_halfword(&mut self, address: u32) -> BusResponse<u16> {
        match self.read(address, Width::Half) {
            BusResponse::Ready(word) => BusResponse::Ready(extract_halfword(word, address)),
            BusResponse::Access => BusResponse::Access,
            BusResponse::Unaligned => BusResponse::Unaligned,
            BusResponse::Mapped => BusResponse::Mapped,
        }
    }

    /// Reads a byte.
    pub fn read_byte(&mut self, address: u32) -> BusResponse<u8> {
        match self.read(address, Width::Byte) {
            BusResponse::Ready(word) => BusResponse::Ready(extract_byte(word, address)),
            BusResponse::Access => BusResponse::Access,
            BusResponse::Unaligned => BusResponse::Unaligned,
            BusResponse::Mapped => BusResponse::Mapped,
        }
    }

    /// Writes a word. Requires 4-byte alignment.
    pub fn write_word(&mut self, address: u32, value: u32) -> BusResponse<()> {
        self.write(address, Width::Word, value)
    }

    /// Writes a halfword. Requires 2-byte alignment.
    pub fn write_halfword(&mut self, address: u32, value: u16) -> BusResponse<()> {
        self.write(address, Width::Half, u32::from(value))
    }

    /// Writes a byte.
    pub fn write_byte(&mut self, address: u32, value: u8) -> BusResponse<()> {
        self.write(address, Width::Byte, u32::from(value))
    }

    /// Instruction-port view of `pc`: zero latency, no side effects.
    pub fn fetch(&self, pc: u32) -> Fetch {
        if !Width::Word.is_aligned(pc) {
            return Fetch::Unpopulated;
        }
        match self.route(pc) {
            Target::Memory(_) => self.storage.word(pc).map_or(Fetch::Unpopulated, Fetch::Word),
            Target::Register(handle) => Fetch::Word(self.devices[handle.device].peek(handle.register)),
            Target::Mapped => Fetch::Unmapped,
        }
    }

    /// Reads the word containing `address` without latency or side effects.
    pub fn peek_word(&self, address: u32) -> Option<u32> {
        match self.route(address) {
            Target::Memory(_) => self.storage.word(address),
            Target::Register(handle) => Some(self.devices[handle.device].peek(handle.register)),
            Target::Mapped => None,
        }
    }

    /// Stores the word containing `address` directly into memory, bypassing latency.
    ///
    /// Only backed regions are written; returns `false` for any other address.
    pub fn poke_word(&mut self, address: u32, value: u32) -> bool {
        if self.map.region(address).is_some() {
            self.storage.set_word(address, value);
            true
        } else {
            false
        }
    }
}
