//! Load/Store Unit (LSU).
//!
//! Issues data-port accesses of a given width and widens or narrows the data. Loads are
//! zero-extended; stores write the low `width` bits of the source register.

use crate::soc::interconnect::{Bus, BusResponse, Width};

/// Load/Store Unit (LSU) for memory operations.
pub struct Lsu;

impl Lsu {
    /// Issues a load of `width` at `address`.
    pub fn load(bus: &mut Bus, address: u32, width: Width) -> BusResponse<u32> {
        match width {
            Width::Byte => widen(bus.read_byte(address)),
            Width::Half => widen(bus.read_halfword(address)),
            Width::Word => bus.read_word(address),
        }
    }

    /// Issues a store of the low `width` bits of `value` at `address`.
    pub fn store(bus: &mut Bus, address: u32, width: Width, value: u32) -> BusResponse<()> {
        match width {
            Width::Byte => bus.write_byte(address, value as u8),
            Width::Half => bus.write_halfword(address, value as u16),
            Width::Word => bus.write_word(address, value),
        }
    }
}

fn widen<T: Into<u32>>(response: BusResponse<T>) -> BusResponse<u32> {
    match response {
        BusResponse::Ready(value) => BusResponse::Ready(value.into()),
        BusResponse::Access => BusResponse::Access,
        BusResponse::Unaligned => BusResponse::Unaligned,
        BusResponse::Mapped => BusResponse::Mapped,
    }
}
