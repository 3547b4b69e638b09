//! ALU shift and sign-extension operations.
//!
//! The shifts move by exactly one bit. Each shifts bit 0 out into the carry; `src`
//! shifts the old carry in at bit 31.

use crate::isa::instruction::UnaryKind;

/// Executes a single-source operation.
///
/// # Arguments
///
/// * `kind`  - The operation.
/// * `a`     - Source value.
/// * `carry` - Current carry, shifted in by `src`.
///
/// # Returns
///
/// The result and the new carry; `None` for sign extensions, which leave it alone.
pub const fn execute(kind: UnaryKind, a: u32, carry: bool) -> (u32, Option<bool>) {
    let out = a & 1 != 0;
    match kind {
        UnaryKind::Sra => (((a as i32) >> 1) as u32, Some(out)),
        UnaryKind::Src => (((carry as u32) << 31) | (a >> 1), Some(out)),
        UnaryKind::Srl => (a >> 1, Some(out)),
        UnaryKind::Sext8 => (a as u8 as i8 as i32 as u32, None),
        UnaryKind::Sext16 => (a as u16 as i16 as i32 as u32, None),
    }
}
