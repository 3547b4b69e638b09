//! ALU arithmetic operations.
//!
//! Both operations are computed as a 33-bit sum so the carry out falls out of bit 32.
//! Reverse-subtract is `b + !a + 1`, which makes its carry the inverse of a borrow.

/// Bit holding the carry out of a 32-bit sum.
const CARRY_BIT: u64 = 1 << 32;

/// `a + b` with carry out.
pub const fn add(a: u32, b: u32) -> (u32, bool) {
    let sum = a as u64 + b as u64;
    (sum as u32, sum & CARRY_BIT != 0)
}

/// `b - a` with carry out (set when `b >= a`).
pub const fn rsub(a: u32, b: u32) -> (u32, bool) {
    let sum = b as u64 + (!a) as u64 + 1;
    (sum as u32, sum & CARRY_BIT != 0)
}
