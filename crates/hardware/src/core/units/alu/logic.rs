//! ALU logic and pattern compare operations.

use crate::isa::instruction::{CompareKind, LogicKind};

/// Byte lanes of a word, most significant first.
const LANES: [u32; 4] = [0xFF00_0000, 0x00FF_0000, 0x0000_FF00, 0x0000_00FF];

/// Executes a bitwise operation.
pub const fn execute(kind: LogicKind, a: u32, b: u32) -> u32 {
    match kind {
        LogicKind::Or => a | b,
        LogicKind::And => a & b,
        LogicKind::Xor => a ^ b,
        LogicKind::Andn => a & !b,
    }
}

/// Executes a pattern compare.
///
/// `ByteFind` returns the 1-based index of the first byte lane, most significant first,
/// where `a` and `b` agree, or 0 when no lane does.
pub const fn compare(kind: CompareKind, a: u32, b: u32) -> u32 {
    match kind {
        CompareKind::ByteFind => {
            let mut lane = 0;
            while lane < LANES.len() {
                if a & LANES[lane] == b & LANES[lane] {
                    return lane as u32 + 1;
                }
                lane += 1;
            }
            0
        }
        CompareKind::Equal => (a == b) as u32,
        CompareKind::NotEqual => (a != b) as u32,
    }
}
