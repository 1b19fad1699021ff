//! # Difficulty Targets
//!
//! A proof-of-work target is a 256-bit unsigned ceiling: a block is valid
//! when its hash, read as an unsigned 256-bit integer, is strictly below
//! the target. HIGHER target = EASIER, LOWER target = HARDER.
//!
//! Targets travel in a lossy 4-byte compact form (1 exponent byte + 3
//! mantissa bytes). Compaction loses low-order mantissa bits by design, so
//! the round trip that must hold is `compact -> full -> compact` (identity
//! for canonical values), not `full -> compact -> full`. Retarget results
//! are always pushed through the compact form before use so every node
//! agrees on the exact same integer.

use primitive_types::U256;

/// Compact form of the initial target (easy enough for test mining).
pub const DIFFICULTY_INIT_COMPACT: u32 = 0x1e7f_ffff;

/// Compact form of the easiest allowed target. Retargeting caps here;
/// there is no floor — difficulty is only ever capped from above.
pub const DIFFICULTY_MIN_COMPACT: u32 = 0x1f7f_ffff;

/// The initial proof-of-work ceiling, in full form.
pub fn difficulty_init() -> U256 {
    target_from_compact(DIFFICULTY_INIT_COMPACT)
}

/// The easiest allowed proof-of-work ceiling, in full form.
pub fn difficulty_min() -> U256 {
    target_from_compact(DIFFICULTY_MIN_COMPACT)
}

/// Expand a compact 4-byte target into its full 256-bit form.
pub fn target_from_compact(compact: u32) -> U256 {
    let size = (compact >> 24) as usize;
    let mantissa = U256::from(compact & 0x007f_ffff);
    if size <= 3 {
        mantissa >> (8 * (3 - size))
    } else {
        mantissa << (8 * (size - 3))
    }
}

/// Compress a full target into compact form, losing low-order bits.
///
/// The mantissa sign bit (0x00800000) is kept clear by shifting into the
/// exponent, matching the wire layout expected by other nodes.
pub fn compact_from_target(target: U256) -> u32 {
    if target.is_zero() {
        return 0;
    }

    let mut size = (target.bits() + 7) / 8;
    let mut compact: u64 = if size <= 3 {
        target.low_u64() << (8 * (3 - size))
    } else {
        (target >> (8 * (size - 3))).low_u64()
    };

    if compact & 0x0080_0000 != 0 {
        compact >>= 8;
        size += 1;
    }

    ((size as u64) << 24 | compact) as u32
}

/// Round a target to the exact value every node derives from its compact
/// encoding. Retargeting must apply this before comparing or storing.
pub fn compact_round_trip(target: U256) -> U256 {
    target_from_compact(compact_from_target(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_full_compact_is_identity() {
        for compact in [
            DIFFICULTY_INIT_COMPACT,
            DIFFICULTY_MIN_COMPACT,
            0x1d00_ffff, // Bitcoin genesis bits
            0x1f00_bfff,
            0x0301_2345,
        ] {
            assert_eq!(
                compact_from_target(target_from_compact(compact)),
                compact,
                "compact {compact:#010x} must survive the round trip"
            );
        }
    }

    #[test]
    fn test_known_expansion() {
        // 0x1e7fffff => 0x7fffff * 256^(0x1e - 3)
        let expected = U256::from(0x7f_ffff) << (8 * (0x1e - 3));
        assert_eq!(target_from_compact(DIFFICULTY_INIT_COMPACT), expected);
    }

    #[test]
    fn test_sign_bit_shifts_into_exponent() {
        // A mantissa with its high bit set must re-encode one byte shorter
        // with the exponent bumped.
        let value = U256::from(0xbf_ffff) << (8 * 27);
        assert_eq!(compact_from_target(value), 0x1f00_bfff);
    }

    #[test]
    fn test_full_compact_full_is_lossy() {
        let precise = (U256::from(0x7f_ffff) << (8 * 27)) + U256::from(1);
        let rounded = compact_round_trip(precise);
        assert!(rounded < precise);
        // But a second trip is stable.
        assert_eq!(compact_round_trip(rounded), rounded);
    }

    #[test]
    fn test_init_easier_than_min_cap() {
        assert!(difficulty_init() < difficulty_min());
    }

    #[test]
    fn test_small_targets() {
        assert_eq!(target_from_compact(0x0300_1234), U256::from(0x1234));
        assert_eq!(compact_from_target(U256::zero()), 0);
        let one = U256::from(1);
        assert_eq!(target_from_compact(compact_from_target(one)), one);
    }
}
