//! Centralized 7-bit sign-magnitude delta encoding (spec §4.2, §4.6, Design
//! Notes §9: "centralize it in one helper and reuse across ST update and
//! lookahead recompute to avoid drift").
//!
//! A signed block-offset delta in `[-63, 63]` is folded into a 7-bit
//! sign-magnitude code before being XORed into a signature: non-negative
//! deltas map to themselves, negative deltas `d` map to `-d + 64` (bit 6 acts
//! as the sign bit, bits 0-5 hold the magnitude).

/// Encode `delta` as used by `sig_delta` in the original: `delta >= 0 ?
/// delta : (-delta) + (1 << 6)`.
#[inline]
pub(crate) fn encode_delta(delta: i32) -> u32 {
    if delta >= 0 {
        delta as u32
    } else {
        (-delta) as u32 + (1 << 6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (P7) Encoding round-trip: positive deltas map to themselves, negative
    /// deltas `d` map to `-d + 64`, for every delta in `[-63, 63]`.
    #[test]
    fn encoding_matches_spec_for_full_delta_range() {
        for delta in -63..=63 {
            let code = encode_delta(delta);
            if delta >= 0 {
                assert_eq!(code, delta as u32);
            } else {
                assert_eq!(code, (-delta) as u32 + 64);
            }
        }
    }

    #[test]
    fn zero_maps_to_zero() {
        assert_eq!(encode_delta(0), 0);
    }

    #[test]
    fn boundary_values() {
        assert_eq!(encode_delta(63), 63);
        assert_eq!(encode_delta(-63), 127);
        assert_eq!(encode_delta(-1), 65);
        assert_eq!(encode_delta(1), 1);
    }
}
