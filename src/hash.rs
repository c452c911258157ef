//! 64-bit key mixing used to derive ST/PT set indices and PF quotient/
//! remainder pairs (spec §4.1).
//!
//! Bit-exact with the original: Robert Jenkins' 32-bit mix sequence applied
//! across the full 64-bit key, followed by Knuth's multiplicative step. The
//! original left a `TODO: Find a good 64-bit hash function` comment — this
//! port keeps the function exactly as written rather than "fixing" it,
//! since tests (and the signature/pattern tables built on top of it) depend
//! on the precise bit pattern it produces.

/// Mix `key` into a pseudo-random 64-bit value.
///
/// All arithmetic wraps, matching the original's unchecked `uint64_t` ops.
pub fn hash(key: u64) -> u64 {
    let mut key = key;

    // Robert Jenkins' 32-bit mix function, applied across the 64-bit word.
    key = key.wrapping_add(key << 12);
    key ^= key >> 22;
    key = key.wrapping_add(key << 4);
    key ^= key >> 9;
    key = key.wrapping_add(key << 10);
    key ^= key >> 2;
    key = key.wrapping_add(key << 7);
    key ^= key >> 12;

    // Knuth's multiplicative method.
    (key >> 3).wrapping_mul(2_654_435_761)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// (P8) Hash determinism: a pure function of input bits.
    #[test]
    fn is_deterministic() {
        for key in [0u64, 1, 42, 0xDEAD_BEEF, u64::MAX, 0x1000] {
            assert_eq!(hash(key), hash(key));
        }
    }

    #[test]
    fn distinct_keys_usually_differ() {
        assert_ne!(hash(0), hash(1));
        assert_ne!(hash(0x1000), hash(0x2000));
    }

    #[test]
    fn matches_known_vectors() {
        // Regression pin: computed once from this exact mix sequence so an
        // accidental reordering of the shift-xor steps gets caught.
        assert_eq!(hash(0), 0);
        assert_eq!(hash(1), 3_824_414_863_623_435_926);
        assert_eq!(hash(42), 2_938_721_282_734_639_997);
        assert_eq!(hash(0xDEAD_BEEF), 9_870_786_532_284_405_472);
        assert_eq!(hash(u64::MAX), 320_171_176_817_049_921);
        assert_eq!(hash(0x1000), 3_506_208_629_828_263_311);
    }
}
