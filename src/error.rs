//! Invariant-violation errors (spec §7).
//!
//! Every table in this crate maintains structural invariants (LRU is a
//! permutation, counters never exceed their saturation ceiling, a victim can
//! always be found) that a correctly driven engine can never violate. These
//! are not runtime error conditions — they are programming-invariant
//! violations, so the public engine API stays infallible (`on_access`,
//! `on_fill`, `initialize`, `final_stats` all return without a `Result`) and
//! these variants only ever surface as a panic payload when the
//! `sanity-check` feature is enabled, mirroring the original's
//! `FALCON_SANITY_CHECK` compile-time switch.

use thiserror::Error;

/// One of the five fatal invariant violations from spec §7.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FalconFault {
    /// Kind 1 — the Signature Table's LRU scan found no way at rank
    /// `ST_WAY - 1`, so no replacement victim exists.
    #[error("signature table: no LRU replacement victim found in set {set}")]
    StReplacementMiss {
        /// Set index being serviced when the scan failed.
        set: usize,
    },

    /// Kind 2 — after an LRU-rank increment, some way's rank left the valid
    /// `[0, ST_WAY)` range.
    #[error("signature table: lru rank {rank} out of range in set {set}, way {way}")]
    StLruOutOfRange {
        set: usize,
        way: usize,
        rank: u32,
    },

    /// Kind 3 — the Pattern Table's minimum-`c_delta` victim scan returned
    /// the `PT_WAY` sentinel instead of a concrete way.
    #[error("pattern table: no replacement victim found in set {set}")]
    PtVictimMiss {
        set: usize,
    },

    /// Kind 4 — the GHR's minimum-confidence victim scan returned the
    /// `MAX_GHR_ENTRY` sentinel instead of a concrete entry index.
    #[error("global history register: no replacement victim found")]
    GhrVictimMiss,

    /// Kind 5 — `PrefetchFilter::check` was called with a request kind it
    /// does not recognize. Unreachable from safe Rust (the request type is a
    /// closed enum) but kept so the fault taxonomy matches spec §7 exactly.
    #[error("prefetch filter: unknown request kind")]
    UnknownFilterRequest,
}

/// Raise `$fault` as a panic when `sanity-check` is enabled; a silent no-op
/// otherwise (the invariant is simply trusted in a release build, matching
/// `FALCON_SANITY_CHECK = false`).
macro_rules! sanity_fail {
    ($fault:expr) => {{
        #[cfg(feature = "sanity-check")]
        {
            let fault: $crate::error::FalconFault = $fault;
            panic!("{fault}");
        }
        #[cfg(not(feature = "sanity-check"))]
        {
            #[allow(unreachable_code)]
            {
                let _ = $fault;
            }
        }
    }};
}

pub(crate) use sanity_fail;
