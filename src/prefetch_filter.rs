//! Prefetch Filter (PF) — quotient-filter approximate membership structure
//! that suppresses duplicate prefetch requests and feeds the global
//! accuracy accounting (spec §3, §4.4).

use crate::hash::hash;

pub const QUOTIENT_BIT: u32 = 10;
pub const REMAINDER_BIT: u32 = 6;
pub const FILTER_SET: usize = 1 << QUOTIENT_BIT;

/// Reason `PrefetchFilter::check` is being consulted (spec §4.4). The
/// original carries two differently-cased enumerators for the low-confidence
/// L2 prefetch case (`FALCON_l2c_PREFETCH` in the request switch vs.
/// `FALCON_LLC_PREFETCH` in the header) that name the same request; this
/// unifies them into one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefetchFilterRequest {
    /// Confidence at or above `FILL_THRESHOLD`: sets the "prefetched" bit.
    HighConfidencePrefetch,
    /// Confidence between `PF_THRESHOLD` and `FILL_THRESHOLD`: checked for
    /// duplicate suppression, but deliberately does *not* set the
    /// "prefetched" bit, so a later high-confidence request for the same
    /// line can still be filled from the closer cache (Design Notes, §9).
    LowConfidencePrefetch,
    /// A demand access; marks the entry useful and, if it was previously
    /// prefetched, counts toward `pf_useful`.
    Demand,
    /// A cache line is being evicted; resets the filter entry and penalizes
    /// `pf_useful` if the evicted line was prefetched but never used.
    Evict,
}

#[derive(Debug, Clone, Copy, Default)]
struct FilterEntry {
    remainder_tag: u64,
    valid: bool,
    useful: bool,
}

/// Per-eviction accounting the filter cannot update itself: `pf_useful`
/// lives on the Global History Register, which the filter has no handle to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterAccuracyDelta {
    /// `+1` when a demand hit a previously-prefetched, not-yet-useful line.
    pub pf_useful_delta: i32,
}

pub struct PrefetchFilter {
    entries: Vec<FilterEntry>,
}

impl PrefetchFilter {
    pub fn new() -> Self {
        Self {
            entries: vec![FilterEntry::default(); FILTER_SET],
        }
    }

    /// Check (and mutate) the filter for `check_addr` under `request`.
    /// Returns `(admit, accuracy_delta)`: `admit` is `false` only for the two
    /// prefetch-request variants when the line is already tracked — meaning
    /// "do not issue this prefetch". `accuracy_delta` reports any change the
    /// caller's Global History Register should apply to `pf_useful`.
    pub fn check(
        &mut self,
        check_addr: u64,
        log2_block_size: u32,
        request: PrefetchFilterRequest,
    ) -> (bool, FilterAccuracyDelta) {
        let cache_line = check_addr >> log2_block_size;
        let h = hash(cache_line);
        let quotient = ((h >> REMAINDER_BIT) & ((1u64 << QUOTIENT_BIT) - 1)) as usize;
        let remainder = h % (1u64 << REMAINDER_BIT);

        let entry = &mut self.entries[quotient];
        let mut delta = FilterAccuracyDelta::default();

        let admit = match request {
            PrefetchFilterRequest::HighConfidencePrefetch => {
                if (entry.valid || entry.useful) && entry.remainder_tag == remainder {
                    false
                } else {
                    entry.valid = true;
                    entry.useful = false;
                    entry.remainder_tag = remainder;
                    true
                }
            }
            PrefetchFilterRequest::LowConfidencePrefetch => {
                if (entry.valid || entry.useful) && entry.remainder_tag == remainder {
                    false
                } else {
                    // Deliberately does not set valid/useful — see the
                    // variant's doc comment.
                    true
                }
            }
            PrefetchFilterRequest::Demand => {
                if entry.remainder_tag == remainder && !entry.useful {
                    entry.useful = true;
                    if entry.valid {
                        delta.pf_useful_delta = 1;
                    }
                }
                true
            }
            PrefetchFilterRequest::Evict => {
                if entry.valid && !entry.useful {
                    delta.pf_useful_delta = -1;
                }
                *entry = FilterEntry::default();
                true
            }
        };

        (admit, delta)
    }
}

impl Default for PrefetchFilter {
    fn default() -> Self {
        Self::new()
    }
}
