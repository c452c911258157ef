//! Lookahead depth controller — reconstructs the external cache-pressure
//! feedback loop the original wired in from a companion replacement policy
//! (spec §4.7). FALCON only consumes its output (`pf_depth`); it never
//! drives the policy itself, so this module is kept a thin, independently
//! testable unit rather than folded into [`crate::engine`].

/// Cache-behavior feedback the host is expected to sample once per epoch and
/// hand to [`adjust_depth`]/[`initial_depth`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheFeedback {
    pub miss_rate: u32,
    pub hit_rate: u32,
    pub replace_rate: u32,
    pub utilization: u32,
}

pub const MAX_PF_DEPTH: u32 = 3;
pub const MIN_PF_DEPTH: u32 = 1;

const GOOD_MISS_RATE: u32 = 10;
const POOR_HIT_RATE: u32 = 50;

const HIGH_UTILIZATION_THRESHOLD: u32 = 80;
const LOW_UTILIZATION_THRESHOLD: u32 = 20;

const AGGRESSIVE_PREFETCH_DEPTH: u32 = 5;
const CONSERVATIVE_PREFETCH_DEPTH: u32 = 2;
const DEFAULT_PREFETCH_DEPTH: u32 = 3;

/// Composite cache-pressure score (spec §4.7): weighted blend of miss rate,
/// replacement rate and (inverted) utilization. Not consumed by the depth
/// controller itself; exposed for a host that wants a single pressure
/// signal for its own logging/telemetry.
pub fn cache_pressure(feedback: CacheFeedback) -> u32 {
    // Matches the original's double-precision arithmetic (`GetCP`) truncated
    // once at the end, not a scaled-integer rewrite: the 0.4/0.2 binary
    // floating-point representation shifts the truncation boundary on a
    // non-trivial fraction of inputs relative to integer-only arithmetic.
    let pressure = 0.4 * feedback.miss_rate as f64
        + 0.4 * feedback.replace_rate as f64
        + 0.2 * (100 - feedback.utilization) as f64;
    pressure as u32
}

/// One-shot depth chosen from cache utilization at prefetcher bring-up.
///
/// Deliberately asymmetric: the aggressive branch (5) exceeds
/// [`MAX_PF_DEPTH`] (3), the ceiling [`adjust_depth`] otherwise enforces.
/// This is carried over as-is rather than clamped — see Open Questions.
pub fn initial_depth(feedback: CacheFeedback) -> u32 {
    if feedback.utilization > HIGH_UTILIZATION_THRESHOLD {
        CONSERVATIVE_PREFETCH_DEPTH
    } else if feedback.utilization < LOW_UTILIZATION_THRESHOLD {
        AGGRESSIVE_PREFETCH_DEPTH
    } else {
        DEFAULT_PREFETCH_DEPTH
    }
}

/// Adjust `pf_depth` by at most one step per call, based on whether the
/// miss rate is good or the hit rate is poor. Neutral feedback leaves depth
/// unchanged.
pub fn adjust_depth(feedback: CacheFeedback, pf_depth: u32) -> u32 {
    if feedback.miss_rate < GOOD_MISS_RATE {
        (pf_depth + 1).min(MAX_PF_DEPTH)
    } else if feedback.hit_rate > POOR_HIT_RATE {
        pf_depth.saturating_sub(1).max(MIN_PF_DEPTH)
    } else {
        pf_depth
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_depth_is_conservative_under_high_utilization() {
        let feedback = CacheFeedback {
            utilization: 90,
            ..Default::default()
        };
        assert_eq!(initial_depth(feedback), CONSERVATIVE_PREFETCH_DEPTH);
    }

    #[test]
    fn initial_depth_is_aggressive_under_low_utilization() {
        let feedback = CacheFeedback {
            utilization: 5,
            ..Default::default()
        };
        assert_eq!(initial_depth(feedback), AGGRESSIVE_PREFETCH_DEPTH);
        assert!(initial_depth(feedback) > MAX_PF_DEPTH);
    }

    #[test]
    fn initial_depth_is_default_under_neutral_utilization() {
        let feedback = CacheFeedback {
            utilization: 50,
            ..Default::default()
        };
        assert_eq!(initial_depth(feedback), DEFAULT_PREFETCH_DEPTH);
    }

    /// Regression pin: these inputs expose the gap between the original's
    /// double-precision-then-truncate formula and a scaled-integer rewrite
    /// (0.4/0.2 binary floating-point representation error shifts the
    /// truncation boundary below the mathematically exact value).
    #[test]
    fn pressure_matches_floating_point_truncation_not_integer_rounding() {
        assert_eq!(
            cache_pressure(CacheFeedback {
                miss_rate: 1,
                replace_rate: 43,
                utilization: 93,
                ..Default::default()
            }),
            18
        );
        assert_eq!(
            cache_pressure(CacheFeedback {
                miss_rate: 2,
                replace_rate: 81,
                utilization: 81,
                ..Default::default()
            }),
            36
        );
    }

    #[test]
    fn adjust_depth_increases_on_good_miss_rate_up_to_the_ceiling() {
        let feedback = CacheFeedback {
            miss_rate: 5,
            ..Default::default()
        };
        assert_eq!(adjust_depth(feedback, 1), 2);
        assert_eq!(adjust_depth(feedback, MAX_PF_DEPTH), MAX_PF_DEPTH);
    }

    #[test]
    fn adjust_depth_decreases_on_poor_hit_rate_down_to_the_floor() {
        let feedback = CacheFeedback {
            miss_rate: 50,
            hit_rate: 80,
            ..Default::default()
        };
        assert_eq!(adjust_depth(feedback, 2), 1);
        assert_eq!(adjust_depth(feedback, MIN_PF_DEPTH), MIN_PF_DEPTH);
    }

    #[test]
    fn adjust_depth_is_unchanged_on_neutral_feedback() {
        let feedback = CacheFeedback {
            miss_rate: 50,
            hit_rate: 40,
            ..Default::default()
        };
        assert_eq!(adjust_depth(feedback, 2), 2);
    }
}
