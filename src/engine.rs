//! The FALCON engine — owns the Signature Table, Pattern Table, Prefetch
//! Filter and Global History Register, and exposes the three callbacks a
//! host cache model drives (spec §4.6, §6).

use tracing::{debug, info, trace};

use crate::delta::encode_delta;
use crate::geometry::FalconConfig;
use crate::global_register::GlobalRegister;
use crate::pattern_table::{PatternTable, PF_THRESHOLD, PT_WAY};
use crate::prefetch_filter::{PrefetchFilter, PrefetchFilterRequest};
use crate::signature_table::SignatureTable;

/// Confidence at or above which a candidate fills the near cache instead of
/// the far one (spec §4.6 step 7, GLOSSARY).
pub const FILL_THRESHOLD: u32 = 90;

/// Host collaborator that actually issues a prefetch request into the cache
/// hierarchy (spec §6's `prefetch_line`). The return value mirrors the
/// original's issue-status return, which FALCON itself never inspects.
pub trait PrefetchIssuer {
    fn prefetch_line(&mut self, ip: u64, base_addr: u64, pf_addr: u64, fill_into_upper_level: bool, meta: u32) -> bool;
}

/// Everything FALCON needs to know about one demand access, mirroring the
/// original `l2c_prefetcher_operate` parameter list.
#[derive(Debug, Clone, Copy)]
pub struct AccessEvent {
    pub addr: u64,
    pub ip: u64,
    pub cache_hit: u8,
    pub access_type: u8,
    pub metadata_in: u32,
}

/// Everything FALCON needs to know about one cache fill, mirroring
/// `l2c_prefetcher_cache_fill`.
#[derive(Debug, Clone, Copy)]
pub struct FillEvent {
    pub addr: u64,
    pub set: u32,
    pub way: u32,
    pub is_prefetch: u8,
    pub evicted_addr: u64,
    pub metadata_in: u32,
}

pub struct FalconEngine {
    config: FalconConfig,
    st: SignatureTable,
    pt: PatternTable,
    pf: PrefetchFilter,
    ghr: GlobalRegister,
}

impl FalconEngine {
    pub fn new(config: FalconConfig) -> Self {
        Self {
            config,
            st: SignatureTable::new(),
            pt: PatternTable::new(),
            pf: PrefetchFilter::new(),
            ghr: GlobalRegister::new(),
        }
    }

    /// Log structural constants once at startup (spec §6's `initialize()`).
    pub fn initialize(&self) {
        info!(
            st_set = crate::signature_table::ST_SET,
            st_way = crate::signature_table::ST_WAY,
            pt_set = crate::pattern_table::PT_SET,
            pt_way = PT_WAY,
            filter_set = crate::prefetch_filter::FILTER_SET,
            "falcon engine initialized"
        );
    }

    pub fn final_stats(&self) {}

    /// Demand access callback (spec §4.6, "Access callback"). Returns
    /// `event.metadata_in` unchanged.
    pub fn on_access(&mut self, event: AccessEvent, issuer: &mut impl PrefetchIssuer) -> u32 {
        let geometry = self.config.geometry;
        let page = event.addr >> geometry.log2_page_size;
        let page_offset = ((event.addr >> geometry.log2_block_size) & (geometry.offsets_per_page() - 1)) as u32;

        let mshr_size = geometry.mshr_size;
        let mut delta_q = vec![0i32; mshr_size];
        let mut confidence_q = vec![0u32; mshr_size];
        confidence_q[0] = 100;

        self.ghr.refresh_accuracy();

        let bootstrap = if self.config.ghr_on {
            self.ghr.check_entry(page_offset)
        } else {
            None
        };
        let update = self.st.read_and_update_sig(page, page_offset, bootstrap);

        let (_, demand_delta) = self.pf.check(event.addr, geometry.log2_block_size, PrefetchFilterRequest::Demand);
        self.ghr.apply_accuracy_delta(demand_delta.pf_useful_delta);

        if update.last_sig != 0 {
            self.pt.update_pattern(update.last_sig, update.delta);
        }

        let mut base_addr = event.addr;
        let mut curr_sig = update.curr_sig;
        let mut lookahead_conf = 100u32;
        let mut pf_q_head = 0usize;
        let mut pf_q_tail = 0usize;
        let mut depth = 0u32;

        loop {
            let outcome = self.pt.read_pattern(
                curr_sig,
                depth,
                lookahead_conf,
                self.ghr.global_accuracy,
                &mut delta_q,
                &mut confidence_q,
                &mut pf_q_tail,
            );

            let mut do_lookahead = false;
            let round_end = pf_q_tail;
            for i in pf_q_head..round_end {
                if confidence_q[i] >= PF_THRESHOLD {
                    let block_mask = geometry.block_size() - 1;
                    let base_block_addr = base_addr & !block_mask;
                    let pf_addr = (base_block_addr as i64 + ((delta_q[i] as i64) << geometry.log2_block_size)) as u64;

                    let page_mask = !(geometry.page_size() - 1);
                    if (event.addr & page_mask) == (pf_addr & page_mask) {
                        let fill_into_upper_level = confidence_q[i] >= FILL_THRESHOLD;
                        let request = if fill_into_upper_level {
                            PrefetchFilterRequest::HighConfidencePrefetch
                        } else {
                            PrefetchFilterRequest::LowConfidencePrefetch
                        };

                        let (admit, _) = self.pf.check(pf_addr, geometry.log2_block_size, request);
                        if admit {
                            issuer.prefetch_line(event.ip, base_addr, pf_addr, fill_into_upper_level, 0);

                            if fill_into_upper_level {
                                self.ghr.record_prefetch_issued();
                            }

                            trace!(base_addr, pf_addr, delta = delta_q[i], confidence = confidence_q[i], "prefetch issued");
                        }
                    } else if self.config.ghr_on {
                        let ghr_offset = ((pf_addr >> geometry.log2_block_size) & 0x3F) as u32;
                        self.ghr.update_entry(curr_sig, confidence_q[i], ghr_offset, delta_q[i]);
                        debug!(curr_sig, confidence = confidence_q[i], ghr_offset, "crossed page boundary, recorded in GHR");
                    }

                    do_lookahead = true;
                    pf_q_head += 1;
                }
            }

            if let Some(way) = outcome.lookahead_way {
                let pt_delta = self.pt.delta_at(curr_sig, way);
                base_addr = (base_addr as i64 + ((pt_delta as i64) << geometry.log2_block_size)) as u64;
                let sig_delta = encode_delta(pt_delta);
                curr_sig = ((curr_sig << crate::signature_table::SIG_SHIFT) ^ sig_delta) & crate::signature_table::SIG_MASK;
            }

            lookahead_conf = outcome.lookahead_conf;
            if outcome.bump_depth {
                depth += 1;
            }

            if !self.config.lookahead_on || !do_lookahead {
                break;
            }
        }

        event.metadata_in
    }

    /// Fill/eviction callback (spec §4.6, "Fill callback"). Returns
    /// `event.metadata_in` unchanged.
    pub fn on_fill(&mut self, event: FillEvent) -> u32 {
        if self.config.filter_on {
            let (_, delta) = self.pf.check(event.evicted_addr, self.config.geometry.log2_block_size, PrefetchFilterRequest::Evict);
            self.ghr.apply_accuracy_delta(delta.pf_useful_delta);
        }
        event.metadata_in
    }
}
