//! Host-provided geometry and functional knobs (spec §1 "Out of scope",
//! §4.7, §9).
//!
//! The original ChampSim source gets block/page geometry from preprocessor
//! macros (`LOG2_BLOCK_SIZE`, `LOG2_PAGE_SIZE`, `PAGE_SIZE`, `BLOCK_SIZE`,
//! `MSHR_SIZE`) defined by the surrounding simulator, and its three
//! behavioral toggles (`LOOKAHEAD_ON`, `FILTER_ON`, `GHR_ON`) as
//! `constexpr bool`s in the `falcon` namespace. Per the Design Notes (§9),
//! file-scope constants become fields on a config struct the host
//! constructs once and hands to [`crate::engine::FalconEngine::new`].

/// Cache geometry supplied by the host cache model.
///
/// Defaults match the LLC geometry the original prefetcher was tuned
/// against: 64-byte blocks, 4 KiB pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheGeometry {
    pub log2_block_size: u32,
    pub log2_page_size: u32,
    /// Number of in-flight miss-handling slots; bounds the per-access
    /// candidate queues (`confidence_q`, `delta_q`) in the lookahead loop.
    pub mshr_size: usize,
}

impl CacheGeometry {
    pub const fn new(log2_block_size: u32, log2_page_size: u32, mshr_size: usize) -> Self {
        Self {
            log2_block_size,
            log2_page_size,
            mshr_size,
        }
    }

    #[inline]
    pub const fn block_size(&self) -> u64 {
        1 << self.log2_block_size
    }

    #[inline]
    pub const fn page_size(&self) -> u64 {
        1 << self.log2_page_size
    }

    /// Number of block-sized offsets within one page, i.e. `PAGE_SIZE /
    /// BLOCK_SIZE`. Used to mask `page_offset` in §4.6 step 1.
    #[inline]
    pub const fn offsets_per_page(&self) -> u64 {
        self.page_size() / self.block_size()
    }
}

impl Default for CacheGeometry {
    /// 64 B blocks (`LOG2_BLOCK_SIZE = 6`), 4 KiB pages (`LOG2_PAGE_SIZE =
    /// 12`), 16 MSHR slots — ChampSim's usual LLC defaults.
    fn default() -> Self {
        Self::new(6, 12, 16)
    }
}

/// Functional knobs from the `falcon` namespace (`LOOKAHEAD_ON`,
/// `FILTER_ON`, `GHR_ON`). All default to `true`, matching the original.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FalconConfig {
    pub geometry: CacheGeometry,
    /// Whether `on_access` keeps recursing through `PT::read_pattern` after
    /// the first round (§4.6 step 7's `do...while`).
    pub lookahead_on: bool,
    /// Whether `on_fill` consults the prefetch filter on eviction (§4.6).
    pub filter_on: bool,
    /// Whether the Signature Table bootstraps from the Global History
    /// Register on an ST miss, and whether page-crossing candidates are
    /// recorded into it (§4.2, §4.6).
    pub ghr_on: bool,
}

impl FalconConfig {
    pub const fn new(geometry: CacheGeometry) -> Self {
        Self {
            geometry,
            lookahead_on: true,
            filter_on: true,
            ghr_on: true,
        }
    }
}

impl Default for FalconConfig {
    fn default() -> Self {
        Self::new(CacheGeometry::default())
    }
}
