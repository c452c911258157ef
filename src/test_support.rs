//! Synthetic trace generation shared by unit tests, scenario tests, the
//! trace-driver binary's self-test mode, and the criterion benchmark.
//!
//! Mirrors the teacher's `test_utils` pattern: a handful of small,
//! deterministic fixture builders rather than a generic trace DSL.

use crate::geometry::CacheGeometry;

/// A single demand access: a byte address plus an instruction pointer tag.
#[derive(Debug, Clone, Copy)]
pub struct TraceLine {
    pub addr: u64,
    pub ip: u64,
}

/// `count` sequential block accesses starting at `page_base + start_offset`
/// blocks, all within the same page (Scenario 1: cold page, monotonic
/// stride).
pub fn monotonic_stride(geometry: CacheGeometry, page_index: u64, start_offset: u64, count: u64) -> Vec<TraceLine> {
    let page_base = page_index * geometry.page_size();
    (0..count)
        .map(|i| {
            let offset = (start_offset + i) % geometry.offsets_per_page();
            TraceLine {
                addr: page_base + offset * geometry.block_size(),
                ip: 0x1000,
            }
        })
        .collect()
}

/// A stride that starts near the end of a page and runs past its boundary
/// into the next page (Scenario 3: page boundary crossing).
pub fn strided_with_page_crossing(geometry: CacheGeometry, page_index: u64, stride_blocks: u64, run_into_next_page: u64) -> Vec<TraceLine> {
    let offsets_per_page = geometry.offsets_per_page();
    let start_offset = offsets_per_page.saturating_sub(run_into_next_page * stride_blocks + stride_blocks);
    let page_base = page_index * geometry.page_size();

    let mut lines = Vec::new();
    let mut addr = page_base + start_offset * geometry.block_size();
    for _ in 0..(run_into_next_page + 2) {
        lines.push(TraceLine { addr, ip: 0x2000 });
        addr += stride_blocks * geometry.block_size();
    }
    lines
}

/// Parse one hex address per line (the trace-driver binary's input format),
/// skipping blank lines and `#`-prefixed comments.
pub fn parse_hex_trace(text: &str) -> Vec<TraceLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| u64::from_str_radix(line.trim_start_matches("0x"), 16).ok())
        .map(|addr| TraceLine { addr, ip: addr })
        .collect()
}
