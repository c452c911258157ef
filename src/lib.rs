#![doc = r#"
FALCON prefetcher library crate.

This crate exposes a signature-path-correlation hardware prefetcher for a
last-level/L2 cache simulator. It models a Signature Table, Pattern Table,
Prefetch Filter and Global History Register, tied together by an engine
exposing two callbacks (`on_access`, `on_fill`) a host cache model drives.

Modules:
- hash: bit-exact Jenkins+Knuth key mixing shared by every table
- delta: centralized 7-bit sign-magnitude delta encoding
- geometry: host-supplied cache geometry and functional knobs
- error: typed invariant-violation faults, raised only under `sanity-check`
- signature_table: per-page `(tag, last_offset, signature)` state, LRU
- pattern_table: `(signature -> delta, confidence)` correlation table
- prefetch_filter: quotient-filter duplicate-prefetch suppression
- global_register: cross-page bootstrap entries and accuracy counters
- depth_controller: optional external lookahead-depth feedback loop
- engine: ties the tables together behind `on_access`/`on_fill`

In tests, synthetic trace generators are available under `crate::test_support`.
"#]

pub mod delta;
pub mod depth_controller;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod global_register;
pub mod hash;
pub mod pattern_table;
pub mod prefetch_filter;
pub mod signature_table;

pub use engine::{AccessEvent, FalconEngine, FillEvent, PrefetchIssuer};
pub use error::FalconFault;
pub use geometry::{CacheGeometry, FalconConfig};

pub mod test_support;
