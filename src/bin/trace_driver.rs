//! Harness binary: drives a [`falcon::FalconEngine`] over a line trace
//! (one hex address per line) and reports issued/useful prefetch counts.
//!
//! Not part of FALCON's external interface (spec §6: "no file format, no
//! CLI") — this is harness tooling for exercising the engine end-to-end,
//! the way `frankenlibc-harness`'s binary drives its libc port.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use falcon::engine::{AccessEvent, FalconEngine, PrefetchIssuer};
use falcon::geometry::{CacheGeometry, FalconConfig};

#[derive(Parser, Debug)]
#[command(name = "falcon-trace-driver", about = "Drive the FALCON prefetcher over a line trace")]
struct Args {
    /// Path to a trace file: one hex address per line.
    trace: PathBuf,

    #[arg(long, default_value_t = 6)]
    log2_block_size: u32,

    #[arg(long, default_value_t = 12)]
    log2_page_size: u32,

    #[arg(long, default_value_t = 16)]
    mshr_size: usize,

    #[arg(long)]
    disable_lookahead: bool,

    #[arg(long)]
    disable_filter: bool,

    #[arg(long)]
    disable_ghr: bool,
}

struct CountingIssuer {
    issued: u64,
}

impl PrefetchIssuer for CountingIssuer {
    fn prefetch_line(&mut self, _ip: u64, _base_addr: u64, _pf_addr: u64, _fill_into_upper_level: bool, _meta: u32) -> bool {
        self.issued += 1;
        true
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let text = fs::read_to_string(&args.trace).unwrap_or_else(|err| {
        eprintln!("failed to read trace file {}: {err}", args.trace.display());
        std::process::exit(1);
    });
    let trace = falcon::test_support::parse_hex_trace(&text);

    let geometry = CacheGeometry::new(args.log2_block_size, args.log2_page_size, args.mshr_size);
    let mut config = FalconConfig::new(geometry);
    config.lookahead_on = !args.disable_lookahead;
    config.filter_on = !args.disable_filter;
    config.ghr_on = !args.disable_ghr;

    let mut engine = FalconEngine::new(config);
    engine.initialize();

    let mut issuer = CountingIssuer { issued: 0 };
    for line in &trace {
        engine.on_access(
            AccessEvent {
                addr: line.addr,
                ip: line.ip,
                cache_hit: 0,
                access_type: 0,
                metadata_in: 0,
            },
            &mut issuer,
        );
    }
    engine.final_stats();

    println!("accesses: {}", trace.len());
    println!("prefetches issued: {}", issuer.issued);
}
