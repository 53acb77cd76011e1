//! Demo miner: commits random transactions, searches for nonces in
//! parallel, and appends the mined blocks to an in-memory chain.

use std::error::Error;
use std::num::NonZeroUsize;
use std::process;
use std::thread;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use clap::Parser;
use log::{error, info, LevelFilter};
use minechain_core::{build_merkle_tree, difficulty, BlockHeader, Chain};
use rand::Rng;

mod stats;
mod worker;

use stats::{BlockSummary, MiningStats};

#[derive(Parser, Debug)]
#[command(name = "minechain-miner", about = "Mine demo blocks onto an in-memory chain")]
struct Opt {
    /// Number of blocks to mine before exiting.
    #[arg(long, default_value_t = 3)]
    blocks: u32,

    /// Compact target for appended blocks, in hex (e.g. 1f00ffff).
    #[arg(long, value_parser = parse_bits, default_value = "1f00ffff")]
    bits: u32,

    /// Worker threads for the nonce search. Defaults to the number of
    /// available cores.
    #[arg(long)]
    workers: Option<usize>,
}

fn parse_bits(value: &str) -> Result<u32, String> {
    let digits = value.trim_start_matches("0x");
    u32::from_str_radix(digits, 16).map_err(|e| format!("invalid bits value: {e}"))
}

fn main() {
    env_logger::builder().filter_level(LevelFilter::Info).init();

    let opt = Opt::parse();

    if let Err(e) = run(&opt) {
        error!("mining failed: {e}");
        process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), Box<dyn Error>> {
    let workers = opt.workers.unwrap_or_else(default_workers);
    let mut chain = Chain::with_bits(opt.bits);

    info!(
        "chain initialized: genesis {}, bits {:08x} (difficulty {:.4}), {} workers",
        hex::encode(chain.tail().hash()),
        opt.bits,
        difficulty(opt.bits),
        workers
    );

    let mut rng = rand::thread_rng();
    for _ in 0..opt.blocks {
        let transactions = random_transactions(&mut rng);
        let tree = build_merkle_tree(&transactions)?;

        let header = BlockHeader::new(
            chain.version(),
            &chain.tail().hash(),
            tree.root(),
            unix_time(),
            chain.bits(),
        )?;

        let started = Instant::now();
        let found = worker::search_nonce(&header, workers)
            .ok_or("nonce space exhausted without a clearing hash")?;
        let elapsed = started.elapsed();

        let mut block = header;
        block.nonce = found.nonce;
        let block_difficulty = block.difficulty();
        chain.add(block)?;

        let mut stats = MiningStats::new();
        stats.total_hashes = found.hashes_computed;
        stats.elapsed_ms = elapsed.as_secs_f64() * 1000.0;
        stats.update_hash_rate();

        let summary = BlockSummary {
            height: chain.len() - 1,
            nonce: found.nonce,
            hash: hex::encode(found.hash),
            difficulty: block_difficulty,
            hashes: found.hashes_computed,
            elapsed_secs: elapsed.as_secs_f64(),
        };

        info!(
            "block {} mined: {} (nonce {}, {} hashes, {})",
            summary.height,
            summary.hash,
            found.nonce,
            found.hashes_computed,
            stats.format_hash_rate()
        );
        println!("{}", serde_json::to_string(&summary)?);
    }

    info!("done: chain height {}", chain.len() - 1);
    Ok(())
}

/// Two random single-byte payloads standing in for real transactions.
fn random_transactions(rng: &mut impl Rng) -> Vec<Vec<u8>> {
    vec![vec![rng.gen()], vec![rng.gen()]]
}

fn default_workers() -> usize {
    thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

fn unix_time() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0)
}
