//! Parallel nonce search with first-success-wins semantics.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use log::debug;
use minechain_core::{mine_batch, BlockHeader};

/// Nonces scanned per batch between stop-flag checks.
const BATCH_SIZE: u32 = 10_000;

/// Outcome of a nonce search that cleared the target.
#[derive(Debug, Clone)]
pub struct Found {
    /// The winning nonce.
    pub nonce: u32,
    /// Block hash for that nonce (display byte order).
    pub hash: [u8; 32],
    /// Hashes computed across all workers, including cancelled ones.
    pub hashes_computed: u64,
}

/// Search the full 32-bit nonce space with `workers` OS threads.
pub fn search_nonce(header: &BlockHeader, workers: usize) -> Option<Found> {
    search_space(header, workers, 1 << 32)
}

/// Search nonces `0..space` (capped at 2^32).
///
/// The space is split into one contiguous stripe per worker. Each worker
/// scans its stripe in batches and re-checks the shared stop flag between
/// batches; the first to clear the target publishes its result and flips
/// the flag, cancelling the rest. Returns None once every stripe is
/// exhausted without a hit.
fn search_space(header: &BlockHeader, workers: usize, space: u64) -> Option<Found> {
    let space = space.min(1u64 << 32);
    let stop = Arc::new(AtomicBool::new(false));
    let total_hashes = Arc::new(AtomicU64::new(0));
    let (sender, receiver) = mpsc::channel();

    let mut handles = Vec::new();
    for (worker, (start, end)) in stripes(space, workers.max(1) as u64).into_iter().enumerate() {
        let stop = Arc::clone(&stop);
        let total = Arc::clone(&total_hashes);
        let sender = sender.clone();
        let prefix = *header.prefix();
        let threshold = *header.threshold();

        handles.push(thread::spawn(move || {
            let mut next = start;
            while next < end && !stop.load(Ordering::Relaxed) {
                let count = (end - next).min(u64::from(BATCH_SIZE)) as u32;
                let result = mine_batch(&prefix, &threshold, next as u32, count);
                total.fetch_add(result.hashes_computed, Ordering::Relaxed);

                if let (Some(nonce), Some(hash)) = (result.nonce, result.hash) {
                    stop.store(true, Ordering::Relaxed);
                    let _ = sender.send((nonce, hash));
                    return;
                }
                next += u64::from(count);
            }
            debug!("worker {worker} finished without a hit");
        }));
    }
    drop(sender);

    // Blocks until a worker succeeds, or every sender is gone because all
    // stripes ran dry.
    let found = receiver.recv().ok();
    stop.store(true, Ordering::Relaxed);
    for handle in handles {
        let _ = handle.join();
    }

    found.map(|(nonce, hash)| Found {
        nonce,
        hash,
        hashes_computed: total_hashes.load(Ordering::Relaxed),
    })
}

/// Split `0..space` into one contiguous stripe per worker, dropping any
/// empty tail stripes.
fn stripes(space: u64, workers: u64) -> Vec<(u64, u64)> {
    let stripe = space.div_ceil(workers);
    (0..workers)
        .map(|i| (i * stripe, space.min((i + 1) * stripe)))
        .filter(|(start, end)| start < end)
        .collect()
}
