//! Mining statistics and per-block reporting.

use serde::Serialize;

/// Counters for one block's nonce search.
#[derive(Debug, Clone, Default)]
pub struct MiningStats {
    /// Total hashes computed across all workers.
    pub total_hashes: u64,
    /// Elapsed time in milliseconds.
    pub elapsed_ms: f64,
    /// Current hash rate (hashes per second).
    pub hash_rate: f64,
}

impl MiningStats {
    /// Create new empty stats.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update hash rate based on elapsed time.
    pub fn update_hash_rate(&mut self) {
        if self.elapsed_ms > 0.0 {
            self.hash_rate = (self.total_hashes as f64) / (self.elapsed_ms / 1000.0);
        }
    }

    /// Format hash rate for display.
    pub fn format_hash_rate(&self) -> String {
        if self.hash_rate >= 1_000_000_000.0 {
            format!("{:.2} GH/s", self.hash_rate / 1_000_000_000.0)
        } else if self.hash_rate >= 1_000_000.0 {
            format!("{:.2} MH/s", self.hash_rate / 1_000_000.0)
        } else if self.hash_rate >= 1_000.0 {
            format!("{:.2} KH/s", self.hash_rate / 1_000.0)
        } else {
            format!("{:.2} H/s", self.hash_rate)
        }
    }
}

/// Summary of one appended block, printed as JSON on stdout.
#[derive(Debug, Clone, Serialize)]
pub struct BlockSummary {
    /// Chain height of the block (genesis is 0).
    pub height: usize,
    /// The winning nonce.
    pub nonce: u32,
    /// Block hash (display format).
    pub hash: String,
    /// Difficulty of the block's target.
    pub difficulty: f64,
    /// Hashes computed while searching.
    pub hashes: u64,
    /// Search duration in seconds.
    pub elapsed_secs: f64,
}
