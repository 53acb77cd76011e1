//! Proof-of-work primitives for a minimal Bitcoin-style chain.
//!
//! This crate provides pure Rust implementations of:
//! - Merkle-tree commitment over an ordered transaction set
//! - Canonical 80-byte block header serialization and double-SHA256 hashing
//! - Compact-target decoding and difficulty computation
//! - Append-only chain validation anchored at a fixed genesis entry

use uint::construct_uint;

construct_uint! {
    /// Unsigned 256-bit integer used for target thresholds and the
    /// numeric interpretation of block hashes.
    pub struct U256(4);
}

pub mod chain;
pub mod hash;
pub mod header;
pub mod merkle;
pub mod target;

pub use chain::{Chain, ChainError, FixedTarget, RetargetPolicy};
pub use hash::{double_sha256, mine_batch, reverse_bytes, sha256, MiningResult};
pub use header::{BlockHeader, HeaderError, HEADER_PREFIX_SIZE, HEADER_SIZE};
pub use merkle::{build_merkle_tree, MerkleError, MerkleLayer, MerkleTree};
pub use target::{clears_target, compact_to_target, difficulty, maximum_value, MAX_TARGET};
