//! Append-only header chain anchored at a fixed genesis entry.

use thiserror::Error;

use crate::header::BlockHeader;

/// Block version required of every appended block.
pub const CHAIN_VERSION: i32 = 0x1;

/// Compact target carried by the genesis entry, and the default target
/// required of appended blocks.
pub const GENESIS_BITS: u32 = 0x1d00ffff;

/// Timestamp of the genesis entry (Unix time).
pub const GENESIS_TIMESTAMP: u32 = 1231469665;

/// Winning nonce of the genesis entry.
pub const GENESIS_NONCE: u32 = 2573394689;

/// Previous-block hash of the genesis entry, internal byte order.
pub const GENESIS_PREVIOUS_HASH: [u8; 32] = [
    0x6f, 0xe2, 0x8c, 0x0a, 0xb6, 0xf1, 0xb3, 0x72,
    0xc1, 0xa6, 0xa2, 0x46, 0xae, 0x63, 0xf7, 0x4f,
    0x93, 0x1e, 0x83, 0x65, 0xe1, 0x5a, 0x08, 0x9c,
    0x68, 0xd6, 0x19, 0x00, 0x00, 0x00, 0x00, 0x00,
];

/// Merkle root of the genesis entry, internal byte order.
pub const GENESIS_MERKLE_ROOT: [u8; 32] = [
    0x98, 0x20, 0x51, 0xfd, 0x1e, 0x4b, 0xa7, 0x44,
    0xbb, 0xbe, 0x68, 0x0e, 0x1f, 0xee, 0x14, 0x67,
    0x7b, 0xa1, 0xa3, 0xc3, 0x54, 0x0b, 0xf7, 0xb1,
    0xcd, 0xb6, 0x06, 0xe8, 0x57, 0x23, 0x3e, 0x0e,
];

/// Reasons a block is rejected by [`Chain::add`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The block's target or version differs from the chain's configured
    /// values.
    #[error("block target or version does not match the chain parameters")]
    TargetVersionMismatch,
    /// The block's previous-hash field does not equal the hash of the
    /// current tail.
    #[error("block does not link to the chain tail")]
    BrokenLink,
    /// The block's hash does not clear its target.
    #[error("block hash does not satisfy the proof-of-work target")]
    ProofOfWork,
}

/// Difficulty adjustment strategy, consulted after every successful
/// append.
///
/// The returned compact target becomes the value the next appended block
/// must carry. The shipped [`FixedTarget`] policy never changes it.
pub trait RetargetPolicy {
    /// Compute the compact target for the next block, given the chain so
    /// far (genesis first, new tail last) and the current target.
    fn recompute(&self, blocks: &[BlockHeader], current_bits: u32) -> u32;
}

/// Retarget policy that keeps the compact target constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedTarget;

impl RetargetPolicy for FixedTarget {
    fn recompute(&self, _blocks: &[BlockHeader], current_bits: u32) -> u32 {
        current_bits
    }
}

/// Append-only chain of block headers.
///
/// Seeded with the hardcoded genesis entry at construction, so the chain
/// is never empty. Appends are validated against the chain's configured
/// target and version, the current tail hash, and the block's own proof
/// of work; a rejected block leaves the chain untouched.
pub struct Chain {
    blocks: Vec<BlockHeader>,
    bits: u32,
    version: i32,
    retarget: Box<dyn RetargetPolicy + Send + Sync>,
}

impl Default for Chain {
    fn default() -> Self {
        Chain::new()
    }
}

impl Chain {
    /// Create a chain requiring the genesis target of appended blocks.
    pub fn new() -> Chain {
        Chain::with_bits(GENESIS_BITS)
    }

    /// Create a chain requiring a custom compact target of appended
    /// blocks.
    ///
    /// The genesis entry keeps its own fixed fields regardless; it is
    /// never validated against the chain parameters.
    pub fn with_bits(bits: u32) -> Chain {
        Chain {
            blocks: vec![genesis_header()],
            bits,
            version: CHAIN_VERSION,
            retarget: Box::new(FixedTarget),
        }
    }

    /// Replace the retarget policy consulted after each append.
    pub fn with_policy(mut self, policy: impl RetargetPolicy + Send + Sync + 'static) -> Chain {
        self.retarget = Box::new(policy);
        self
    }

    /// Compact target currently required of appended blocks.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Block version required of appended blocks.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Never true: the genesis entry is present from construction on.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The most recently appended block.
    pub fn tail(&self) -> &BlockHeader {
        // Never empty: seeded with genesis, and only ever grows.
        &self.blocks[self.blocks.len() - 1]
    }

    /// Validate a mined block and append it to the chain.
    ///
    /// The block must carry the chain's target and version, its
    /// previous-hash field must equal the current tail's display-order
    /// hash, and its own hash must clear the target. After a successful
    /// append the retarget policy decides the target for the next block.
    pub fn add(&mut self, block: BlockHeader) -> Result<(), ChainError> {
        if block.bits() != self.bits || block.version() != self.version {
            return Err(ChainError::TargetVersionMismatch);
        }
        if *block.previous_hash() != self.tail().hash() {
            return Err(ChainError::BrokenLink);
        }
        if !block.is_valid() {
            return Err(ChainError::ProofOfWork);
        }

        self.blocks.push(block);
        self.bits = self.retarget.recompute(&self.blocks, self.bits);
        Ok(())
    }

    /// An independent copy of every block, genesis first.
    pub fn snapshot(&self) -> Vec<BlockHeader> {
        self.blocks.clone()
    }
}

fn genesis_header() -> BlockHeader {
    BlockHeader::with_nonce(
        CHAIN_VERSION,
        &GENESIS_PREVIOUS_HASH,
        &GENESIS_MERKLE_ROOT,
        GENESIS_TIMESTAMP,
        GENESIS_BITS,
        GENESIS_NONCE,
    )
    .expect("genesis constants are exactly 32 bytes")
}
