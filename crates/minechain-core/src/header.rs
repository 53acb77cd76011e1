//! Block header construction, serialization, and proof-of-work checks.

use thiserror::Error;

use crate::hash::{double_sha256, reverse_bytes};
use crate::target::{clears_target, compact_to_target, difficulty, maximum_value};
use crate::U256;

/// Serialized header size without the nonce.
pub const HEADER_PREFIX_SIZE: usize = 76;

/// Serialized size of a full block header.
pub const HEADER_SIZE: usize = 80;

/// Errors from constructing or decoding a block header.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    /// A hash field was not exactly 32 bytes long.
    #[error("{field} must be exactly 32 bytes, got {len}")]
    InvalidFieldLength { field: &'static str, len: usize },
    /// A serialized header was not exactly 80 bytes long.
    #[error("serialized header must be exactly 80 bytes, got {0}")]
    InvalidHeaderLength(usize),
}

/// A block header (80 bytes serialized).
///
/// Everything except the nonce is fixed at construction: the five prefix
/// fields are serialized once into the canonical little-endian layout and
/// cached, along with the values derived from the compact target. Only
/// the nonce is mutable, so repeated hashing during a search re-encodes
/// just 4 bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockHeader {
    version: i32,
    previous_hash: [u8; 32],
    merkle_root: [u8; 32],
    timestamp: u32,
    bits: u32,
    /// Nonce for proof of work, free to mutate between hashes.
    pub nonce: u32,
    prefix: [u8; HEADER_PREFIX_SIZE],
    maximum_value: f64,
    difficulty: f64,
    threshold: U256,
}

impl BlockHeader {
    /// Create a new block header with nonce 0.
    ///
    /// `previous_hash` and `merkle_root` must be exactly 32 bytes, in
    /// internal byte order.
    pub fn new(
        version: i32,
        previous_hash: &[u8],
        merkle_root: &[u8],
        timestamp: u32,
        bits: u32,
    ) -> Result<Self, HeaderError> {
        Self::with_nonce(version, previous_hash, merkle_root, timestamp, bits, 0)
    }

    /// Create a block header with an explicit nonce.
    pub fn with_nonce(
        version: i32,
        previous_hash: &[u8],
        merkle_root: &[u8],
        timestamp: u32,
        bits: u32,
        nonce: u32,
    ) -> Result<Self, HeaderError> {
        let previous_hash = hash_field("previous hash", previous_hash)?;
        let merkle_root = hash_field("merkle root", merkle_root)?;

        let mut prefix = [0u8; HEADER_PREFIX_SIZE];

        // Version (4 bytes, little-endian)
        prefix[0..4].copy_from_slice(&version.to_le_bytes());

        // Previous block hash (32 bytes, internal byte order)
        prefix[4..36].copy_from_slice(&previous_hash);

        // Merkle root (32 bytes)
        prefix[36..68].copy_from_slice(&merkle_root);

        // Timestamp (4 bytes, little-endian)
        prefix[68..72].copy_from_slice(&timestamp.to_le_bytes());

        // Bits (4 bytes, little-endian)
        prefix[72..76].copy_from_slice(&bits.to_le_bytes());

        Ok(BlockHeader {
            version,
            previous_hash,
            merkle_root,
            timestamp,
            bits,
            nonce,
            prefix,
            maximum_value: maximum_value(bits),
            difficulty: difficulty(bits),
            threshold: compact_to_target(bits),
        })
    }

    /// Decode an exact 80-byte serialized header.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, HeaderError> {
        if bytes.len() != HEADER_SIZE {
            return Err(HeaderError::InvalidHeaderLength(bytes.len()));
        }

        let version = read_u32_le(&bytes[0..4]) as i32;
        let timestamp = read_u32_le(&bytes[68..72]);
        let bits = read_u32_le(&bytes[72..76]);
        let nonce = read_u32_le(&bytes[76..80]);

        Self::with_nonce(version, &bytes[4..36], &bytes[36..68], timestamp, bits, nonce)
    }

    /// Serialize the block header to 80 bytes.
    ///
    /// Reassembled from the cached prefix on every call, since the nonce
    /// may have changed.
    pub fn serialize(&self) -> [u8; HEADER_SIZE] {
        let mut header = [0u8; HEADER_SIZE];
        header[..HEADER_PREFIX_SIZE].copy_from_slice(&self.prefix);

        // Nonce (4 bytes, little-endian)
        header[HEADER_PREFIX_SIZE..].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    /// The cached 76-byte serialized prefix (everything except the nonce).
    pub fn prefix(&self) -> &[u8; HEADER_PREFIX_SIZE] {
        &self.prefix
    }

    /// Compute the block hash: double SHA256 of the serialized header,
    /// byte-reversed into display order.
    pub fn hash(&self) -> [u8; 32] {
        reverse_bytes(&double_sha256(&self.serialize()))
    }

    /// Check the proof of work: the raw digest, read as a little-endian
    /// 256-bit integer, must be strictly below the decoded target.
    pub fn is_valid(&self) -> bool {
        clears_target(&double_sha256(&self.serialize()), &self.threshold)
    }

    /// Block version.
    pub fn version(&self) -> i32 {
        self.version
    }

    /// Hash of the previous block, internal byte order.
    pub fn previous_hash(&self) -> &[u8; 32] {
        &self.previous_hash
    }

    /// Merkle root committed by this header, internal byte order.
    pub fn merkle_root(&self) -> &[u8; 32] {
        &self.merkle_root
    }

    /// Block timestamp (Unix time).
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Difficulty target in compact "bits" format.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Real-valued decoding of the compact target.
    pub fn maximum_value(&self) -> f64 {
        self.maximum_value
    }

    /// Difficulty relative to the reference maximum target.
    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Exact 256-bit threshold the proof of work is checked against.
    pub fn threshold(&self) -> &U256 {
        &self.threshold
    }
}

fn hash_field(field: &'static str, bytes: &[u8]) -> Result<[u8; 32], HeaderError> {
    bytes.try_into().map_err(|_| HeaderError::InvalidFieldLength {
        field,
        len: bytes.len(),
    })
}

fn read_u32_le(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}
