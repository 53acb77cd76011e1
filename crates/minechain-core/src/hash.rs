//! SHA256 double-hashing and the sequential nonce scan.

use sha2::{Digest, Sha256};

use crate::header::{HEADER_PREFIX_SIZE, HEADER_SIZE};
use crate::target::clears_target;
use crate::U256;

/// Double SHA256: SHA256(SHA256(data)).
///
/// Used for block header hashing and merkle tree levels.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Reverse the byte order of a 32-byte array.
///
/// Hashes are displayed in reverse byte order relative to the raw digest.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = [0u8; 32];
    for i in 0..32 {
        reversed[i] = bytes[31 - i];
    }
    reversed
}

/// Result of a batch nonce scan.
#[derive(Debug, Clone)]
pub struct MiningResult {
    /// The nonce that produced a clearing hash (if found).
    pub nonce: Option<u32>,
    /// The resulting block hash in display byte order (if found).
    pub hash: Option<[u8; 32]>,
    /// Number of hashes computed in this batch.
    pub hashes_computed: u64,
}

impl MiningResult {
    /// Create a result indicating no clearing nonce was found.
    pub fn not_found(hashes: u64) -> Self {
        MiningResult {
            nonce: None,
            hash: None,
            hashes_computed: hashes,
        }
    }

    /// Create a result for a nonce that cleared the target.
    pub fn found(nonce: u32, hash: [u8; 32], hashes: u64) -> Self {
        MiningResult {
            nonce: Some(nonce),
            hash: Some(hash),
            hashes_computed: hashes,
        }
    }

    /// Whether this batch produced a clearing nonce.
    pub fn is_found(&self) -> bool {
        self.nonce.is_some()
    }
}

/// Scan a range of nonces over a fixed header prefix.
///
/// `prefix` is the 76-byte serialized header without the nonce. Each nonce
/// is patched into bytes 76-79 (little-endian), the full header is double
/// SHA256 hashed, and the digest is tested against `threshold`. The scan
/// stops at the first clearing nonce.
///
/// The range is `nonce_start..nonce_start + nonce_count`, clamped so it
/// never wraps; `u32::MAX` itself is reachable.
pub fn mine_batch(
    prefix: &[u8; HEADER_PREFIX_SIZE],
    threshold: &U256,
    nonce_start: u32,
    nonce_count: u32,
) -> MiningResult {
    if nonce_count == 0 {
        return MiningResult::not_found(0);
    }

    // Pre-allocate the full 80-byte header
    let mut header = [0u8; HEADER_SIZE];
    header[..HEADER_PREFIX_SIZE].copy_from_slice(prefix);

    let last = nonce_start.saturating_add(nonce_count - 1);
    let mut nonce = nonce_start;
    loop {
        // Set the nonce (little-endian at bytes 76-79)
        header[HEADER_PREFIX_SIZE..].copy_from_slice(&nonce.to_le_bytes());

        let digest = double_sha256(&header);
        if clears_target(&digest, threshold) {
            let scanned = u64::from(nonce - nonce_start) + 1;
            return MiningResult::found(nonce, reverse_bytes(&digest), scanned);
        }

        if nonce == last {
            break;
        }
        nonce += 1;
    }

    MiningResult::not_found(u64::from(last - nonce_start) + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::compact_to_target;

    #[test]
    fn test_double_sha256() {
        // Test vector: SHA256d("hello")
        let data = b"hello";
        let hash = double_sha256(data);

        let expected = hex::decode(
            "9595c9df90075148eb06860365df33584b75bff782a510c6cd4883a419833d50"
        ).unwrap();

        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_single_sha256() {
        let hash = sha256(b"hello");
        let expected = hex::decode(
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        ).unwrap();

        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_reverse_bytes() {
        let original = [
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08,
            0x09, 0x0A, 0x0B, 0x0C, 0x0D, 0x0E, 0x0F, 0x10,
            0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18,
            0x19, 0x1A, 0x1B, 0x1C, 0x1D, 0x1E, 0x1F, 0x20,
        ];
        let reversed = reverse_bytes(&original);

        assert_eq!(reversed[0], 0x20);
        assert_eq!(reversed[31], 0x01);
        assert_eq!(reverse_bytes(&reversed), original);
    }

    #[test]
    fn test_mine_batch_finds_known_nonce() {
        // For an all-zero prefix, nonce 3475 is the first whose hash
        // clears the 0x1f00ffff target.
        let prefix = [0u8; HEADER_PREFIX_SIZE];
        let threshold = compact_to_target(0x1f00ffff);

        let result = mine_batch(&prefix, &threshold, 0, 10_000);
        assert_eq!(result.nonce, Some(3475));
        assert_eq!(result.hashes_computed, 3476);
        assert!(result.is_found());

        let hash = result.hash.unwrap();
        assert_eq!(
            hex::encode(hash),
            "0000095f581ca1527af91df163f9d36dc7d8099a303a8c51f195ef4ed1bc6bed"
        );
    }

    #[test]
    fn test_mine_batch_stops_short_of_solution() {
        let prefix = [0u8; HEADER_PREFIX_SIZE];
        let threshold = compact_to_target(0x1f00ffff);

        // Range ends one nonce before the known solution.
        let result = mine_batch(&prefix, &threshold, 0, 3475);
        assert_eq!(result.nonce, None);
        assert_eq!(result.hash, None);
        assert_eq!(result.hashes_computed, 3475);
        assert!(!result.is_found());
    }

    #[test]
    fn test_mine_batch_mid_range_start() {
        let prefix = [0u8; HEADER_PREFIX_SIZE];
        let threshold = compact_to_target(0x1f00ffff);

        let result = mine_batch(&prefix, &threshold, 3000, 1000);
        assert_eq!(result.nonce, Some(3475));
        assert_eq!(result.hashes_computed, 476);
    }

    #[test]
    fn test_mine_batch_reaches_top_of_nonce_space() {
        let prefix = [0u8; HEADER_PREFIX_SIZE];
        // Threshold of 1: only an all-zero digest would clear it.
        let threshold = compact_to_target(0x03000001);

        let result = mine_batch(&prefix, &threshold, u32::MAX - 3, 4);
        assert_eq!(result.nonce, None);
        assert_eq!(result.hashes_computed, 4);
    }

    #[test]
    fn test_mine_batch_empty_range() {
        let prefix = [0u8; HEADER_PREFIX_SIZE];
        let threshold = compact_to_target(0x1f00ffff);

        let result = mine_batch(&prefix, &threshold, 0, 0);
        assert_eq!(result.nonce, None);
        assert_eq!(result.hashes_computed, 0);
    }
}
