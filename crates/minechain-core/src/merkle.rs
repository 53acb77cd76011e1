//! Merkle tree commitment over an ordered transaction set.

use thiserror::Error;

use crate::hash::double_sha256;

/// One level of the tree, leaves first. Entries in every level above the
/// leaves are 32-byte digests; the leaf level holds whatever byte strings
/// the transactions were.
pub type MerkleLayer = Vec<Vec<u8>>;

/// Errors from building a merkle tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerkleError {
    /// The transaction set was empty.
    #[error("cannot build a merkle tree from an empty transaction set")]
    EmptyTransactionSet,
}

/// A fully materialized merkle tree, retaining every level from the
/// leaves up to the root.
///
/// Byte conventions follow the reference network: transactions enter the
/// leaf level byte-reversed, interior nodes are the double SHA256 of the
/// concatenated pair, and the finished root is reversed back into display
/// order. A tree over a single transaction is that transaction untouched,
/// with no reversal and no hashing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleTree {
    layers: Vec<MerkleLayer>,
}

impl MerkleTree {
    /// The commitment root.
    pub fn root(&self) -> &[u8] {
        // The top layer always holds exactly one entry.
        &self.layers[self.layers.len() - 1][0]
    }

    /// Every level of the tree, leaves first.
    pub fn layers(&self) -> &[MerkleLayer] {
        &self.layers
    }

    /// Number of levels, leaves and root included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }
}

/// Build the merkle tree for an ordered, non-empty transaction set.
///
/// Transactions are opaque byte strings of any length; ordering is
/// significant and duplicates are allowed.
pub fn build_merkle_tree(transactions: &[Vec<u8>]) -> Result<MerkleTree, MerkleError> {
    if transactions.is_empty() {
        return Err(MerkleError::EmptyTransactionSet);
    }

    // A lone transaction passes through as the root, byte for byte.
    if transactions.len() == 1 {
        return Ok(MerkleTree {
            layers: vec![vec![transactions[0].clone()]],
        });
    }

    let leaves: MerkleLayer = transactions
        .iter()
        .map(|tx| tx.iter().rev().copied().collect())
        .collect();
    let mut layers = vec![leaves];

    while layers[layers.len() - 1].len() > 1 {
        let depth = layers.len() - 1;

        // If odd number of elements, duplicate the last one. The
        // duplicate stays in the stored layer.
        let layer = &mut layers[depth];
        if layer.len() % 2 != 0 {
            let last = layer[layer.len() - 1].clone();
            layer.push(last);
        }

        let layer = &layers[depth];
        let mut next = Vec::with_capacity(layer.len() / 2);
        for pair in layer.chunks_exact(2) {
            // Concatenate and hash
            let mut combined = Vec::with_capacity(pair[0].len() + pair[1].len());
            combined.extend_from_slice(&pair[0]);
            combined.extend_from_slice(&pair[1]);
            next.push(double_sha256(&combined).to_vec());
        }
        layers.push(next);
    }

    // The finished root is stored in display byte order.
    let top = layers.len() - 1;
    layers[top][0].reverse();

    Ok(MerkleTree { layers })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::reverse_bytes;

    #[test]
    fn test_empty_set_rejected() {
        let result = build_merkle_tree(&[]);
        assert_eq!(result, Err(MerkleError::EmptyTransactionSet));
    }

    #[test]
    fn test_single_transaction_passthrough() {
        // Any length, no hashing and no reversal.
        let tx = b"coffee".to_vec();
        let tree = build_merkle_tree(&[tx.clone()]).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.root(), tx.as_slice());
    }

    #[test]
    fn test_single_32_byte_transaction() {
        let tx = vec![0x42u8; 32];
        let tree = build_merkle_tree(&[tx.clone()]).unwrap();
        assert_eq!(tree.root(), tx.as_slice());
    }

    #[test]
    fn test_two_transaction_root() {
        let tx1 = vec![0x11u8; 32];
        let tx2 = vec![0x22u8; 32];

        let tree = build_merkle_tree(&[tx1.clone(), tx2.clone()]).unwrap();

        assert_eq!(tree.depth(), 2);
        assert_eq!(
            hex::encode(tree.root()),
            "ba982c0808a9a03c4e958ae612516f85faac3780dcb34d9ab83ceeaf74b54011"
        );

        // Manually compute expected root: reverse both transactions,
        // hash the concatenation, reverse the digest.
        let mut combined = [0u8; 64];
        let mut rev1 = [0u8; 32];
        rev1.copy_from_slice(&tx1);
        let mut rev2 = [0u8; 32];
        rev2.copy_from_slice(&tx2);
        combined[..32].copy_from_slice(&reverse_bytes(&rev1));
        combined[32..].copy_from_slice(&reverse_bytes(&rev2));
        let expected = reverse_bytes(&double_sha256(&combined));

        assert_eq!(tree.root(), expected.as_slice());
    }

    #[test]
    fn test_short_transactions() {
        // Leaves are not digests; single-byte payloads work fine.
        let tree = build_merkle_tree(&[vec![0xaa], vec![0xbb]]).unwrap();

        assert_eq!(tree.layers()[0], vec![vec![0xaa], vec![0xbb]]);
        assert_eq!(
            hex::encode(tree.root()),
            "33926e3aaef60944091ea5a124de5f4f3a23ee010634249a56e4034bfa1358f1"
        );
    }

    #[test]
    fn test_odd_set_duplicates_last() {
        // With 3 transactions, the third is duplicated; the duplicate is
        // visible in the stored leaf layer.
        let txs = vec![vec![0x11u8; 32], vec![0x22u8; 32], vec![0x33u8; 32]];
        let tree = build_merkle_tree(&txs).unwrap();

        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.layers()[0].len(), 4);
        assert_eq!(tree.layers()[0][2], tree.layers()[0][3]);
        assert_eq!(tree.layers()[1].len(), 2);
        assert_eq!(
            hex::encode(tree.root()),
            "e6f5f3a082e7117eca9f5b077b5f9e08a64c213c92f4b6377af3825e5c89cdca"
        );
    }

    #[test]
    fn test_four_transaction_tree() {
        let txs = vec![
            vec![0x11u8; 32],
            vec![0x22u8; 32],
            vec![0x33u8; 32],
            vec![0x44u8; 32],
        ];
        let tree = build_merkle_tree(&txs).unwrap();

        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.layers()[0].len(), 4);
        assert_eq!(tree.layers()[1].len(), 2);
        assert_eq!(tree.layers()[2].len(), 1);
        assert_eq!(
            hex::encode(tree.root()),
            "94f4bc8f37716b47234bcfa62a03b2c75ae43c28c52244d38777d48504a28523"
        );
    }

    #[test]
    fn test_leaf_layer_is_byte_reversed() {
        let tx1 = vec![0x01u8, 0x02, 0x03];
        let tx2 = vec![0x0au8, 0x0b];
        let tree = build_merkle_tree(&[tx1, tx2]).unwrap();

        assert_eq!(tree.layers()[0][0], vec![0x03, 0x02, 0x01]);
        assert_eq!(tree.layers()[0][1], vec![0x0b, 0x0a]);
    }

    #[test]
    fn test_deterministic_for_same_input() {
        let txs = vec![vec![0xaau8; 7], vec![0xbbu8; 32], vec![0xccu8; 1]];
        let first = build_merkle_tree(&txs).unwrap();
        let second = build_merkle_tree(&txs).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_order_changes_root() {
        let a = build_merkle_tree(&[vec![0x11u8; 32], vec![0x22u8; 32]]).unwrap();
        let b = build_merkle_tree(&[vec![0x22u8; 32], vec![0x11u8; 32]]).unwrap();
        assert_ne!(a.root(), b.root());
    }
}
