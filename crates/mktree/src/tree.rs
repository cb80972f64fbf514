//! Binary Merkle tree over an ordered leaf sequence, stored level by level.
//!
//! Level 0 holds the leaf digests and every following level holds the parents
//! of the one below it, ending in a single root.  Parent of position `i` is at
//! `i / 2`, its sibling at `i ^ 1`, so walking from a leaf to the root is pure
//! index arithmetic.
//!
//! When a level has odd length its last node is paired with a duplicate of
//! itself: the parent is `H(d || d)`.  The duplicate isn't stored, it is
//! implied by the level's length.

use std::fmt;
use std::marker::PhantomData;

use tracing::*;

use crate::error::{MerkleTreeError, MerkleTreeResult};
use crate::hasher::{MerkleHash, MerkleHasher};
use crate::node::NodeRef;
use crate::proof::MerkleProof;
use crate::traversal::{self, TreeLevel};

/// Immutable binary Merkle tree backed by in-memory levels.
///
/// Construction duplicates the last node when a level has odd length.  Always
/// has at least one leaf.
pub struct BinaryMerkleTree<MH: MerkleHasher> {
    /// Level 0 is leaves; last level has a single root.
    levels: Vec<Vec<MH::Hash>>,
    _pd: PhantomData<MH>,
}

impl<MH: MerkleHasher> BinaryMerkleTree<MH> {
    /// Builds a tree from leaf hashes.
    ///
    /// A single leaf is its own root, with no combination step.  Fails with
    /// [`MerkleTreeError::EmptyTree`] if `leaves` is empty.
    pub fn from_leaves(leaves: &[MH::Hash]) -> MerkleTreeResult<Self> {
        if leaves.is_empty() {
            return Err(MerkleTreeError::EmptyTree);
        }

        let mut levels = vec![leaves.to_vec()];
        while let Some(prev) = levels.last().filter(|lvl| lvl.len() > 1) {
            let next = build_parent_level::<MH>(prev);
            levels.push(next);
        }
        trace!(leaves = leaves.len(), height = levels.len() - 1, "built merkle tree");

        Ok(Self {
            levels,
            _pd: PhantomData,
        })
    }

    /// Hashes each block into a leaf, then builds the tree.
    pub fn from_blocks<I, B>(blocks: I) -> MerkleTreeResult<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let leaves: Vec<_> = blocks
            .into_iter()
            .map(|b| MH::hash_leaf(b.as_ref()))
            .collect();
        Self::from_leaves(&leaves)
    }

    /// Returns the root hash.
    pub fn root(&self) -> MH::Hash {
        // Construction guarantees the last level is the single root.
        self.levels[self.levels.len() - 1][0]
    }

    /// Returns a view of the root node.
    pub fn root_node(&self) -> NodeRef<'_, MH::Hash> {
        NodeRef::root(&self.levels)
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    /// Number of combination steps between the leaves and the root, which is
    /// `ceil(log2(leaf_count))`.
    pub fn height(&self) -> usize {
        self.levels.len() - 1
    }

    /// Returns the leaf digests in order.
    pub fn leaves(&self) -> &[MH::Hash] {
        &self.levels[0]
    }

    /// Returns the stored digests at `level`, 0 being the leaves.  Padding
    /// duplicates are not included.
    pub fn level(&self, level: usize) -> Option<&[MH::Hash]> {
        self.levels.get(level).map(Vec::as_slice)
    }

    /// Position of the leftmost leaf with the given digest.
    ///
    /// Only level 0 is searched.  Padding duplicates above it are leaf-shaped
    /// but are never returned, even when a block hashes to their digest.
    pub fn leaf_index_of(&self, digest: &MH::Hash) -> Option<usize> {
        self.levels[0]
            .iter()
            .position(|d| <MH::Hash as MerkleHash>::eq_ct(d, digest))
    }

    /// Generates an inclusion proof for the leaf at `index`.
    ///
    /// Fails with [`MerkleTreeError::IndexOutOfBounds`] if there is no leaf at
    /// `index`.
    ///
    /// The proof lists the sibling digest at each level, from the leaf up to
    /// just below the root.  A node without a partner gets its own digest as
    /// the sibling, matching the duplicate used when building.
    pub fn gen_proof(&self, index: usize) -> MerkleTreeResult<MerkleProof<MH::Hash>> {
        let Some(leaf) = self.levels[0].get(index) else {
            return Err(MerkleTreeError::IndexOutOfBounds(index));
        };
        trace!(%index, leaf = %hex::encode(leaf), "generating proof");

        let mut idx = index;
        let mut path = Vec::with_capacity(self.height());
        for (level, (lvl, parent)) in self.levels.iter().zip(&self.levels[1..]).enumerate() {
            if idx / 2 >= parent.len() {
                warn!(%level, %idx, "node has no parent in tree");
                return Err(MerkleTreeError::InvalidStructure { level, index: idx });
            }

            let sib_idx = idx ^ 1;
            let sibling = match lvl.get(sib_idx) {
                Some(s) => *s,
                // Only the last node of an odd level goes without a partner.
                None if sib_idx == lvl.len() => lvl[idx],
                None => {
                    warn!(%level, %idx, "node has no sibling in tree");
                    return Err(MerkleTreeError::InvalidStructure { level, index: idx });
                }
            };
            path.push(sibling);
            idx /= 2;
        }

        Ok(MerkleProof::from_cohashes(path, index as u64))
    }

    /// Generates an inclusion proof for a data block.
    ///
    /// The block is hashed into a leaf digest and the leftmost leaf with that
    /// digest is proven.  Fails with [`MerkleTreeError::NotFound`] if no leaf
    /// matches.
    pub fn gen_proof_for_block(&self, block: &[u8]) -> MerkleTreeResult<MerkleProof<MH::Hash>> {
        let digest = MH::hash_leaf(block);
        let index = self
            .leaf_index_of(&digest)
            .ok_or_else(|| MerkleTreeError::not_found(digest))?;
        self.gen_proof(index)
    }

    /// Verifies a `proof` for `leaf` against the provided `root`.
    pub fn verify_proof(
        root: &MH::Hash,
        proof: &MerkleProof<MH::Hash>,
        leaf: &MH::Hash,
    ) -> bool {
        proof.verify_with_root::<MH>(root, leaf)
    }

    /// Lists every vertex breadth-first from the root, padding duplicates
    /// included.
    pub fn levels(&self) -> Vec<TreeLevel<MH::Hash>> {
        traversal::levels(self.root_node())
    }
}

/// Combines one level into its parent level, left to right in pairs.
fn build_parent_level<MH: MerkleHasher>(prev: &[MH::Hash]) -> Vec<MH::Hash> {
    prev.chunks(2)
        .map(|pair| match *pair {
            [left, right] => MH::hash_node(left, right),
            [lone] => MH::hash_node(lone, lone),
            _ => unreachable!("tree: chunks(2) yields one or two nodes"),
        })
        .collect()
}

// Manual impls so we don't require the zero-sized hasher itself to be
// `Clone`/`Debug`.

impl<MH: MerkleHasher> Clone for BinaryMerkleTree<MH> {
    fn clone(&self) -> Self {
        Self {
            levels: self.levels.clone(),
            _pd: PhantomData,
        }
    }
}

impl<MH: MerkleHasher> fmt::Debug for BinaryMerkleTree<MH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryMerkleTree")
            .field("leaves", &self.leaf_count())
            .field("root", &hex::encode(self.root()))
            .finish()
    }
}

impl<MH: MerkleHasher> PartialEq for BinaryMerkleTree<MH> {
    fn eq(&self, other: &Self) -> bool {
        self.levels == other.levels
    }
}

impl<MH: MerkleHasher> Eq for BinaryMerkleTree<MH> {}

#[cfg(test)]
mod tests {
    use std::marker::PhantomData;

    use super::BinaryMerkleTree;
    use crate::error::MerkleTreeError;
    use crate::hasher::MerkleHasher;
    use crate::{Sha256Hasher, Sha256TaggedHasher};

    type H = [u8; 32];

    fn h(s: &str) -> H {
        Sha256Hasher::hash_leaf(s.as_bytes())
    }

    fn node(l: H, r: H) -> H {
        Sha256Hasher::hash_node(l, r)
    }

    fn make_blocks(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("block-{i}")).collect()
    }

    #[test]
    fn empty_tree() {
        let res = BinaryMerkleTree::<Sha256Hasher>::from_leaves(&[]);
        assert_eq!(res.unwrap_err(), MerkleTreeError::EmptyTree);
    }

    #[test]
    fn single_leaf_is_root() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["A"]).unwrap();
        assert_eq!(tree.root(), h("A"));
        assert_eq!(tree.height(), 0);

        let proof = tree.gen_proof(0).unwrap();
        assert!(proof.cohashes().is_empty());
        assert!(BinaryMerkleTree::<Sha256Hasher>::verify_proof(
            &tree.root(),
            &proof,
            &h("A")
        ));
    }

    #[test]
    fn three_leaves_duplicate_last() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["a", "b", "c"]).unwrap();
        let expected = node(node(h("a"), h("b")), node(h("c"), h("c")));
        assert_eq!(tree.root(), expected);
        assert_eq!(tree.height(), 2);
        assert_eq!(tree.level(1).unwrap().len(), 2);
    }

    #[test]
    fn five_leaves_pad_on_two_levels() {
        let tree =
            BinaryMerkleTree::<Sha256Hasher>::from_blocks(["a", "b", "c", "d", "e"]).unwrap();

        let ab = node(h("a"), h("b"));
        let cd = node(h("c"), h("d"));
        let ee = node(h("e"), h("e"));
        let abcd = node(ab, cd);
        let eeee = node(ee, ee);
        assert_eq!(tree.root(), node(abcd, eeee));
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn height_is_ceil_log2() {
        for (n, height) in [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4)] {
            let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(make_blocks(n)).unwrap();
            assert_eq!(tree.height(), height, "n = {n}");
        }
    }

    #[test]
    fn build_and_verify() {
        for n in 1..=17 {
            let blocks = make_blocks(n);
            let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(&blocks).unwrap();
            let root = tree.root();

            for (i, block) in blocks.iter().enumerate() {
                let proof = tree.gen_proof_for_block(block.as_bytes()).unwrap();
                assert_eq!(proof.index(), i as u64);
                assert_eq!(proof.cohashes().len(), tree.height());
                let leaf = Sha256Hasher::hash_leaf(block.as_bytes());
                assert!(BinaryMerkleTree::<Sha256Hasher>::verify_proof(
                    &root, &proof, &leaf
                ));
            }
        }
    }

    #[test]
    fn lone_node_proof_carries_own_digest() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["a", "b", "c"]).unwrap();
        let proof = tree.gen_proof(2).unwrap();
        assert_eq!(proof.cohashes(), &[h("c"), node(h("a"), h("b"))]);
    }

    #[test]
    fn proof_for_missing_block() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["a", "b"]).unwrap();
        let err = tree.gen_proof_for_block(b"zzz").unwrap_err();
        assert_eq!(
            err,
            MerkleTreeError::NotFound {
                digest: hex::encode(h("zzz"))
            }
        );
    }

    #[test]
    fn proof_index_past_leaves() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["a", "b"]).unwrap();
        assert!(tree.gen_proof(1).is_ok());
        for index in [2, 5, usize::MAX] {
            let err = tree.gen_proof(index).unwrap_err();
            assert_eq!(err, MerkleTreeError::IndexOutOfBounds(index));
            assert_eq!(err.to_string(), format!("leaf index {index} out of bounds"));
        }
    }

    #[test]
    fn padding_digest_is_not_a_leaf() {
        let blocks = ["a", "b", "c", "d", "e"];
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(blocks).unwrap();

        // Level 1 is [ab, cd, ee], so its padding duplicate carries H(e || e).
        // A block made of the two leaf digests hashes to that same value.
        let ee = node(h("e"), h("e"));
        assert_eq!(tree.level(1).unwrap()[2], ee);
        let forged = [h("e"), h("e")].concat();
        assert_eq!(Sha256Hasher::hash_leaf(&forged), ee);

        assert_eq!(tree.leaf_index_of(&ee), None);
        assert_eq!(
            tree.gen_proof_for_block(&forged).unwrap_err(),
            MerkleTreeError::NotFound {
                digest: hex::encode(ee)
            }
        );
    }

    #[test]
    fn duplicate_blocks_prove_leftmost() {
        let tree = BinaryMerkleTree::<Sha256Hasher>::from_blocks(["x", "y", "x"]).unwrap();
        let proof = tree.gen_proof_for_block(b"x").unwrap();
        assert_eq!(proof.index(), 0);
    }

    #[test]
    fn broken_levels_are_rejected() {
        let (a, b, c, d) = (h("a"), h("b"), h("c"), h("d"));
        // Four leaves but only one parent where two are required.
        let tree = BinaryMerkleTree::<Sha256Hasher> {
            levels: vec![vec![a, b, c, d], vec![node(a, b)]],
            _pd: PhantomData,
        };
        assert_eq!(
            tree.gen_proof(3).unwrap_err(),
            MerkleTreeError::InvalidStructure { level: 0, index: 3 }
        );
        assert!(tree.gen_proof(0).is_ok());
    }

    #[test]
    fn tagged_hasher_round_trip() {
        let blocks = make_blocks(6);
        let tree = BinaryMerkleTree::<Sha256TaggedHasher>::from_blocks(&blocks).unwrap();
        let plain = BinaryMerkleTree::<Sha256Hasher>::from_blocks(&blocks).unwrap();
        assert_ne!(tree.root(), plain.root());

        let proof = tree.gen_proof_for_block(b"block-5").unwrap();
        let leaf = Sha256TaggedHasher::hash_leaf(b"block-5");
        assert!(proof.verify_with_root::<Sha256TaggedHasher>(&tree.root(), &leaf));
    }
}
