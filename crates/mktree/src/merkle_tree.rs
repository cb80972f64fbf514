//! Mutable Merkle tree over a sequence of data blocks.

use std::fmt;
use std::sync::Arc;

use tracing::*;

use crate::error::{MerkleTreeError, MerkleTreeResult};
use crate::hasher::{MerkleHash, MerkleHasher};
use crate::leaves::LeafSequence;
use crate::proof::{MerkleProof, compute_root};
use crate::traversal::TreeLevel;
use crate::tree::BinaryMerkleTree;

/// Merkle tree that tracks an ordered sequence of data blocks and can be
/// updated after construction.
///
/// The [`LeafSequence`] is authoritative.  Every mutation changes it and then
/// rebuilds the whole tree from it, publishing the result as a fresh
/// [`BinaryMerkleTree`] snapshot.  Snapshots handed out earlier are never
/// touched, so a reader holding one keeps a consistent leaves-and-root pair.
pub struct MerkleTree<MH: MerkleHasher> {
    leaves: LeafSequence<MH::Hash>,
    tree: Arc<BinaryMerkleTree<MH>>,
}

impl<MH: MerkleHasher> MerkleTree<MH> {
    /// Constructs a tree over `blocks`, in order.
    ///
    /// Fails with [`MerkleTreeError::EmptyTree`] if there are no blocks.
    pub fn new<I, B>(blocks: I) -> MerkleTreeResult<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        Self::from_leaf_sequence(LeafSequence::from_blocks::<MH, _, _>(blocks))
    }

    /// Constructs a tree from already hashed leaves.
    pub fn from_leaf_sequence(leaves: LeafSequence<MH::Hash>) -> MerkleTreeResult<Self> {
        let tree = Arc::new(BinaryMerkleTree::from_leaves(leaves.as_slice())?);
        debug!(leaves = leaves.len(), root = %hex::encode(tree.root()), "constructed merkle tree");
        Ok(Self { leaves, tree })
    }

    /// Returns the current root digest.
    pub fn root(&self) -> MH::Hash {
        self.tree.root()
    }

    /// Returns the current tree snapshot.
    pub fn snapshot(&self) -> Arc<BinaryMerkleTree<MH>> {
        self.tree.clone()
    }

    /// Returns the current tree without bumping the refcount.
    pub fn tree(&self) -> &BinaryMerkleTree<MH> {
        &self.tree
    }

    /// Returns the leaf sequence.
    pub fn leaves(&self) -> &LeafSequence<MH::Hash> {
        &self.leaves
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    /// Always false, a tree keeps at least one leaf.
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Height of the current tree.
    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Position of the first leaf for `block`, if tracked.
    pub fn index_of(&self, block: &[u8]) -> Option<usize> {
        self.leaves.position_of(&MH::hash_leaf(block))
    }

    /// Returns if some leaf is the digest of `block`.
    pub fn contains(&self, block: &[u8]) -> bool {
        self.index_of(block).is_some()
    }

    /// Generates a proof for `block` against the supplied tree.
    ///
    /// This doesn't look at any [`MerkleTree`] state, so it works with old
    /// snapshots as well as the current one.
    pub fn generate_proof(
        root: &BinaryMerkleTree<MH>,
        block: &[u8],
    ) -> MerkleTreeResult<MerkleProof<MH::Hash>> {
        root.gen_proof_for_block(block)
    }

    /// Generates a proof for `block` against the current root.
    pub fn prove(&self, block: &[u8]) -> MerkleTreeResult<MerkleProof<MH::Hash>> {
        Self::generate_proof(&self.tree, block)
    }

    /// Checks that `cohashes` proves `block` under `root`.
    ///
    /// The leaf position is taken from this tree's current leaf sequence by
    /// looking up the block's digest.  A block with no leaf fails to verify.
    pub fn verify_proof(&self, root: &MH::Hash, block: &[u8], cohashes: &[MH::Hash]) -> bool {
        let leaf = MH::hash_leaf(block);
        let Some(index) = self.leaves.position_of(&leaf) else {
            trace!(leaf = %hex::encode(leaf), "verifying proof for untracked block");
            return false;
        };

        let computed = compute_root::<MH>(&leaf, index as u64, cohashes);
        <MH::Hash as MerkleHash>::eq_ct(&computed, root)
    }

    /// Replaces the leaf for `target` with a leaf for `new_block`, keeping its
    /// position.
    pub fn update(&mut self, target: &[u8], new_block: &[u8]) -> MerkleTreeResult<()> {
        let index = self.require_index(target)?;
        self.leaves.replace(index, MH::hash_leaf(new_block));
        debug!(%index, "updated leaf");
        self.rebuild()
    }

    /// Appends a leaf for `block`.
    pub fn insert(&mut self, block: &[u8]) -> MerkleTreeResult<()> {
        self.leaves.push(MH::hash_leaf(block));
        debug!(index = self.leaves.len() - 1, "inserted leaf");
        self.rebuild()
    }

    /// Removes the leaf for `block`, shifting later leaves down by one.
    ///
    /// Fails with [`MerkleTreeError::EmptyTree`] and leaves the tree as it was
    /// if `block` is the only leaf.
    pub fn remove(&mut self, block: &[u8]) -> MerkleTreeResult<()> {
        let index = self.require_index(block)?;
        if self.leaves.len() == 1 {
            return Err(MerkleTreeError::EmptyTree);
        }

        self.leaves.remove(index);
        debug!(%index, "removed leaf");
        self.rebuild()
    }

    /// Lists the current tree's digests breadth-first, root first.
    pub fn levels(&self) -> Vec<TreeLevel<MH::Hash>> {
        self.tree.levels()
    }

    fn require_index(&self, block: &[u8]) -> MerkleTreeResult<usize> {
        let digest = MH::hash_leaf(block);
        self.leaves
            .position_of(&digest)
            .ok_or_else(|| MerkleTreeError::not_found(digest))
    }

    /// Rebuilds from the leaf sequence and swaps in the new snapshot.
    fn rebuild(&mut self) -> MerkleTreeResult<()> {
        let tree = BinaryMerkleTree::from_leaves(self.leaves.as_slice())?;
        debug!(leaves = self.leaves.len(), root = %hex::encode(tree.root()), "rebuilt merkle tree");
        self.tree = Arc::new(tree);
        Ok(())
    }
}

impl<MH: MerkleHasher> Clone for MerkleTree<MH> {
    fn clone(&self) -> Self {
        Self {
            leaves: self.leaves.clone(),
            tree: self.tree.clone(),
        }
    }
}

impl<MH: MerkleHasher> fmt::Debug for MerkleTree<MH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("leaves", &self.leaves.len())
            .field("root", &hex::encode(self.root()))
            .finish()
    }
}
