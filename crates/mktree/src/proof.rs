//! Inclusion proof types and the root recomputation they are checked with.

use tracing::*;

use crate::hasher::{MerkleHash, MerkleHasher};

/// Recomputes the root reached by folding `cohashes` into `leaf`, starting at
/// leaf position `index`.
///
/// At each level an even position means the running digest is a left child
/// (`H(cur || sibling)`), an odd one that it is a right child
/// (`H(sibling || cur)`).  The position is then halved to get the parent's
/// position in the level above.  This is the exact pairing rule the tree
/// builder uses, padding included: a lone last node at an even position is
/// paired with its own digest, which is also what the proof carries for it.
pub fn compute_root<MH>(leaf: &MH::Hash, index: u64, cohashes: &[MH::Hash]) -> MH::Hash
where
    MH: MerkleHasher,
{
    let mut cur = *leaf;
    let mut idx = index;
    for co in cohashes {
        cur = if idx % 2 == 0 {
            MH::hash_node(cur, *co)
        } else {
            MH::hash_node(*co, cur)
        };
        idx /= 2;
    }

    cur
}

/// Proof for an entry in a tree.
///
/// If the tree that produced this proof is updated, then this proof has to
/// be regenerated as well.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MerkleProof<H>
where
    H: MerkleHash,
{
    /// Sibling hashes required for proof.
    inner: RawMerkleProof<H>,

    /// Index of the leaf for which this proof is for.
    index: u64,
}

impl<H: MerkleHash> MerkleProof<H> {
    /// Constructs a new instance from the path.
    pub fn from_cohashes(cohashes: Vec<H>, index: u64) -> Self {
        Self {
            inner: RawMerkleProof::new(cohashes),
            index,
        }
    }

    /// Exposes the raw inner proof.
    pub fn inner_raw(&self) -> &RawMerkleProof<H> {
        &self.inner
    }

    /// Returns the cohash path for this proof, leaf to root.
    pub fn cohashes(&self) -> &[H] {
        self.inner.cohashes()
    }

    /// Returns the leaf index this proof is for.
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Discards the index and returns the raw merkle proof.
    pub fn into_raw(self) -> RawMerkleProof<H> {
        self.inner
    }

    /// Computes the root obtained by applying this proof to `leaf`.
    ///
    /// The caller specifies the merkle hasher implementation via `MH`.
    pub fn compute_root<MH>(&self, leaf: &H) -> H
    where
        MH: MerkleHasher<Hash = H>,
    {
        compute_root::<MH>(leaf, self.index, self.cohashes())
    }

    /// Verifies this proof for `leaf` against the expected `root`.
    pub fn verify_with_root<MH>(&self, root: &H, leaf: &H) -> bool
    where
        MH: MerkleHasher<Hash = H>,
    {
        let computed = self.compute_root::<MH>(leaf);
        let ok = H::eq_ct(&computed, root);
        if !ok {
            trace!(index = self.index, depth = self.cohashes().len(), "proof root mismatch");
        }
        ok
    }
}

/// Raw proof for some entry in a tree.
///
/// This doesn't include the index of the entry being proven, which makes this
/// useful in contexts where we establish that value separately, such as
/// looking the leaf up in a [`LeafSequence`](crate::LeafSequence).
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RawMerkleProof<H>
where
    H: MerkleHash,
{
    cohashes: Vec<H>,
}

impl<H: MerkleHash> RawMerkleProof<H> {
    /// Creates a new raw proof from a cohash path.
    pub fn new(cohashes: Vec<H>) -> Self {
        Self { cohashes }
    }

    /// Returns the cohash path in this proof.
    pub fn cohashes(&self) -> &[H] {
        &self.cohashes
    }

    /// Number of levels this proof climbs.
    pub fn len(&self) -> usize {
        self.cohashes.len()
    }

    /// Returns if the proof is empty, as it is for a single-leaf tree.
    pub fn is_empty(&self) -> bool {
        self.cohashes.is_empty()
    }

    /// Takes an index that this merkle proof is allegedly for and constructs a
    /// full proof using the cohash path we have.
    pub fn into_indexed(self, idx: u64) -> MerkleProof<H> {
        MerkleProof::from_cohashes(self.cohashes, idx)
    }
}
