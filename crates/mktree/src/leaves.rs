//! The ordered leaf sequence every tree is derived from.

use crate::hasher::{MerkleHash, MerkleHasher};

/// Ordered sequence of leaf digests, one per tracked data block, in insertion
/// order.
///
/// This is the source of truth for a [`MerkleTree`](crate::MerkleTree); the
/// built tree is a projection of it and gets rebuilt whenever it changes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeafSequence<H: MerkleHash> {
    digests: Vec<H>,
}

impl<H: MerkleHash> LeafSequence<H> {
    /// Constructs a sequence from already computed leaf digests.
    pub fn new(digests: Vec<H>) -> Self {
        Self { digests }
    }

    /// Hashes each block with `MH` and collects the leaf digests.
    pub fn from_blocks<MH, I, B>(blocks: I) -> Self
    where
        MH: MerkleHasher<Hash = H>,
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let digests = blocks
            .into_iter()
            .map(|b| MH::hash_leaf(b.as_ref()))
            .collect();
        Self { digests }
    }

    /// Number of leaves.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    /// Returns if there are no leaves.
    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Gets the leaf digest at `index`.
    pub fn get(&self, index: usize) -> Option<&H> {
        self.digests.get(index)
    }

    /// Returns the leaf digests in order.
    pub fn as_slice(&self) -> &[H] {
        &self.digests
    }

    /// Iterates over the leaf digests in order.
    pub fn iter(&self) -> impl Iterator<Item = &H> + '_ {
        self.digests.iter()
    }

    /// Position of the first leaf whose digest equals `digest`.
    ///
    /// Both mutation and proof verification locate leaves through this, so a
    /// block always maps to the same position everywhere.
    pub fn position_of(&self, digest: &H) -> Option<usize> {
        self.digests.iter().position(|d| H::eq_ct(d, digest))
    }

    /// Replaces the leaf at `index`, returning the old digest.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn replace(&mut self, index: usize, digest: H) -> H {
        std::mem::replace(&mut self.digests[index], digest)
    }

    /// Appends a leaf.
    pub fn push(&mut self, digest: H) {
        self.digests.push(digest);
    }

    /// Removes the leaf at `index`, shifting later leaves down by one.
    ///
    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> H {
        self.digests.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::LeafSequence;
    use crate::{MerkleHasher, Sha256Hasher};

    #[test]
    fn position_of_finds_first_duplicate() {
        let seq = LeafSequence::from_blocks::<Sha256Hasher, _, _>(["a", "b", "a"]);
        let a = Sha256Hasher::hash_leaf(b"a");
        assert_eq!(seq.position_of(&a), Some(0));
        assert_eq!(seq.position_of(&Sha256Hasher::hash_leaf(b"z")), None);
    }

    #[test]
    fn remove_shifts_positions() {
        let mut seq = LeafSequence::from_blocks::<Sha256Hasher, _, _>(["a", "b", "c"]);
        let c = Sha256Hasher::hash_leaf(b"c");
        assert_eq!(seq.position_of(&c), Some(2));

        seq.remove(0);
        assert_eq!(seq.len(), 2);
        assert_eq!(seq.position_of(&c), Some(1));
    }

    #[test]
    fn replace_in_place() {
        let mut seq = LeafSequence::from_blocks::<Sha256Hasher, _, _>(["a", "b"]);
        let e = Sha256Hasher::hash_leaf(b"e");
        let old = seq.replace(1, e);
        assert_eq!(old, Sha256Hasher::hash_leaf(b"b"));
        assert_eq!(seq.get(1), Some(&e));
        assert_eq!(seq.len(), 2);
    }
}
