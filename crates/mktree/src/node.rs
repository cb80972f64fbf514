//! Node view over a built tree.

use std::fmt;

use crate::hasher::MerkleHash;

/// Borrowed view of one vertex of a [`BinaryMerkleTree`](crate::BinaryMerkleTree).
///
/// Nodes are never mutated; a rebuild produces a new tree and old views stay
/// tied to the tree they were taken from.  An internal node always has two
/// children.  When a level has odd length, the right child of its last
/// parent is a padding node: leaf-shaped, carrying the same digest as its
/// left sibling, but a distinct vertex.
#[derive(Copy, Clone)]
pub struct NodeRef<'t, H: MerkleHash> {
    levels: &'t [Vec<H>],
    level: usize,
    index: usize,
    digest: H,
    padding: bool,
}

impl<'t, H: MerkleHash> NodeRef<'t, H> {
    /// View of the single node in the top level.
    ///
    /// `levels` must be non-empty with a single-node top level, as built by
    /// the tree.
    pub(crate) fn root(levels: &'t [Vec<H>]) -> Self {
        let level = levels.len() - 1;
        Self {
            levels,
            level,
            index: 0,
            digest: levels[level][0],
            padding: false,
        }
    }

    /// Gets the node's digest.
    pub fn digest(&self) -> &H {
        &self.digest
    }

    /// Height above the leaves, 0 for leaves.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Position within its level.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns if this is a padding duplicate rather than a stored node.
    pub fn is_padding(&self) -> bool {
        self.padding
    }

    /// Returns if the node has no children.
    pub fn is_leaf(&self) -> bool {
        self.level == 0 || self.padding
    }

    /// Left child, if internal.
    pub fn left(&self) -> Option<Self> {
        self.children().map(|(l, _)| l)
    }

    /// Right child, if internal.
    pub fn right(&self) -> Option<Self> {
        self.children().map(|(_, r)| r)
    }

    /// Both children, if internal.
    pub fn children(&self) -> Option<(Self, Self)> {
        if self.is_leaf() {
            return None;
        }

        let below = self.level - 1;
        let lvl = &self.levels[below];
        let li = self.index * 2;
        let ri = li + 1;

        let left = self.stored(below, li, lvl[li]);
        let right = match lvl.get(ri) {
            Some(d) => self.stored(below, ri, *d),
            None => Self {
                index: ri,
                padding: true,
                ..left
            },
        };

        Some((left, right))
    }

    fn stored(&self, level: usize, index: usize, digest: H) -> Self {
        Self {
            levels: self.levels,
            level,
            index,
            digest,
            padding: false,
        }
    }
}

impl<H: MerkleHash> fmt::Debug for NodeRef<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("level", &self.level)
            .field("index", &self.index)
            .field("digest", &hex::encode(self.digest))
            .field("padding", &self.padding)
            .finish()
    }
}
