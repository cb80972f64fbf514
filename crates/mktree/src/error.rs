use thiserror::Error;

/// Errors from building, proving against, or mutating a Merkle tree.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum MerkleTreeError {
    /// No leaf carries the digest of the requested block.
    #[error("no leaf for digest {digest}")]
    NotFound {
        /// Hex encoding of the digest that was looked up.
        digest: String,
    },

    /// Leaf index provided out of bounds.
    #[error("leaf index {0} out of bounds")]
    IndexOutOfBounds(usize),

    /// A node's parent position falls outside the level above it.  A tree
    /// produced by the builder never triggers this.
    #[error("invalid tree structure (level {level}, index {index})")]
    InvalidStructure {
        /// Level of the node whose parent is missing, 0 being the leaves.
        level: usize,
        /// Position of that node within its level.
        index: usize,
    },

    /// Tried to build a tree, or leave a tree, with no leaves.
    #[error("merkle tree needs at least one leaf")]
    EmptyTree,
}

impl MerkleTreeError {
    /// Constructs a [`MerkleTreeError::NotFound`] for some digest.
    pub(crate) fn not_found(digest: impl AsRef<[u8]>) -> Self {
        Self::NotFound {
            digest: hex::encode(digest),
        }
    }
}

/// Wrapper result type.
pub type MerkleTreeResult<T> = Result<T, MerkleTreeError>;
