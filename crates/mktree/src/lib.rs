//! Binary Merkle tree over an ordered sequence of data blocks, with inclusion
//! proofs against a single root digest.
//!
//! ```rust,ignore
//! use mktree::{MerkleHasher, Sha256Hasher, Sha256MerkleTree};
//!
//! let mut tree = Sha256MerkleTree::new(["A", "B", "C", "D"])?;
//! let proof = tree.prove(b"C")?;
//! assert!(tree.verify_proof(&tree.root(), b"C", proof.cohashes()));
//!
//! // Proofs also carry their leaf index, so they can be checked with only
//! // the root at hand.
//! let leaf = Sha256Hasher::hash_leaf(b"C");
//! assert!(proof.verify_with_root::<Sha256Hasher>(&tree.root(), &leaf));
//!
//! tree.update(b"C", b"E")?;
//! assert!(tree.prove(b"C").is_err());
//! # Ok::<(), mktree::MerkleTreeError>(())
//! ```
//!
//! Modules:
//! - `hasher`: hash and hasher traits, digest-backed hashers
//! - `leaves`: the leaf sequence trees are built from
//! - `tree`: [`BinaryMerkleTree`], building and proof generation
//! - `node`: [`NodeRef`] view of tree vertices
//! - `proof`: proof types and root recomputation
//! - `merkle_tree`: [`MerkleTree`], the mutable tree
//! - `traversal`: level-order listing for inspection

// Only used in benches and with the `serde` feature; keeps the dev-dep lint
// happy for the unit test target.
#[cfg(test)]
use criterion as _;
#[cfg(all(test, not(feature = "serde")))]
use serde_json as _;

pub mod error;
pub mod hasher;
pub mod leaves;
pub mod merkle_tree;
pub mod node;
pub mod proof;
pub mod traversal;
pub mod tree;

use hasher::{DigestMerkleHasher, TaggedDigestMerkleHasher};
use sha2::Sha256;

/// Merkle hash impl for SHA-256, `H(block)` leaves and `H(left || right)`
/// nodes.
pub type Sha256Hasher = DigestMerkleHasher<Sha256, 32>;

/// Merkle hash impl for SHA-256 with leaf/node domain tags.
pub type Sha256TaggedHasher = TaggedDigestMerkleHasher<Sha256, 32>;

/// Mutable tree using [`Sha256Hasher`].
pub type Sha256MerkleTree = MerkleTree<Sha256Hasher>;

// Common re-exports for ergonomic access at the crate root.
pub use error::{MerkleTreeError, MerkleTreeResult};
pub use hasher::{MerkleHash, MerkleHasher};
pub use leaves::LeafSequence;
pub use merkle_tree::MerkleTree;
pub use node::NodeRef;
pub use proof::{MerkleProof, RawMerkleProof};
pub use traversal::{LevelsDisplay, TreeLevel};
pub use tree::BinaryMerkleTree;

/// A convenient prelude bringing common types into scope.
pub mod prelude {
    pub use crate::hasher::{DigestMerkleHasher, MerkleHash, MerkleHasher, TaggedDigestMerkleHasher};
    pub use crate::proof::{MerkleProof, RawMerkleProof};
    pub use crate::tree::BinaryMerkleTree;
    pub use crate::{
        MerkleTree, MerkleTreeError, Sha256Hasher, Sha256MerkleTree, Sha256TaggedHasher,
    };
}
