//! Hashing primitives: digest types and the leaf/node hashing strategies.

use std::fmt;
use std::marker::PhantomData;

use digest::Digest;

/// Domain tag prepended to leaf data by [`TaggedDigestMerkleHasher`].
pub const LEAF_DOMAIN_TAG: u8 = 0x00;

/// Domain tag prepended to child digests by [`TaggedDigestMerkleHasher`].
pub const NODE_DOMAIN_TAG: u8 = 0x01;

/// Fixed-length digest produced by a [`MerkleHasher`].
pub trait MerkleHash: Copy + Eq + fmt::Debug + AsRef<[u8]> + 'static {
    /// Length of the hash in bytes.
    const HASH_LEN: usize;

    /// Checks if two hashes are equal, attempting to do it in constant time.
    fn eq_ct(a: &Self, b: &Self) -> bool;
}

impl<const LEN: usize> MerkleHash for [u8; LEN] {
    const HASH_LEN: usize = LEN;

    fn eq_ct(a: &Self, b: &Self) -> bool {
        // Accumulate every byte difference instead of returning early.  Not a
        // hard guarantee once LLVM is done with it, but the roots we compare
        // against are public anyway.
        let mut acc: u8 = 0;
        for i in 0..LEN {
            acc |= a[i] ^ b[i];
        }

        acc == 0
    }
}

/// Generic merkle hashing trait.
///
/// Leaves are `hash_leaf(block)`, internal nodes are
/// `hash_node(left, right)`, children always in left-then-right order.
pub trait MerkleHasher {
    /// Hash value.
    type Hash: MerkleHash;

    /// Hashes a data block to compute a leaf hash.
    fn hash_leaf(buf: &[u8]) -> Self::Hash;

    /// Hashes a node's left and right children to compute the node's hash.
    fn hash_node(left: Self::Hash, right: Self::Hash) -> Self::Hash;
}

fn finalize_into<D: Digest, const N: usize>(context: D) -> [u8; N] {
    let result = context.finalize();
    let mut out = [0; N];
    out.copy_from_slice(&result[..N]);
    out
}

/// Merkle hasher over an arbitrary [`Digest`] impl, hashing `H(block)` and
/// `H(left || right)` directly.
///
/// `N` must not exceed the digest output size.
pub struct DigestMerkleHasher<D: Digest, const N: usize>(PhantomData<D>);

impl<D: Digest, const N: usize> MerkleHasher for DigestMerkleHasher<D, N> {
    type Hash = [u8; N];

    fn hash_leaf(buf: &[u8]) -> Self::Hash {
        let mut context = D::new();
        context.update(buf);
        finalize_into(context)
    }

    fn hash_node(left: Self::Hash, right: Self::Hash) -> Self::Hash {
        let mut context = D::new();
        context.update(left);
        context.update(right);
        finalize_into(context)
    }
}

/// Merkle hasher over an arbitrary [`Digest`] impl that prefixes leaf and
/// node inputs with a one-byte domain tag, so a leaf can never be passed off
/// as an internal node.
pub struct TaggedDigestMerkleHasher<D: Digest, const N: usize>(PhantomData<D>);

impl<D: Digest, const N: usize> MerkleHasher for TaggedDigestMerkleHasher<D, N> {
    type Hash = [u8; N];

    fn hash_leaf(buf: &[u8]) -> Self::Hash {
        let mut context = D::new();
        context.update([LEAF_DOMAIN_TAG]);
        context.update(buf);
        finalize_into(context)
    }

    fn hash_node(left: Self::Hash, right: Self::Hash) -> Self::Hash {
        let mut context = D::new();
        context.update([NODE_DOMAIN_TAG]);
        context.update(left);
        context.update(right);
        finalize_into(context)
    }
}

// Hashers are zero-sized markers, so these don't need bounds on `D`.

impl<D: Digest, const N: usize> fmt::Debug for DigestMerkleHasher<D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DigestMerkleHasher<{N}>")
    }
}

impl<D: Digest, const N: usize> fmt::Debug for TaggedDigestMerkleHasher<D, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaggedDigestMerkleHasher<{N}>")
    }
}
