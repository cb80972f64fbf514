//! Level-order listing of a tree, for inspection and debugging.

use std::collections::VecDeque;
use std::fmt;

use crate::hasher::MerkleHash;
use crate::node::NodeRef;

/// Digests found at one depth of the tree, left to right.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TreeLevel<H> {
    /// Distance from the root, which is at depth 0.
    pub depth: usize,

    /// Digests at this depth, padding duplicates included.
    pub digests: Vec<H>,
}

/// Walks the tree under `root` breadth-first and groups digests by depth.
pub fn levels<H: MerkleHash>(root: NodeRef<'_, H>) -> Vec<TreeLevel<H>> {
    let mut out: Vec<TreeLevel<H>> = Vec::new();
    let mut queue = VecDeque::from([(0usize, root)]);

    while let Some((depth, node)) = queue.pop_front() {
        match out.last_mut() {
            Some(lvl) if lvl.depth == depth => lvl.digests.push(*node.digest()),
            _ => out.push(TreeLevel {
                depth,
                digests: vec![*node.digest()],
            }),
        }

        if let Some((l, r)) = node.children() {
            queue.push_back((depth + 1, l));
            queue.push_back((depth + 1, r));
        }
    }

    out
}

/// Renders levels as hex digests, one per line, with a blank line after each
/// level.
#[derive(Debug)]
pub struct LevelsDisplay<'a, H>(pub &'a [TreeLevel<H>]);

impl<H: AsRef<[u8]>> fmt::Display for LevelsDisplay<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for lvl in self.0 {
            for d in &lvl.digests {
                writeln!(f, "{}", hex::encode(d))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
