//! Operator-side sparse Merkle tree over the account state.
//!
//! Only non-empty nodes are stored; empty subtree roots are precomputed per
//! level. The in-circuit path gadgets recompute exactly these hashes, so the
//! leaf codec and node function here are the single source of truth for
//! fixtures and public roots.

use std::collections::HashMap;

use ark_bn254::Fr;
use ark_ff::Zero;

use crate::constants::TREE_DEPTH;
use crate::hash::FieldHasher;
use crate::types::AccountState;

/// Account leaf digest: a fold of the state fields in the fixed order
/// `(pubkey.x, pubkey.y, balance, nonce)`.
///
/// This order is normative; the off-circuit tree and the circuit must agree
/// on it bit for bit.
pub fn account_leaf<H: FieldHasher>(hasher: &H, state: &AccountState) -> Fr {
    let [x, y, balance, nonce] = state.leaf_fields();
    leaf_from_fields(hasher, x, y, balance, nonce)
}

pub fn leaf_from_fields<H: FieldHasher>(hasher: &H, x: Fr, y: Fr, balance: Fr, nonce: Fr) -> Fr {
    let mut acc = hasher.hash2(&x, &y);
    acc = hasher.hash2(&acc, &balance);
    hasher.hash2(&acc, &nonce)
}

/// Recompute a root from a leaf, its index and a sibling path.
///
/// Bit `i` of `index` selects whether the running node is the right child at
/// level `i`.
pub fn root_from_path<H: FieldHasher>(hasher: &H, index: u32, leaf: Fr, siblings: &[Fr]) -> Fr {
    debug_assert_eq!(siblings.len(), TREE_DEPTH);
    let mut current = leaf;
    for (level, sibling) in siblings.iter().enumerate() {
        let is_right = (index >> level) & 1 == 1;
        current = if is_right {
            hasher.hash2(sibling, &current)
        } else {
            hasher.hash2(&current, sibling)
        };
    }
    current
}

/// Sparse Merkle tree of depth [`TREE_DEPTH`] with lazily stored nodes.
#[derive(Clone)]
pub struct AccountTree<H: FieldHasher> {
    hasher: H,
    /// Non-empty nodes: (level, index) -> hash
    nodes: HashMap<(usize, u32), Fr>,
    root: Fr,
    /// Precomputed empty subtree roots, one per level
    empty_roots: Vec<Fr>,
}

impl<H: FieldHasher> AccountTree<H> {
    pub fn new(hasher: H) -> Self {
        let mut empty_roots = vec![Fr::zero()];
        for _ in 0..TREE_DEPTH {
            let prev = *empty_roots.last().unwrap();
            empty_roots.push(hasher.hash2(&prev, &prev));
        }
        let root = empty_roots[TREE_DEPTH];

        Self {
            hasher,
            nodes: HashMap::new(),
            root,
            empty_roots,
        }
    }

    pub fn root(&self) -> Fr {
        self.root
    }

    pub fn leaf(&self, index: u32) -> Fr {
        self.node(0, index)
    }

    fn node(&self, level: usize, index: u32) -> Fr {
        self.nodes
            .get(&(level, index))
            .copied()
            .unwrap_or(self.empty_roots[level])
    }

    /// Set the leaf at `index` and rehash its path to the root.
    pub fn update(&mut self, index: u32, leaf: Fr) {
        debug_assert!(index < (1 << TREE_DEPTH));
        self.nodes.insert((0, index), leaf);

        let mut current_index = index;
        let mut current = leaf;
        for level in 0..TREE_DEPTH {
            let sibling = self.node(level, current_index ^ 1);
            current = if current_index & 1 == 1 {
                self.hasher.hash2(&sibling, &current)
            } else {
                self.hasher.hash2(&current, &sibling)
            };
            current_index >>= 1;
            self.nodes.insert((level + 1, current_index), current);
        }
        self.root = current;
    }

    /// Sibling hashes along the path from `index` to the root, leaf level
    /// first.
    pub fn path(&self, index: u32) -> Vec<Fr> {
        let mut siblings = Vec::with_capacity(TREE_DEPTH);
        let mut current_index = index;
        for level in 0..TREE_DEPTH {
            siblings.push(self.node(level, current_index ^ 1));
            current_index >>= 1;
        }
        siblings
    }
}
