//! Merkle path gadgets over the account tree.
//!
//! Two variants: an authenticator that asserts a leaf sits under a given
//! root, and a computer that produces the root a leaf would create. Both
//! walk the same selection logic, driven by the index bits that also feed
//! the signed message, so the proven path position is the signed position.

use ark_bn254::Fr;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::select::CondSelectGadget;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::hash::FieldHasher;

/// Account leaf digest, the in-circuit twin of
/// [`crate::merkle::leaf_from_fields`]:
/// `H2(H2(H2(pubkey.x, pubkey.y), balance), nonce)`.
pub fn leaf_hash<H: FieldHasher>(
    cs: ConstraintSystemRef<Fr>,
    hasher: &H,
    pubkey_x: &FpVar<Fr>,
    pubkey_y: &FpVar<Fr>,
    balance: &FpVar<Fr>,
    nonce: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    let mut acc = hasher.hash2_var(cs.clone(), pubkey_x, pubkey_y)?;
    acc = hasher.hash2_var(cs.clone(), &acc, balance)?;
    hasher.hash2_var(cs, &acc, nonce)
}

/// Compute the root obtained by placing `leaf` at the position given by
/// `index_bits` (little-endian; bit `i` set means right child at level `i`).
pub fn compute_root<H: FieldHasher>(
    cs: ConstraintSystemRef<Fr>,
    hasher: &H,
    index_bits: &[Boolean<Fr>],
    siblings: &[FpVar<Fr>],
    leaf: &FpVar<Fr>,
) -> Result<FpVar<Fr>, SynthesisError> {
    debug_assert_eq!(index_bits.len(), siblings.len());

    let mut current = leaf.clone();
    for (is_right, sibling) in index_bits.iter().zip(siblings) {
        let left = FpVar::conditionally_select(is_right, sibling, &current)?;
        let right = FpVar::conditionally_select(is_right, &current, sibling)?;
        current = hasher.hash2_var(cs.clone(), &left, &right)?;
    }
    Ok(current)
}

/// Assert that `leaf` sits at `index_bits` under `root`.
pub fn authenticate<H: FieldHasher>(
    cs: ConstraintSystemRef<Fr>,
    hasher: &H,
    root: &FpVar<Fr>,
    index_bits: &[Boolean<Fr>],
    siblings: &[FpVar<Fr>],
    leaf: &FpVar<Fr>,
) -> Result<(), SynthesisError> {
    let computed = compute_root(cs, hasher, index_bits, siblings, leaf)?;
    computed.enforce_equal(root)
}
