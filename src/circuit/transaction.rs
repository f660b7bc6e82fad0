//! Application of one signed transfer to the account tree.
//!
//! The state is the chain of three roots. Constraint order is normative:
//! the sender is authenticated against the pre-root with the *signed* nonce
//! in its leaf, updated to produce the intermediate root from the re-used
//! sender siblings, and only then is the receiver authenticated against
//! that intermediate root. A self-transfer cannot satisfy both membership
//! checks, so no explicit index inequality is needed.

use ark_bn254::Fr;
use ark_ed_on_bn254::constraints::EdwardsVar;
use ark_ed_on_bn254::EdwardsProjective;
use ark_ff::One;
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::fields::FieldVar;
use ark_r1cs_std::ToBitsGadget;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::circuit::{alloc_bits_of_u64, balance, eddsa, merkle, pack_bits};
use crate::constants::{AMOUNT_BITS, MESSAGE_BITS, TREE_DEPTH};
use crate::hash::FieldHasher;
use crate::types::TransactionProof;

/// Constrain one transaction against `pre_root` and return the resulting
/// root variable.
///
/// `from_idx`, `to_idx` and `amount` are the packed public summary values;
/// the gadget binds its internal bit decompositions to them.
pub fn apply_transaction<H: FieldHasher>(
    cs: ConstraintSystemRef<Fr>,
    hasher: &H,
    pre_root: &FpVar<Fr>,
    from_idx: &FpVar<Fr>,
    to_idx: &FpVar<Fr>,
    amount: &FpVar<Fr>,
    proof: &TransactionProof,
) -> Result<FpVar<Fr>, SynthesisError> {
    // Bit decompositions. The index bits double as Merkle path selectors
    // and as signed-message limbs; the packing constraints tie them to the
    // public summary.
    let from_bits = alloc_bits_of_u64(cs.clone(), proof.stx.tx.from_idx as u64, TREE_DEPTH)?;
    pack_bits(&from_bits)?.enforce_equal(from_idx)?;

    let to_bits = alloc_bits_of_u64(cs.clone(), proof.stx.tx.to_idx as u64, TREE_DEPTH)?;
    pack_bits(&to_bits)?.enforce_equal(to_idx)?;

    let amount_bits = alloc_bits_of_u64(cs.clone(), proof.stx.tx.amount as u64, AMOUNT_BITS)?;
    pack_bits(&amount_bits)?.enforce_equal(amount)?;

    let nonce_bits = alloc_bits_of_u64(cs.clone(), proof.stx.nonce as u64, TREE_DEPTH)?;
    let sig_nonce = pack_bits(&nonce_bits)?;

    // Nonce advance over the field; the signed nonce is already pinned to
    // TREE_DEPTH bits.
    let next_nonce = &sig_nonce + FpVar::constant(Fr::one());

    // Account states and signature material.
    let from_pubkey = EdwardsVar::new_witness(cs.clone(), || {
        Ok(EdwardsProjective::from(proof.state_from.pubkey))
    })?;
    let from_balance = FpVar::new_witness(cs.clone(), || Ok(proof.state_from.balance))?;

    let to_pubkey = EdwardsVar::new_witness(cs.clone(), || {
        Ok(EdwardsProjective::from(proof.state_to.pubkey))
    })?;
    let to_balance = FpVar::new_witness(cs.clone(), || Ok(proof.state_to.balance))?;
    let to_nonce = FpVar::new_witness(cs.clone(), || Ok(Fr::from(proof.state_to.nonce)))?;

    let sig_r =
        EdwardsVar::new_witness(cs.clone(), || Ok(EdwardsProjective::from(proof.stx.sig.r)))?;
    let sig_s = FpVar::new_witness(cs.clone(), || Ok(proof.stx.sig.s))?;
    let sig_s_bits = sig_s.to_bits_le()?;

    // M = from_idx || to_idx || amount || nonce, signed by the sender key.
    let mut message_bits: Vec<Boolean<Fr>> = Vec::with_capacity(MESSAGE_BITS);
    message_bits.extend_from_slice(&from_bits);
    message_bits.extend_from_slice(&to_bits);
    message_bits.extend_from_slice(&amount_bits);
    message_bits.extend_from_slice(&nonce_bits);

    eddsa::verify_signature(
        cs.clone(),
        hasher,
        &from_pubkey,
        &sig_r,
        &sig_s_bits,
        &message_bits,
    )?;

    // Sibling paths. `before_from` is allocated once and re-used for the
    // sender update: changing one leaf cannot change any sibling on its own
    // path.
    let before_from = alloc_siblings(cs.clone(), &proof.before_from)?;
    let before_to = alloc_siblings(cs.clone(), &proof.before_to)?;

    // Sender pre-membership, with the signed nonce inside the leaf.
    let leaf_before_from = merkle::leaf_hash(
        cs.clone(),
        hasher,
        &from_pubkey.x,
        &from_pubkey.y,
        &from_balance,
        &sig_nonce,
    )?;
    merkle::authenticate(
        cs.clone(),
        hasher,
        pre_root,
        &from_bits,
        &before_from,
        &leaf_before_from,
    )?;

    // Balance transfer.
    let split = balance::subadd(cs.clone(), &from_balance, &to_balance, amount)?;

    // Sender update -> intermediate root.
    let leaf_after_from = merkle::leaf_hash(
        cs.clone(),
        hasher,
        &from_pubkey.x,
        &from_pubkey.y,
        &split.sender,
        &next_nonce,
    )?;
    let mid_root = merkle::compute_root(
        cs.clone(),
        hasher,
        &from_bits,
        &before_from,
        &leaf_after_from,
    )?;

    // Receiver pre-membership against the intermediate root.
    let leaf_before_to = merkle::leaf_hash(
        cs.clone(),
        hasher,
        &to_pubkey.x,
        &to_pubkey.y,
        &to_balance,
        &to_nonce,
    )?;
    merkle::authenticate(
        cs.clone(),
        hasher,
        &mid_root,
        &to_bits,
        &before_to,
        &leaf_before_to,
    )?;

    // Receiver update -> output root. The receiver nonce does not advance.
    let leaf_after_to = merkle::leaf_hash(
        cs.clone(),
        hasher,
        &to_pubkey.x,
        &to_pubkey.y,
        &split.receiver,
        &to_nonce,
    )?;
    merkle::compute_root(cs, hasher, &to_bits, &before_to, &leaf_after_to)
}

fn alloc_siblings(
    cs: ConstraintSystemRef<Fr>,
    siblings: &[Fr],
) -> Result<Vec<FpVar<Fr>>, SynthesisError> {
    siblings
        .iter()
        .map(|s| FpVar::new_witness(cs.clone(), || Ok(*s)))
        .collect()
}
