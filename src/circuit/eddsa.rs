//! In-circuit EdDSA verification over Baby Jubjub.
//!
//! Enforces `s·G = R + H_sig(R, A, M)·A` for a message bit-vector `M`.
//! Point allocation performs the on-curve and subgroup checks, so `R` and
//! the public key need no separate validation.

use ark_bn254::Fr;
use ark_ec::Group;
use ark_ed_on_bn254::constraints::EdwardsVar;
use ark_ed_on_bn254::EdwardsProjective;
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::groups::CurveVar;
use ark_r1cs_std::ToBitsGadget;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::circuit::pack_bits;
use crate::hash::FieldHasher;

/// Verify an EdDSA signature over `message_bits` (little-endian packed into
/// the challenge hash) under `pubkey`.
///
/// `sig_s_bits` must be the canonical full-width decomposition of `s`.
pub fn verify_signature<H: FieldHasher>(
    cs: ConstraintSystemRef<Fr>,
    hasher: &H,
    pubkey: &EdwardsVar,
    sig_r: &EdwardsVar,
    sig_s_bits: &[Boolean<Fr>],
    message_bits: &[Boolean<Fr>],
) -> Result<(), SynthesisError> {
    let message = pack_bits(message_bits)?;
    let challenge = hasher.hash_many_var(
        cs.clone(),
        &[
            sig_r.x.clone(),
            sig_r.y.clone(),
            pubkey.x.clone(),
            pubkey.y.clone(),
            message,
        ],
    )?;
    let challenge_bits = challenge.to_bits_le()?;

    let generator = EdwardsVar::new_constant(cs, EdwardsProjective::generator())?;
    let lhs = generator.scalar_mul_le(sig_s_bits.iter())?;
    let rhs = sig_r.clone() + pubkey.scalar_mul_le(challenge_bits.iter())?;

    lhs.enforce_equal(&rhs)
}
