//! Native EdDSA over Baby Jubjub, matching the in-circuit verifier.
//!
//! The challenge hash absorbs `(R.x, R.y, A.x, A.y, M)` through the same
//! [`FieldHasher`] the circuit uses, with the 88-bit message body packed into
//! one field element. Used by the operator to sign fixtures and sanity-check
//! witnesses before proving.

use ark_bn254::Fr;
use ark_ec::{CurveGroup, Group};
use ark_ed_on_bn254::{EdwardsAffine, EdwardsProjective, Fr as ScalarField};
use ark_ff::{BigInteger, PrimeField, UniformRand};
use ark_std::rand::Rng;

use crate::hash::FieldHasher;
use crate::types::Signature;

/// An EdDSA keypair on Baby Jubjub.
#[derive(Clone, Copy, Debug)]
pub struct Keypair {
    pub secret: ScalarField,
    pub public: EdwardsAffine,
}

impl Keypair {
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let secret = ScalarField::rand(rng);
        let public = (EdwardsProjective::generator() * secret).into_affine();
        Self { secret, public }
    }
}

/// Reduce a base-field element into the scalar field.
fn to_scalar(x: Fr) -> ScalarField {
    ScalarField::from_le_bytes_mod_order(&x.into_bigint().to_bytes_le())
}

/// Lift a scalar into the base field; always exact, the subgroup order is
/// smaller than the base-field modulus.
fn to_base(s: ScalarField) -> Fr {
    Fr::from_le_bytes_mod_order(&s.into_bigint().to_bytes_le())
}

/// Signature challenge `H_sig(R, A, M)`.
pub fn challenge<H: FieldHasher>(
    hasher: &H,
    r: &EdwardsAffine,
    pubkey: &EdwardsAffine,
    message: Fr,
) -> Fr {
    hasher.hash_many(&[r.x, r.y, pubkey.x, pubkey.y, message])
}

/// Sign a packed message with a deterministic nonce derived from the secret
/// key and the message.
pub fn sign<H: FieldHasher>(hasher: &H, keypair: &Keypair, message: Fr) -> Signature {
    let nonce_seed = hasher.hash_many(&[to_base(keypair.secret), message]);
    let r = to_scalar(nonce_seed);
    let big_r = (EdwardsProjective::generator() * r).into_affine();

    let c = to_scalar(challenge(hasher, &big_r, &keypair.public, message));
    let s = r + c * keypair.secret;

    Signature {
        r: big_r,
        s: to_base(s),
    }
}

/// Check `s·G = R + H_sig(R, A, M)·A`.
pub fn verify<H: FieldHasher>(
    hasher: &H,
    pubkey: &EdwardsAffine,
    message: Fr,
    sig: &Signature,
) -> bool {
    let c = to_scalar(challenge(hasher, &sig.r, pubkey, message));
    let lhs = EdwardsProjective::generator() * to_scalar(sig.s);
    let rhs = EdwardsProjective::from(sig.r) + EdwardsProjective::from(*pubkey) * c;
    lhs == rhs
}
