//! Field compression used for leaves, Merkle nodes and the signature
//! challenge.
//!
//! The tree and circuit topology are written against the [`FieldHasher`]
//! capability rather than a concrete hash, so the compression function can
//! be swapped without touching the gadget composition. The shipped instance
//! is Poseidon over the BN254 scalar field.

use ark_bn254::Fr;
use ark_crypto_primitives::sponge::constraints::CryptographicSpongeVar;
use ark_crypto_primitives::sponge::poseidon::constraints::PoseidonSpongeVar;
use ark_crypto_primitives::sponge::poseidon::{
    find_poseidon_ark_and_mds, PoseidonConfig, PoseidonSponge,
};
use ark_crypto_primitives::sponge::CryptographicSponge;
use ark_ff::PrimeField;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Two-to-one field compression plus a sponge over longer inputs, with the
/// matching in-circuit arithmetization.
///
/// Implementations must guarantee that the native and `_var` forms compute
/// the same function; every value that exists both inside and outside the
/// constraint system (leaf digests, node hashes, signature challenges) goes
/// through one impl of this trait.
pub trait FieldHasher {
    /// Merkle node compression `H2(left, right)`.
    fn hash2(&self, a: &Fr, b: &Fr) -> Fr;

    /// Sponge over an ordered sequence of field elements.
    fn hash_many(&self, inputs: &[Fr]) -> Fr;

    /// In-circuit counterpart of [`FieldHasher::hash2`].
    fn hash2_var(
        &self,
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
    ) -> Result<FpVar<Fr>, SynthesisError>;

    /// In-circuit counterpart of [`FieldHasher::hash_many`].
    fn hash_many_var(
        &self,
        cs: ConstraintSystemRef<Fr>,
        inputs: &[FpVar<Fr>],
    ) -> Result<FpVar<Fr>, SynthesisError>;
}

/// Poseidon parameters for BN254 Fr.
///
/// Rate 2, capacity 1, alpha = 5, 8 full / 56 partial rounds.
pub fn poseidon_config() -> PoseidonConfig<Fr> {
    let full_rounds = 8;
    let partial_rounds = 56;
    let alpha = 5u64;
    let rate = 2;
    let capacity = 1;

    let (ark, mds) = find_poseidon_ark_and_mds::<Fr>(
        Fr::MODULUS_BIT_SIZE as u64,
        rate,
        full_rounds as u64,
        partial_rounds as u64,
        0,
    );

    PoseidonConfig::new(full_rounds, partial_rounds, alpha, mds, ark, rate, capacity)
}

/// The shipped [`FieldHasher`]: a Poseidon sponge absorbing inputs one
/// element at a time and squeezing a single element.
#[derive(Clone)]
pub struct PoseidonHasher {
    config: PoseidonConfig<Fr>,
}

impl PoseidonHasher {
    pub fn new() -> Self {
        Self {
            config: poseidon_config(),
        }
    }

    pub fn config(&self) -> &PoseidonConfig<Fr> {
        &self.config
    }
}

impl Default for PoseidonHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldHasher for PoseidonHasher {
    fn hash2(&self, a: &Fr, b: &Fr) -> Fr {
        self.hash_many(&[*a, *b])
    }

    fn hash_many(&self, inputs: &[Fr]) -> Fr {
        let mut sponge = PoseidonSponge::<Fr>::new(&self.config);
        for input in inputs {
            sponge.absorb(input);
        }
        sponge.squeeze_field_elements(1)[0]
    }

    fn hash2_var(
        &self,
        cs: ConstraintSystemRef<Fr>,
        a: &FpVar<Fr>,
        b: &FpVar<Fr>,
    ) -> Result<FpVar<Fr>, SynthesisError> {
        self.hash_many_var(cs, &[a.clone(), b.clone()])
    }

    fn hash_many_var(
        &self,
        cs: ConstraintSystemRef<Fr>,
        inputs: &[FpVar<Fr>],
    ) -> Result<FpVar<Fr>, SynthesisError> {
        let mut sponge = PoseidonSpongeVar::new(cs, &self.config);
        for input in inputs {
            sponge.absorb(input)?;
        }
        let mut out = sponge.squeeze_field_elements(1)?;
        Ok(out.remove(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_r1cs_std::alloc::AllocVar;
    use ark_r1cs_std::R1CSVar;
    use ark_relations::r1cs::ConstraintSystem;

    #[test]
    fn hash2_deterministic() {
        let h = PoseidonHasher::new();
        let a = Fr::from(123u64);
        let b = Fr::from(456u64);
        assert_eq!(h.hash2(&a, &b), h.hash2(&a, &b));
    }

    #[test]
    fn hash2_order_matters() {
        let h = PoseidonHasher::new();
        let a = Fr::from(123u64);
        let b = Fr::from(456u64);
        assert_ne!(h.hash2(&a, &b), h.hash2(&b, &a));
    }

    #[test]
    fn native_and_circuit_agree() {
        let h = PoseidonHasher::new();
        let a = Fr::from(7u64);
        let b = Fr::from(42u64);
        let expected = h.hash2(&a, &b);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let a_var = FpVar::new_witness(cs.clone(), || Ok(a)).unwrap();
        let b_var = FpVar::new_witness(cs.clone(), || Ok(b)).unwrap();
        let out = h.hash2_var(cs.clone(), &a_var, &b_var).unwrap();

        assert_eq!(out.value().unwrap(), expected);
        assert!(cs.is_satisfied().unwrap());
    }

    #[test]
    fn sponge_agrees_on_longer_inputs() {
        let h = PoseidonHasher::new();
        let inputs: Vec<Fr> = (0u64..5).map(Fr::from).collect();
        let expected = h.hash_many(&inputs);

        let cs = ConstraintSystem::<Fr>::new_ref();
        let vars: Vec<FpVar<Fr>> = inputs
            .iter()
            .map(|x| FpVar::new_witness(cs.clone(), || Ok(*x)).unwrap())
            .collect();
        let out = h.hash_many_var(cs.clone(), &vars).unwrap();

        assert_eq!(out.value().unwrap(), expected);
        assert!(cs.is_satisfied().unwrap());
    }
}
