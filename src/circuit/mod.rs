//! R1CS gadgets composing the transaction-application circuit.

pub mod balance;
pub mod eddsa;
pub mod merkle;
pub mod transaction;

use ark_bn254::Fr;
use ark_ff::{BigInteger, PrimeField};
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::boolean::Boolean;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_r1cs_std::R1CSVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

/// Allocate `width` witness bits for a known integer, little-endian.
pub(crate) fn alloc_bits_of_u64(
    cs: ConstraintSystemRef<Fr>,
    value: u64,
    width: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    (0..width)
        .map(|i| Boolean::new_witness(cs.clone(), || Ok((value >> i) & 1 == 1)))
        .collect()
}

/// Pack little-endian bits into a field element.
pub(crate) fn pack_bits(bits: &[Boolean<Fr>]) -> Result<FpVar<Fr>, SynthesisError> {
    Boolean::le_bits_to_fp_var(bits)
}

/// Constrain `value` to `width` bits by binding it to a fresh little-endian
/// decomposition. Returns the bits.
pub(crate) fn enforce_bit_width(
    cs: ConstraintSystemRef<Fr>,
    value: &FpVar<Fr>,
    width: usize,
) -> Result<Vec<Boolean<Fr>>, SynthesisError> {
    let bits = (0..width)
        .map(|i| {
            Boolean::new_witness(cs.clone(), || {
                let v: Fr = value.value()?;
                Ok(v.into_bigint().get_bit(i))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    pack_bits(&bits)?.enforce_equal(value)?;
    Ok(bits)
}
