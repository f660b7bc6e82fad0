//! Batch circuit: N chained transaction applications.
//!
//! Public inputs, in allocation order (the verifier must supply them in the
//! same order, see [`crate::prover_inputs::PublicInputs::to_field_elements`]):
//! 1. `pre_root`  - account root before the batch
//! 2. `post_root` - account root after the batch
//! 3. per transaction: `from_idx`, `to_idx`, `amount`
//!
//! Each sub-circuit's output root feeds the next sub-circuit's membership
//! checks; the final root is enforced against the public `post_root`.

use ark_bn254::Fr;
use ark_ed_on_bn254::EdwardsAffine;
use ark_ff::{One, Zero};
use ark_r1cs_std::alloc::AllocVar;
use ark_r1cs_std::eq::EqGadget;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystemRef, SynthesisError};

use crate::circuit::transaction::apply_transaction;
use crate::constants::TREE_DEPTH;
use crate::hash::PoseidonHasher;
use crate::types::{
    AccountState, BatchInput, OnchainTransaction, Signature, SignedTransaction, TransactionProof,
};

/// The batch circuit. The transaction list fixes the constraint topology,
/// so proving and verifying keys are specific to a batch size; the root
/// values are `Option` to keep key generation independent of a real state
/// transition.
#[derive(Clone)]
pub struct BatchCircuit {
    pub pre_root: Option<Fr>,
    pub post_root: Option<Fr>,
    pub batch: BatchInput,
    pub hasher: PoseidonHasher,
}

impl BatchCircuit {
    pub fn new(pre_root: Fr, post_root: Fr, batch: BatchInput) -> Self {
        Self {
            pre_root: Some(pre_root),
            post_root: Some(post_root),
            batch,
            hasher: PoseidonHasher::new(),
        }
    }

    /// Placeholder circuit for key generation. Same constraint topology as
    /// a real batch of `num_txs` transactions; the witness values are not
    /// meant to satisfy anything.
    pub fn dummy(num_txs: usize) -> Self {
        let identity = EdwardsAffine::new_unchecked(Fr::zero(), Fr::one());
        let state = AccountState {
            pubkey: identity,
            balance: Fr::zero(),
            nonce: 0,
        };
        let proof = TransactionProof {
            stx: SignedTransaction {
                tx: OnchainTransaction {
                    from_idx: 0,
                    to_idx: 1,
                    amount: 1,
                },
                nonce: 0,
                sig: Signature {
                    r: identity,
                    s: Fr::zero(),
                },
            },
            state_from: state,
            state_to: state,
            before_from: vec![Fr::zero(); TREE_DEPTH],
            before_to: vec![Fr::zero(); TREE_DEPTH],
            after_to: vec![Fr::zero(); TREE_DEPTH],
        };

        Self {
            pre_root: Some(Fr::zero()),
            post_root: Some(Fr::zero()),
            batch: BatchInput {
                txs: vec![proof; num_txs],
            },
            hasher: PoseidonHasher::new(),
        }
    }

    pub fn num_txs(&self) -> usize {
        self.batch.txs.len()
    }
}

impl ConstraintSynthesizer<Fr> for BatchCircuit {
    fn generate_constraints(self, cs: ConstraintSystemRef<Fr>) -> Result<(), SynthesisError> {
        // Public inputs first; allocation order is the verifier contract.
        let pre_root = FpVar::new_input(cs.clone(), || {
            self.pre_root.ok_or(SynthesisError::AssignmentMissing)
        })?;
        let post_root = FpVar::new_input(cs.clone(), || {
            self.post_root.ok_or(SynthesisError::AssignmentMissing)
        })?;

        let mut summaries = Vec::with_capacity(self.batch.txs.len());
        for proof in &self.batch.txs {
            let from_idx =
                FpVar::new_input(cs.clone(), || Ok(Fr::from(proof.stx.tx.from_idx)))?;
            let to_idx = FpVar::new_input(cs.clone(), || Ok(Fr::from(proof.stx.tx.to_idx)))?;
            let amount = FpVar::new_input(cs.clone(), || Ok(Fr::from(proof.stx.tx.amount)))?;
            summaries.push((from_idx, to_idx, amount));
        }

        // Chain the per-transaction sub-circuits.
        let mut current_root = pre_root;
        for (proof, (from_idx, to_idx, amount)) in self.batch.txs.iter().zip(&summaries) {
            current_root = apply_transaction(
                cs.clone(),
                &self.hasher,
                &current_root,
                from_idx,
                to_idx,
                amount,
                proof,
            )?;
        }

        current_root.enforce_equal(&post_root)
    }
}
