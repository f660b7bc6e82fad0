//! Public statement of a batch proof.

use ark_bn254::Fr;

use crate::types::OnchainTransaction;

/// Everything the verifier sees: the root transition plus the published
/// per-transaction summaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicInputs {
    /// Account root before the batch
    pub pre_root: Fr,
    /// Account root after the batch
    pub post_root: Fr,
    /// On-chain summaries, in application order
    pub txs: Vec<OnchainTransaction>,
}

impl PublicInputs {
    /// Field elements in verifier order (must match the circuit's input
    /// allocation order): `pre_root`, `post_root`, then
    /// `(from_idx, to_idx, amount)` per transaction.
    pub fn to_field_elements(&self) -> Vec<Fr> {
        let mut out = Vec::with_capacity(2 + 3 * self.txs.len());
        out.push(self.pre_root);
        out.push(self.post_root);
        for tx in &self.txs {
            out.push(Fr::from(tx.from_idx));
            out.push(Fr::from(tx.to_idx));
            out.push(Fr::from(tx.amount));
        }
        out
    }

    /// The settlement-layer publication: 8 bytes per transaction.
    pub fn summary_bytes(&self) -> Vec<u8> {
        self.txs.iter().flat_map(|tx| tx.to_bytes()).collect()
    }
}
