//! Data model for batched transfers.
//!
//! Mirrors what the settlement layer sees (8 bytes per transaction) and what
//! the operator supplies to the prover (account states plus sibling paths).
//! All structures are read-only inputs to the circuit.

use ark_bn254::Fr;
use ark_ed_on_bn254::EdwardsAffine;

use crate::constants::{AMOUNT_BITS, TREE_DEPTH};

/// The only information published on-chain for one transaction.
///
/// Packs into 8 bytes: from_idx (24 bits) || to_idx (24 bits) ||
/// amount (16 bits).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OnchainTransaction {
    pub from_idx: u32,
    pub to_idx: u32,
    pub amount: u16,
}

impl OnchainTransaction {
    pub fn is_valid(&self) -> bool {
        self.from_idx < (1 << TREE_DEPTH) && self.to_idx < (1 << TREE_DEPTH) && self.amount != 0
    }

    /// 64-bit on-chain summary, little-endian limbs in declaration order.
    pub fn to_bytes(&self) -> [u8; 8] {
        let packed: u64 = (self.from_idx as u64)
            | ((self.to_idx as u64) << TREE_DEPTH)
            | ((self.amount as u64) << (2 * TREE_DEPTH));
        packed.to_le_bytes()
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        let packed = u64::from_le_bytes(bytes);
        Self {
            from_idx: (packed & ((1 << TREE_DEPTH) - 1)) as u32,
            to_idx: ((packed >> TREE_DEPTH) & ((1 << TREE_DEPTH) - 1)) as u32,
            amount: ((packed >> (2 * TREE_DEPTH)) & ((1 << AMOUNT_BITS) - 1)) as u16,
        }
    }
}

/// EdDSA signature: commitment point `R` and response scalar `s`.
///
/// `s` is carried as a circuit-field element; honest signers always produce
/// values below the subgroup order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: EdwardsAffine,
    pub s: Fr,
}

/// One leaf of the account tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountState {
    pub pubkey: EdwardsAffine,
    /// Interpreted as a 128-bit unsigned balance.
    pub balance: Fr,
    /// Sequentially incrementing, number used once.
    pub nonce: u32,
}

impl AccountState {
    pub fn is_valid(&self) -> bool {
        self.nonce < (1 << TREE_DEPTH)
    }

    /// Fields in the normative leaf-hash order.
    pub fn leaf_fields(&self) -> [Fr; 4] {
        [
            self.pubkey.x,
            self.pubkey.y,
            self.balance,
            Fr::from(self.nonce),
        ]
    }
}

/// A transfer authorised by the sender's key for a specific nonce.
#[derive(Clone, Copy, Debug)]
pub struct SignedTransaction {
    pub tx: OnchainTransaction,
    pub nonce: u32,
    pub sig: Signature,
}

impl SignedTransaction {
    pub fn is_valid(&self) -> bool {
        self.tx.is_valid() && self.nonce < (1 << TREE_DEPTH)
    }

    /// The signed message body, 88 bits packed little-endian:
    /// from_idx || to_idx || amount || nonce.
    pub fn message_packed(&self) -> Fr {
        Self::pack_message(self.tx.from_idx, self.tx.to_idx, self.tx.amount, self.nonce)
    }

    pub fn pack_message(from_idx: u32, to_idx: u32, amount: u16, nonce: u32) -> Fr {
        let packed: u128 = (from_idx as u128)
            | ((to_idx as u128) << TREE_DEPTH)
            | ((amount as u128) << (2 * TREE_DEPTH))
            | ((nonce as u128) << (2 * TREE_DEPTH + AMOUNT_BITS));
        Fr::from(packed)
    }
}

/// Witness for applying one transaction: the signed transfer, both account
/// pre-states, and the sibling paths captured by the operator.
///
/// `after_to` is not consumed by the circuit; the operator uses it as a
/// redundant cross-check of the receiver update.
#[derive(Clone, Debug)]
pub struct TransactionProof {
    pub stx: SignedTransaction,
    pub state_from: AccountState,
    pub state_to: AccountState,
    pub before_from: Vec<Fr>,
    pub before_to: Vec<Fr>,
    pub after_to: Vec<Fr>,
}

/// Ordered batch witness: the per-transaction proofs, applied in sequence
/// against a shared chain of roots.
#[derive(Clone, Debug, Default)]
pub struct BatchInput {
    pub txs: Vec<TransactionProof>,
}
