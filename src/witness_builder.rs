//! Operator-side ledger: builds witness records for circuit proving.
//!
//! The [`AccountManager`] owns the authoritative account list and the sparse
//! Merkle tree, signs transfers, and applies them while capturing the
//! sibling paths the circuit needs. [`derive_public_inputs`] replays a batch
//! natively to recover the root chain and reject inconsistent witness files
//! before any constraint generation.

use ark_bn254::Fr;
use ark_ff::One;

use crate::eddsa::{self, Keypair};
use crate::error::{ProverError, Result};
use crate::hash::FieldHasher;
use crate::merkle::{account_leaf, leaf_from_fields, root_from_path, AccountTree};
use crate::prover_inputs::PublicInputs;
use crate::types::{
    AccountState, BatchInput, OnchainTransaction, SignedTransaction, TransactionProof,
};

/// One account as the operator tracks it.
#[derive(Clone, Debug)]
pub struct Account {
    pub keypair: Keypair,
    pub balance: u128,
    pub nonce: u32,
}

/// Authoritative account list plus the account tree. Account indexes are
/// assigned sequentially at registration.
pub struct AccountManager<H: FieldHasher + Clone> {
    hasher: H,
    tree: AccountTree<H>,
    accounts: Vec<Account>,
}

impl<H: FieldHasher + Clone> AccountManager<H> {
    pub fn new(hasher: H) -> Self {
        let tree = AccountTree::new(hasher.clone());
        Self {
            hasher,
            tree,
            accounts: Vec::new(),
        }
    }

    pub fn add_account(&mut self, keypair: Keypair, balance: u128) -> u32 {
        let index = self.accounts.len() as u32;
        self.accounts.push(Account {
            keypair,
            balance,
            nonce: 0,
        });
        let leaf = account_leaf(&self.hasher, &self.state(index));
        self.tree.update(index, leaf);
        index
    }

    pub fn root(&self) -> Fr {
        self.tree.root()
    }

    pub fn tree(&self) -> &AccountTree<H> {
        &self.tree
    }

    pub fn account(&self, index: u32) -> &Account {
        &self.accounts[index as usize]
    }

    /// Current tree-leaf view of an account.
    pub fn state(&self, index: u32) -> AccountState {
        let account = &self.accounts[index as usize];
        AccountState {
            pubkey: account.keypair.public,
            balance: Fr::from(account.balance),
            nonce: account.nonce,
        }
    }

    /// Sign a transfer with the sender's key at its current nonce.
    pub fn sign_transfer(&self, from_idx: u32, to_idx: u32, amount: u16) -> SignedTransaction {
        let tx = OnchainTransaction {
            from_idx,
            to_idx,
            amount,
        };
        let nonce = self.accounts[from_idx as usize].nonce;
        let message = SignedTransaction::pack_message(from_idx, to_idx, amount, nonce);
        let sig = eddsa::sign(&self.hasher, &self.accounts[from_idx as usize].keypair, message);
        SignedTransaction { tx, nonce, sig }
    }

    /// Apply a signed transfer to the ledger, recording the pre-states and
    /// sibling paths around both updates.
    ///
    /// The sender is updated first; the receiver path is captured against
    /// the intermediate tree, matching what the circuit authenticates.
    pub fn apply(&mut self, stx: SignedTransaction) -> Result<TransactionProof> {
        let tx = stx.tx;
        if tx.from_idx == tx.to_idx {
            return Err(ProverError::SelfTransfer(tx.from_idx));
        }

        let sender = &self.accounts[tx.from_idx as usize];
        if sender.balance < tx.amount as u128 {
            return Err(ProverError::InsufficientBalance {
                account: tx.from_idx,
                balance: sender.balance,
                amount: tx.amount,
            });
        }

        let state_from = self.state(tx.from_idx);
        let before_from = self.tree.path(tx.from_idx);
        {
            let sender = &mut self.accounts[tx.from_idx as usize];
            sender.nonce += 1;
            sender.balance -= tx.amount as u128;
        }
        let new_from_leaf = account_leaf(&self.hasher, &self.state(tx.from_idx));
        self.tree.update(tx.from_idx, new_from_leaf);

        let state_to = self.state(tx.to_idx);
        let before_to = self.tree.path(tx.to_idx);
        self.accounts[tx.to_idx as usize].balance += tx.amount as u128;
        let new_to_leaf = account_leaf(&self.hasher, &self.state(tx.to_idx));
        self.tree.update(tx.to_idx, new_to_leaf);
        let after_to = self.tree.path(tx.to_idx);

        tracing::debug!(
            from = tx.from_idx,
            to = tx.to_idx,
            amount = tx.amount,
            "applied transfer"
        );

        Ok(TransactionProof {
            stx,
            state_from,
            state_to,
            before_from,
            before_to,
            after_to,
        })
    }
}

/// Replay a batch natively, recovering `(R0, R_N)` and checking that each
/// record extends the chained root. Rejects before constraint generation:
/// a witness that fails here could never satisfy the circuit against the
/// roots it claims.
pub fn derive_public_inputs<H: FieldHasher>(hasher: &H, batch: &BatchInput) -> Result<PublicInputs> {
    if batch.txs.is_empty() {
        return Err(ProverError::InconsistentWitness {
            index: 0,
            reason: "empty batch".into(),
        });
    }

    let mut pre_root = None;
    let mut current_root = Fr::from(0u64);
    let mut txs = Vec::with_capacity(batch.txs.len());

    for (index, proof) in batch.txs.iter().enumerate() {
        let tx = proof.stx.tx;

        let leaf_before_from = account_leaf(hasher, &proof.state_from);
        let pre = root_from_path(hasher, tx.from_idx, leaf_before_from, &proof.before_from);
        match pre_root {
            None => pre_root = Some(pre),
            Some(_) if current_root == pre => {}
            Some(_) => {
                return Err(ProverError::InconsistentWitness {
                    index,
                    reason: "record does not extend the chained root".into(),
                })
            }
        }

        // Mirror the circuit's sender update: spent balance, signed nonce
        // advanced by one.
        let new_sender_balance = proof.state_from.balance - Fr::from(tx.amount);
        let next_nonce = Fr::from(proof.stx.nonce) + Fr::one();
        let leaf_after_from = leaf_from_fields(
            hasher,
            proof.state_from.pubkey.x,
            proof.state_from.pubkey.y,
            new_sender_balance,
            next_nonce,
        );
        let mid_root = root_from_path(hasher, tx.from_idx, leaf_after_from, &proof.before_from);

        let leaf_before_to = account_leaf(hasher, &proof.state_to);
        if root_from_path(hasher, tx.to_idx, leaf_before_to, &proof.before_to) != mid_root {
            return Err(ProverError::InconsistentWitness {
                index,
                reason: "receiver path does not match the intermediate root".into(),
            });
        }

        let new_receiver_balance = proof.state_to.balance + Fr::from(tx.amount);
        let leaf_after_to = leaf_from_fields(
            hasher,
            proof.state_to.pubkey.x,
            proof.state_to.pubkey.y,
            new_receiver_balance,
            Fr::from(proof.state_to.nonce),
        );
        let post_root = root_from_path(hasher, tx.to_idx, leaf_after_to, &proof.before_to);

        // `after_to` is not consumed by the circuit; use it as a redundant
        // cross-check of the receiver update.
        if root_from_path(hasher, tx.to_idx, leaf_after_to, &proof.after_to) != post_root {
            return Err(ProverError::InconsistentWitness {
                index,
                reason: "post-state receiver path disagrees with the chained root".into(),
            });
        }

        current_root = post_root;
        txs.push(tx);
    }

    Ok(PublicInputs {
        pre_root: pre_root.expect("batch is non-empty"),
        post_root: current_root,
        txs,
    })
}
