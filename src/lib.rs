//! Groth16 circuit family proving batches of signed transfers against a
//! sparse Merkle tree of account states.
//!
//! The settlement layer sees only a per-transaction summary (sender index,
//! receiver index, amount) plus a proof that every transfer was signed by
//! the sender, kept balances and nonces consistent, and moved the published
//! pre-state root to the published post-state root.
//!
//! ```text
//!  witness file ──> reader ──> BatchInput ──> derive_public_inputs
//!                                  │                  │
//!                                  v                  v
//!                            BatchCircuit <── (R0, RN, summaries)
//!                                  │
//!                                  v
//!                          Groth16 setup / prove / verify
//! ```

pub mod batch_circuit;
pub mod circuit;
pub mod constants;
pub mod eddsa;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod prover_inputs;
pub mod reader;
pub mod types;
pub mod witness_builder;

pub use batch_circuit::BatchCircuit;
pub use error::{ProverError, Result};
pub use hash::{FieldHasher, PoseidonHasher};
pub use prover_inputs::PublicInputs;
pub use types::{
    AccountState, BatchInput, OnchainTransaction, Signature, SignedTransaction, TransactionProof,
};
pub use witness_builder::{derive_public_inputs, AccountManager};
