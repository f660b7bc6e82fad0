//! Error definitions for the batch prover.
//!
//! All errors are fatal to the batch being processed: parsing never repairs
//! a record, and an unsatisfiable constraint system aborts without emitting
//! a partial batch.

use thiserror::Error;

/// Errors raised while assembling or checking a batch
#[derive(Error, Debug)]
pub enum ProverError {
    /// Malformed or truncated witness record
    #[error("parse error on line {line}: {reason}")]
    Parse { line: usize, reason: String },

    /// An index, amount or nonce outside its declared bit width,
    /// detected before any constraint generation
    #[error("range error on line {line}: {field} = {value} out of range")]
    Range {
        line: usize,
        field: &'static str,
        value: u64,
    },

    /// Operator-side root chaining disagreed with the supplied sibling paths
    #[error("inconsistent witness for transaction {index}: {reason}")]
    InconsistentWitness { index: usize, reason: String },

    /// A transfer the operator cannot honestly apply
    #[error("account {account}: balance {balance} cannot cover transfer of {amount}")]
    InsufficientBalance {
        account: u32,
        balance: u128,
        amount: u16,
    },

    /// Sender and receiver share an index; no witness can satisfy both
    /// membership checks
    #[error("self transfer at index {0} cannot be proven")]
    SelfTransfer(u32),

    /// The assembled constraint system is not satisfied by the witness
    #[error("batch invalid: constraint system unsatisfied")]
    Unsatisfied,

    /// Key generation or proof creation failed inside the proving backend
    #[error("proving backend error: {0}")]
    Backend(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ark_relations::r1cs::SynthesisError> for ProverError {
    fn from(e: ark_relations::r1cs::SynthesisError) -> Self {
        ProverError::Backend(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProverError>;
