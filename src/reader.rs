//! Plain-text witness records.
//!
//! One record per non-blank, non-comment line, whitespace-separated:
//!
//! ```text
//! from_idx to_idx amount nonce R.x R.y s
//! pubkey_from.x pubkey_from.y balance_from nonce_from
//! pubkey_to.x pubkey_to.y balance_to nonce_to
//! before_from[0..D-1] before_to[0..D-1] after_to[0..D-1]
//! ```
//!
//! Field elements are decimal integers reduced modulo the field prime.
//! Range violations are rejected here, before any constraint generation;
//! parsing never attempts repair.

use std::fmt::Write as _;
use std::io::BufRead;

use ark_bn254::Fr;
use ark_ed_on_bn254::EdwardsAffine;
use ark_ff::PrimeField;
use num_bigint::BigUint;

use crate::constants::{AMOUNT_BITS, RECORD_TOKENS, TREE_DEPTH};
use crate::error::{ProverError, Result};
use crate::types::{
    AccountState, BatchInput, OnchainTransaction, Signature, SignedTransaction, TransactionProof,
};

/// Read up to `limit` records.
pub fn read_batch<R: BufRead>(input: R, limit: usize) -> Result<BatchInput> {
    let mut txs = Vec::new();
    for (line_no, line) in input.lines().enumerate() {
        if txs.len() == limit {
            break;
        }
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        txs.push(parse_record(trimmed, line_no + 1)?);
    }
    Ok(BatchInput { txs })
}

/// Parse one witness record. `line` is 1-based and only used for reporting.
pub fn parse_record(record: &str, line: usize) -> Result<TransactionProof> {
    let tokens: Vec<&str> = record.split_whitespace().collect();
    if tokens.len() != RECORD_TOKENS {
        return Err(ProverError::Parse {
            line,
            reason: format!("expected {} fields, got {}", RECORD_TOKENS, tokens.len()),
        });
    }

    let from_idx = parse_bounded(tokens[0], line, "from_idx", 1 << TREE_DEPTH)? as u32;
    let to_idx = parse_bounded(tokens[1], line, "to_idx", 1 << TREE_DEPTH)? as u32;
    let amount = parse_bounded(tokens[2], line, "amount", 1 << AMOUNT_BITS)? as u16;
    if amount == 0 {
        return Err(ProverError::Range {
            line,
            field: "amount",
            value: 0,
        });
    }
    let nonce = parse_bounded(tokens[3], line, "nonce", 1 << TREE_DEPTH)? as u32;

    let r = EdwardsAffine::new_unchecked(
        parse_field(tokens[4], line)?,
        parse_field(tokens[5], line)?,
    );
    let s = parse_field(tokens[6], line)?;

    let state_from = AccountState {
        pubkey: EdwardsAffine::new_unchecked(
            parse_field(tokens[7], line)?,
            parse_field(tokens[8], line)?,
        ),
        balance: parse_field(tokens[9], line)?,
        nonce: parse_bounded(tokens[10], line, "nonce_from", 1 << TREE_DEPTH)? as u32,
    };
    let state_to = AccountState {
        pubkey: EdwardsAffine::new_unchecked(
            parse_field(tokens[11], line)?,
            parse_field(tokens[12], line)?,
        ),
        balance: parse_field(tokens[13], line)?,
        nonce: parse_bounded(tokens[14], line, "nonce_to", 1 << TREE_DEPTH)? as u32,
    };

    let mut paths = tokens[15..].chunks_exact(TREE_DEPTH);
    let before_from = parse_path(paths.next().expect("token count checked"), line)?;
    let before_to = parse_path(paths.next().expect("token count checked"), line)?;
    let after_to = parse_path(paths.next().expect("token count checked"), line)?;

    Ok(TransactionProof {
        stx: SignedTransaction {
            tx: OnchainTransaction {
                from_idx,
                to_idx,
                amount,
            },
            nonce,
            sig: Signature { r, s },
        },
        state_from,
        state_to,
        before_from,
        before_to,
        after_to,
    })
}

/// Canonical text form of a batch; parsing its own output is the identity.
pub fn serialize_batch(batch: &BatchInput) -> String {
    let mut out = String::new();
    for proof in &batch.txs {
        write_record(&mut out, proof);
    }
    out
}

/// ark-ff's `Display` for field elements trims leading zeroes and
/// collapses the value `0` to an empty string; guard against that so a
/// zero-valued field still occupies a whitespace-separated token.
fn fmt_field<T: std::fmt::Display>(value: &T) -> String {
    let s = value.to_string();
    if s.is_empty() {
        "0".to_string()
    } else {
        s
    }
}

fn write_record(out: &mut String, proof: &TransactionProof) {
    let tx = proof.stx.tx;
    let _ = write!(
        out,
        "{} {} {} {} {} {} {}",
        tx.from_idx,
        tx.to_idx,
        tx.amount,
        proof.stx.nonce,
        fmt_field(&proof.stx.sig.r.x),
        fmt_field(&proof.stx.sig.r.y),
        fmt_field(&proof.stx.sig.s),
    );
    for state in [&proof.state_from, &proof.state_to] {
        let _ = write!(
            out,
            " {} {} {} {}",
            fmt_field(&state.pubkey.x),
            fmt_field(&state.pubkey.y),
            fmt_field(&state.balance),
            state.nonce
        );
    }
    for path in [&proof.before_from, &proof.before_to, &proof.after_to] {
        for sibling in path.iter() {
            let _ = write!(out, " {}", fmt_field(sibling));
        }
    }
    out.push('\n');
}

fn parse_bounded(token: &str, line: usize, field: &'static str, bound: u64) -> Result<u64> {
    let value: u64 = token.parse().map_err(|_| ProverError::Parse {
        line,
        reason: format!("invalid {}: {:?}", field, token),
    })?;
    if value >= bound {
        return Err(ProverError::Range { line, field, value });
    }
    Ok(value)
}

fn parse_field(token: &str, line: usize) -> Result<Fr> {
    let digits: BigUint = token.parse().map_err(|_| ProverError::Parse {
        line,
        reason: format!("invalid field element: {:?}", token),
    })?;
    Ok(Fr::from_le_bytes_mod_order(&digits.to_bytes_le()))
}

fn parse_path(tokens: &[&str], line: usize) -> Result<Vec<Fr>> {
    tokens.iter().map(|t| parse_field(t, line)).collect()
}
