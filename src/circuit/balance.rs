//! Range-checked balance transfer (subadd).
//!
//! For sender balance `A`, receiver balance `B` and amount `N`, binds
//! `X = A - N` and `Y = B + N` while enforcing `N <= A` and keeping both new
//! balances inside the balance bit width. No branching: an underfunded or
//! overflowing transfer leaves the system unsatisfiable.

use core::cmp::Ordering;

use ark_bn254::Fr;
use ark_r1cs_std::fields::fp::FpVar;
use ark_relations::r1cs::{ConstraintSystemRef, SynthesisError};

use crate::circuit::enforce_bit_width;
use crate::constants::BALANCE_BITS;

/// The two updated balances produced by [`subadd`].
pub struct BalanceSplit {
    /// New sender balance `X = A - N`
    pub sender: FpVar<Fr>,
    /// New receiver balance `Y = B + N`
    pub receiver: FpVar<Fr>,
}

pub fn subadd(
    cs: ConstraintSystemRef<Fr>,
    sender_balance: &FpVar<Fr>,
    receiver_balance: &FpVar<Fr>,
    amount: &FpVar<Fr>,
) -> Result<BalanceSplit, SynthesisError> {
    // Non-strict comparator: the full balance may be spent.
    sender_balance.enforce_cmp(amount, Ordering::Greater, true)?;

    let sender = sender_balance - amount;
    let receiver = receiver_balance + amount;

    // Strict width bounds on both results. The subtraction cannot have
    // wrapped once the comparator holds, and the addition must stay below
    // 2^BALANCE_BITS.
    enforce_bit_width(cs.clone(), &sender, BALANCE_BITS)?;
    enforce_bit_width(cs, &receiver, BALANCE_BITS)?;

    Ok(BalanceSplit { sender, receiver })
}
