//! Witness fixture generator.
//!
//! Builds a ledger of funded accounts, applies a run of random signed
//! transfers, and prints the resulting witness records to stdout in the
//! plain-text format the prover reads.
//!
//! Usage:
//!   gen-witness [accounts] [transactions] [seed]

use anyhow::{Context, Result};
use ark_std::rand::{rngs::StdRng, Rng, SeedableRng};

use rollup_prover::eddsa::Keypair;
use rollup_prover::witness_builder::AccountManager;
use rollup_prover::{reader, BatchInput, PoseidonHasher};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let num_accounts: usize = parse_arg(&args, 1, 4).context("invalid account count")?;
    let num_txs: usize = parse_arg(&args, 2, 8).context("invalid transaction count")?;
    let seed: u64 = parse_arg(&args, 3, 42).context("invalid seed")?;

    let mut rng = StdRng::seed_from_u64(seed);
    let mut mgr = AccountManager::new(PoseidonHasher::new());

    for _ in 0..num_accounts {
        let balance = rng.gen_range(1..=1000u128);
        mgr.add_account(Keypair::generate(&mut rng), balance);
    }

    let mut txs = Vec::with_capacity(num_txs);
    while txs.len() < num_txs {
        let from = rng.gen_range(0..num_accounts) as u32;
        let to = rng.gen_range(0..num_accounts) as u32;
        let balance = mgr.account(from).balance;
        if from == to || balance == 0 {
            continue;
        }

        let amount = rng.gen_range(1..=balance.min(u16::MAX as u128)) as u16;
        let stx = mgr.sign_transfer(from, to, amount);
        txs.push(mgr.apply(stx)?);
    }

    print!("{}", reader::serialize_batch(&BatchInput { txs }));
    Ok(())
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args.get(index) {
        Some(raw) => Ok(raw.parse()?),
        None => Ok(default),
    }
}
