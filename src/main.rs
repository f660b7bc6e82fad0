//! Batch checker CLI.
//!
//! Usage: rollup-prover <n> <witness-file>
//!
//! Reads up to `n` witness records, derives the public root transition,
//! assembles the batch circuit and evaluates it against the witness.
//!
//! Exit codes: 0 batch satisfied, 2 cannot open input, 3 parse or witness
//! consistency failure, 4 constraints unsatisfied.

use std::fs::File;
use std::io::BufReader;
use std::process::exit;

use ark_bn254::Fr;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};

use rollup_prover::witness_builder::derive_public_inputs;
use rollup_prover::{reader, BatchCircuit, PoseidonHasher, ProverError};

fn main() {
    tracing_subscriber::fmt().with_target(false).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <n> <witness-file>", args[0]);
        exit(1);
    }

    let n: usize = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Error: batch size must be a non-negative integer");
            exit(1);
        }
    };

    let file = match File::open(&args[2]) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Error: cannot open input file {}: {}", args[2], e);
            exit(2);
        }
    };

    let batch = match reader::read_batch(BufReader::new(file), n) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(3);
        }
    };
    tracing::info!(transactions = batch.txs.len(), "parsed witness file");

    let hasher = PoseidonHasher::new();
    let public = match derive_public_inputs(&hasher, &batch) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(3);
        }
    };

    // Echo the on-chain summary.
    for tx in &public.txs {
        println!("{} {} {}", tx.from_idx, tx.to_idx, tx.amount);
    }

    let circuit = BatchCircuit::new(public.pre_root, public.post_root, batch);
    let cs = ConstraintSystem::<Fr>::new_ref();
    if let Err(e) = circuit.generate_constraints(cs.clone()) {
        eprintln!("Error: {}", ProverError::from(e));
        exit(4);
    }

    tracing::info!(
        constraints = cs.num_constraints(),
        public_inputs = cs.num_instance_variables() - 1,
        "constraint system assembled"
    );

    match cs.is_satisfied() {
        Ok(true) => {
            tracing::info!("batch satisfied");
        }
        Ok(false) => {
            eprintln!("Error: batch invalid: constraint system unsatisfied");
            exit(4);
        }
        Err(e) => {
            eprintln!("Error: {}", ProverError::from(e));
            exit(4);
        }
    }
}
