//! Key generation for the batch circuit.
//!
//! Generates the Groth16 proving and verifying keys. The circuit topology
//! depends on the batch size, so keys are generated per transaction count
//! and must be regenerated if the circuit changes.
//!
//! Usage:
//!   keygen --txs 8 --pk-out ./proving.key --vk-out ./verifying.key

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ark_bn254::Bn254;
use ark_groth16::Groth16;
use ark_serialize::CanonicalSerialize;
use ark_snark::SNARK;
use ark_std::rand::{rngs::StdRng, SeedableRng};

use rollup_prover::BatchCircuit;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut pk_path = String::from("./proving.key");
    let mut vk_path = String::from("./verifying.key");
    let mut num_txs = 1usize;
    let mut force = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--pk-out" => {
                i += 1;
                if i < args.len() {
                    pk_path = args[i].clone();
                }
            }
            "--vk-out" => {
                i += 1;
                if i < args.len() {
                    vk_path = args[i].clone();
                }
            }
            "--txs" => {
                i += 1;
                if i < args.len() {
                    num_txs = args[i].parse().context("--txs expects an integer")?;
                }
            }
            "--force" | "-f" => {
                force = true;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if !force && Path::new(&pk_path).exists() && Path::new(&vk_path).exists() {
        println!("Keys already exist at:");
        println!("  Proving key:   {}", pk_path);
        println!("  Verifying key: {}", vk_path);
        println!("\nUse --force to regenerate keys.");
        return Ok(());
    }

    println!("Batch circuit key generation");
    println!("============================");
    println!();
    println!("Batch size: {} transactions", num_txs);
    println!(
        "Public inputs: {} (pre_root, post_root, 3 per transaction)",
        2 + 3 * num_txs
    );
    println!();

    let circuit = BatchCircuit::dummy(num_txs);

    println!("Performing Groth16 circuit-specific setup...");
    let mut rng = StdRng::seed_from_u64(0); // Deterministic for reproducibility
    let start = std::time::Instant::now();

    let (pk, vk) = Groth16::<Bn254>::circuit_specific_setup(circuit, &mut rng)
        .context("Failed to perform circuit setup")?;

    println!("Setup complete in {:?}", start.elapsed());
    println!();

    println!("Saving proving key to {}...", pk_path);
    let mut pk_bytes = Vec::new();
    pk.serialize_compressed(&mut pk_bytes)
        .context("Failed to serialize proving key")?;
    if let Some(parent) = Path::new(&pk_path).parent() {
        fs::create_dir_all(parent).context("Failed to create proving key directory")?;
    }
    fs::write(&pk_path, &pk_bytes).context("Failed to write proving key")?;
    println!(
        "  Size: {} bytes ({:.2} MB)",
        pk_bytes.len(),
        pk_bytes.len() as f64 / 1024.0 / 1024.0
    );

    println!("Saving verifying key to {}...", vk_path);
    let mut vk_bytes = Vec::new();
    vk.serialize_compressed(&mut vk_bytes)
        .context("Failed to serialize verifying key")?;
    if let Some(parent) = Path::new(&vk_path).parent() {
        fs::create_dir_all(parent).context("Failed to create verifying key directory")?;
    }
    fs::write(&vk_path, &vk_bytes).context("Failed to write verifying key")?;
    println!("  Size: {} bytes", vk_bytes.len());

    let vk_hash = blake3::hash(&vk_bytes);
    println!();
    println!("Verification key hash (blake3):");
    println!("  {}", hex::encode(vk_hash.as_bytes()));
    println!();
    println!("Key generation complete.");

    Ok(())
}

fn print_help() {
    println!("Batch circuit key generation");
    println!();
    println!("USAGE:");
    println!("    keygen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --txs <N>          Transactions per batch (default: 1)");
    println!("    --pk-out <PATH>    Proving key output (default: ./proving.key)");
    println!("    --vk-out <PATH>    Verifying key output (default: ./verifying.key)");
    println!("    --force, -f        Overwrite existing keys");
    println!("    --help, -h         Show this help message");
}
