//! End-to-end batch scenarios: witness construction, root chaining,
//! satisfaction and rejection of the assembled circuit.

use std::io::Cursor;

use ark_bn254::Fr;
use ark_ff::One;
use ark_relations::r1cs::{ConstraintSynthesizer, ConstraintSystem};
use ark_std::rand::rngs::StdRng;
use ark_std::rand::SeedableRng;

use rollup_prover::eddsa::{self, Keypair};
use rollup_prover::merkle::{account_leaf, leaf_from_fields, AccountTree};
use rollup_prover::witness_builder::{derive_public_inputs, AccountManager};
use rollup_prover::{
    reader, AccountState, BatchCircuit, BatchInput, OnchainTransaction, PoseidonHasher,
    SignedTransaction, TransactionProof,
};

const SENDER: u32 = 7;
const RECEIVER: u32 = 42;

fn funded_ledger() -> AccountManager<PoseidonHasher> {
    let mut rng = StdRng::seed_from_u64(1000);
    let mut mgr = AccountManager::new(PoseidonHasher::new());
    for i in 0..=RECEIVER {
        let balance = if i == SENDER { 1000 } else { 0 };
        mgr.add_account(Keypair::generate(&mut rng), balance);
    }
    mgr
}

fn is_satisfied(circuit: BatchCircuit) -> bool {
    let cs = ConstraintSystem::<Fr>::new_ref();
    circuit.generate_constraints(cs.clone()).unwrap();
    cs.is_satisfied().unwrap()
}

/// A two-account tree with explicit states at the scenario indexes.
fn two_account_tree(
    hasher: &PoseidonHasher,
    sender_key: &Keypair,
    receiver_key: &Keypair,
    sender_nonce: u32,
) -> (AccountTree<PoseidonHasher>, AccountState, AccountState) {
    let state_from = AccountState {
        pubkey: sender_key.public,
        balance: Fr::from(1000u64),
        nonce: sender_nonce,
    };
    let state_to = AccountState {
        pubkey: receiver_key.public,
        balance: Fr::from(0u64),
        nonce: 0,
    };
    let mut tree = AccountTree::new(hasher.clone());
    tree.update(SENDER, account_leaf(hasher, &state_from));
    tree.update(RECEIVER, account_leaf(hasher, &state_to));
    (tree, state_from, state_to)
}

/// Apply a transaction's update equations to `tree` without any operator
/// checks, capturing the witness paths. Lets tests hand malformed
/// transfers to the circuit.
fn craft_proof(
    hasher: &PoseidonHasher,
    tree: &mut AccountTree<PoseidonHasher>,
    stx: SignedTransaction,
    state_from: AccountState,
    state_to: AccountState,
) -> TransactionProof {
    let tx = stx.tx;

    let before_from = tree.path(tx.from_idx);
    let new_sender_balance = state_from.balance - Fr::from(tx.amount);
    let sender_leaf = leaf_from_fields(
        hasher,
        state_from.pubkey.x,
        state_from.pubkey.y,
        new_sender_balance,
        Fr::from(stx.nonce) + Fr::one(),
    );
    tree.update(tx.from_idx, sender_leaf);

    let before_to = tree.path(tx.to_idx);
    let new_receiver_balance = state_to.balance + Fr::from(tx.amount);
    let receiver_leaf = leaf_from_fields(
        hasher,
        state_to.pubkey.x,
        state_to.pubkey.y,
        new_receiver_balance,
        Fr::from(state_to.nonce),
    );
    tree.update(tx.to_idx, receiver_leaf);
    let after_to = tree.path(tx.to_idx);

    TransactionProof {
        stx,
        state_from,
        state_to,
        before_from,
        before_to,
        after_to,
    }
}

#[test]
fn happy_path_single_transfer() {
    let mut mgr = funded_ledger();
    let pre_root = mgr.root();

    let stx = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let proof = mgr.apply(stx).unwrap();

    assert_eq!(mgr.account(SENDER).balance, 750);
    assert_eq!(mgr.account(SENDER).nonce, 1);
    assert_eq!(mgr.account(RECEIVER).balance, 250);

    let batch = BatchInput { txs: vec![proof] };
    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();
    assert_eq!(public.pre_root, pre_root);
    assert_eq!(public.post_root, mgr.root());

    assert!(is_satisfied(BatchCircuit::new(
        public.pre_root,
        public.post_root,
        batch
    )));
}

#[test]
fn insufficient_funds_are_unprovable() {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(2000);
    let sender_key = Keypair::generate(&mut rng);
    let receiver_key = Keypair::generate(&mut rng);
    let (mut tree, state_from, state_to) = two_account_tree(&hasher, &sender_key, &receiver_key, 0);
    let pre_root = tree.root();

    // Amount exceeds the sender balance by one; the subtraction wraps in
    // the field and the range check must catch it.
    let tx = OnchainTransaction {
        from_idx: SENDER,
        to_idx: RECEIVER,
        amount: 1001,
    };
    let message = SignedTransaction::pack_message(SENDER, RECEIVER, 1001, 0);
    let sig = eddsa::sign(&hasher, &sender_key, message);
    let stx = SignedTransaction { tx, nonce: 0, sig };

    let proof = craft_proof(&hasher, &mut tree, stx, state_from, state_to);
    let batch = BatchInput { txs: vec![proof] };

    assert!(!is_satisfied(BatchCircuit::new(pre_root, tree.root(), batch)));
}

#[test]
fn wrong_signer_is_rejected() {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(3000);
    let sender_key = Keypair::generate(&mut rng);
    let receiver_key = Keypair::generate(&mut rng);
    let (mut tree, state_from, state_to) = two_account_tree(&hasher, &sender_key, &receiver_key, 0);
    let pre_root = tree.root();

    let tx = OnchainTransaction {
        from_idx: SENDER,
        to_idx: RECEIVER,
        amount: 250,
    };
    let message = SignedTransaction::pack_message(SENDER, RECEIVER, 250, 0);
    // Signed by the receiver's key instead of the sender's.
    let sig = eddsa::sign(&hasher, &receiver_key, message);
    let stx = SignedTransaction { tx, nonce: 0, sig };

    let proof = craft_proof(&hasher, &mut tree, stx, state_from, state_to);
    let batch = BatchInput { txs: vec![proof] };

    assert!(!is_satisfied(BatchCircuit::new(pre_root, tree.root(), batch)));
}

#[test]
fn replayed_nonce_is_rejected() {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(4000);
    let sender_key = Keypair::generate(&mut rng);
    let receiver_key = Keypair::generate(&mut rng);
    // Sender's tree leaf carries nonce 5, but the message is signed with
    // the stale nonce 4. Pre-membership must fail.
    let (mut tree, state_from, state_to) = two_account_tree(&hasher, &sender_key, &receiver_key, 5);
    let pre_root = tree.root();

    let tx = OnchainTransaction {
        from_idx: SENDER,
        to_idx: RECEIVER,
        amount: 250,
    };
    let message = SignedTransaction::pack_message(SENDER, RECEIVER, 250, 4);
    let sig = eddsa::sign(&hasher, &sender_key, message);
    let stx = SignedTransaction { tx, nonce: 4, sig };

    let proof = craft_proof(&hasher, &mut tree, stx, state_from, state_to);
    let batch = BatchInput { txs: vec![proof] };

    assert!(!is_satisfied(BatchCircuit::new(pre_root, tree.root(), batch)));
}

#[test]
fn self_transfer_is_unprovable() {
    let hasher = PoseidonHasher::new();
    let mut rng = StdRng::seed_from_u64(5000);
    let sender_key = Keypair::generate(&mut rng);
    let receiver_key = Keypair::generate(&mut rng);
    let (mut tree, state_from, _) = two_account_tree(&hasher, &sender_key, &receiver_key, 0);
    let pre_root = tree.root();

    let tx = OnchainTransaction {
        from_idx: SENDER,
        to_idx: SENDER,
        amount: 250,
    };
    let message = SignedTransaction::pack_message(SENDER, SENDER, 250, 0);
    let sig = eddsa::sign(&hasher, &sender_key, message);
    let stx = SignedTransaction { tx, nonce: 0, sig };

    // The receiver pre-state the prover would naively supply: the sender's
    // own pre-state. Its leaf is already overwritten in the intermediate
    // tree, so both membership checks cannot hold at once.
    let proof = craft_proof(&hasher, &mut tree, stx, state_from, state_from);
    let batch = BatchInput { txs: vec![proof] };

    assert!(!is_satisfied(BatchCircuit::new(pre_root, tree.root(), batch)));
}

#[test]
fn chained_batch_spends_received_funds() {
    let mut mgr = funded_ledger();
    let pre_root = mgr.root();

    // Second transfer is only funded by the first.
    let stx1 = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let p1 = mgr.apply(stx1).unwrap();
    let stx2 = mgr.sign_transfer(RECEIVER, SENDER, 200);
    let p2 = mgr.apply(stx2).unwrap();

    let batch = BatchInput { txs: vec![p1, p2] };
    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();
    assert_eq!(public.pre_root, pre_root);
    assert_eq!(public.post_root, mgr.root());
    assert_eq!(mgr.account(SENDER).balance, 950);
    assert_eq!(mgr.account(RECEIVER).balance, 50);

    assert!(is_satisfied(BatchCircuit::new(
        public.pre_root,
        public.post_root,
        batch
    )));
}

#[test]
fn tampered_signature_invalidates_batch() {
    let mut mgr = funded_ledger();
    let stx = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let mut proof = mgr.apply(stx).unwrap();
    proof.stx.sig.s += Fr::one();

    let batch = BatchInput {
        txs: vec![proof],
    };
    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();

    assert!(!is_satisfied(BatchCircuit::new(
        public.pre_root,
        public.post_root,
        batch
    )));
}

#[test]
fn wrong_public_post_root_is_rejected() {
    let mut mgr = funded_ledger();
    let stx = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let proof = mgr.apply(stx).unwrap();

    let batch = BatchInput { txs: vec![proof] };
    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();

    assert!(!is_satisfied(BatchCircuit::new(
        public.pre_root,
        public.post_root + Fr::one(),
        batch
    )));
}

#[test]
fn witness_text_round_trip_still_proves() {
    let mut mgr = funded_ledger();
    let stx1 = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let p1 = mgr.apply(stx1).unwrap();
    let stx2 = mgr.sign_transfer(RECEIVER, SENDER, 100);
    let p2 = mgr.apply(stx2).unwrap();

    let text = reader::serialize_batch(&BatchInput { txs: vec![p1, p2] });
    let batch = reader::read_batch(Cursor::new(text.as_bytes()), usize::MAX).unwrap();
    assert_eq!(reader::serialize_batch(&batch), text);

    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();
    assert_eq!(public.post_root, mgr.root());
    assert!(is_satisfied(BatchCircuit::new(
        public.pre_root,
        public.post_root,
        batch
    )));
}

// Full backend run; slow, so not part of the default test pass.
#[test]
#[ignore]
fn groth16_end_to_end() {
    use ark_bn254::Bn254;
    use ark_groth16::Groth16;
    use ark_snark::SNARK;

    let mut mgr = funded_ledger();
    let stx = mgr.sign_transfer(SENDER, RECEIVER, 250);
    let proof = mgr.apply(stx).unwrap();
    let batch = BatchInput { txs: vec![proof] };
    let public = derive_public_inputs(&PoseidonHasher::new(), &batch).unwrap();

    let mut rng = StdRng::seed_from_u64(0);
    let (pk, vk) =
        Groth16::<Bn254>::circuit_specific_setup(BatchCircuit::dummy(1), &mut rng).unwrap();

    let circuit = BatchCircuit::new(public.pre_root, public.post_root, batch);
    let snark = Groth16::<Bn254>::prove(&pk, circuit, &mut rng).unwrap();

    assert!(Groth16::<Bn254>::verify(&vk, &public.to_field_elements(), &snark).unwrap());
}
