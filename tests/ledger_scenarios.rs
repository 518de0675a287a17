use microledger::{
    compute_balance, transfer_digest, ChainConfig, FundsPolicy, Identity, Ledger,
    TransactionBatch, SENTINEL,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_config() -> ChainConfig {
    ChainConfig {
        difficulty: 1,
        mining_reward: 10,
        reward_enabled: true,
        funds_policy: FundsPolicy::ZeroAmount,
    }
}

#[test]
fn transfer_lifecycle() {
    init_logging();

    let mut ledger = Ledger::with_config(test_config());
    let mut alice = Identity::new("alice", "secret");
    let bob = Identity::new("bob", "hunter2");
    let miner = Identity::new("miner", "pickaxe");

    // A genesis-only chain holds no value for anyone.
    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 0);

    // Block 1: register alice's key. The miner takes the reward, so alice's
    // balance stays at 0.
    alice.generate_keys().unwrap();
    let mut batch = TransactionBatch::default();
    batch.add_key_registration(&alice).unwrap();
    ledger.append(batch.drain(), miner.fingerprint());

    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 0);
    assert_eq!(compute_balance(miner.fingerprint(), &ledger), 10);

    // Block 2: alice mines and collects the sentinel-signed reward transfer.
    ledger.append(String::new(), alice.fingerprint());
    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 10);

    // Block 3: alice signs a transfer of 4 to bob.
    let message = transfer_digest(alice.fingerprint(), 4, bob.fingerprint());
    let signature = alice.sign("alice", "secret", &message).unwrap();

    let mut batch = TransactionBatch::default();
    batch
        .add_transfer(
            alice.fingerprint(),
            4,
            bob.fingerprint(),
            &signature,
            &ledger,
        )
        .unwrap();
    ledger.append(batch.drain(), miner.fingerprint());

    assert!(ledger.validate());
    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 6);
    assert_eq!(compute_balance(bob.fingerprint(), &ledger), 4);

    // Fingerprints that never appear anywhere are worth 0, not an error.
    assert_eq!(compute_balance("never-registered", &ledger), 0);
}

#[test]
fn bogus_signature_moves_no_value() {
    init_logging();

    let mut ledger = Ledger::with_config(test_config());
    let mut alice = Identity::new("alice", "secret");
    let bob = Identity::new("bob", "hunter2");

    alice.generate_keys().unwrap();
    let mut batch = TransactionBatch::default();
    batch.add_key_registration(&alice).unwrap();
    ledger.append(batch.drain(), alice.fingerprint());
    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 10);

    // A transfer carrying garbage instead of alice's signature is excluded
    // from every balance; the scan does not abort.
    let mut batch = TransactionBatch::default();
    batch
        .add_transfer(
            alice.fingerprint(),
            4,
            bob.fingerprint(),
            "deadbeefdeadbeef",
            &ledger,
        )
        .unwrap();
    ledger.append(batch.drain(), "someone-else");

    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 10);
    assert_eq!(compute_balance(bob.fingerprint(), &ledger), 0);
}

#[test]
fn insufficient_funds_are_demonetized_by_default() {
    init_logging();

    let mut ledger = Ledger::with_config(test_config());
    let mut alice = Identity::new("alice", "secret");
    let bob = Identity::new("bob", "hunter2");

    alice.generate_keys().unwrap();
    let mut batch = TransactionBatch::default();
    batch.add_key_registration(&alice).unwrap();
    ledger.append(batch.drain(), alice.fingerprint());

    // Alice holds 10 but asks to send 25. The recorded transfer carries
    // amount 0, so signing the zeroed triple keeps it verifiable.
    let message = transfer_digest(alice.fingerprint(), 0, bob.fingerprint());
    let signature = alice.sign("alice", "secret", &message).unwrap();

    let mut batch = TransactionBatch::default();
    batch
        .add_transfer(
            alice.fingerprint(),
            25,
            bob.fingerprint(),
            &signature,
            &ledger,
        )
        .unwrap();
    ledger.append(batch.drain(), "someone-else");

    assert_eq!(compute_balance(alice.fingerprint(), &ledger), 10);
    assert_eq!(compute_balance(bob.fingerprint(), &ledger), 0);
}

#[test]
fn corruption_collapses_every_balance() {
    init_logging();

    let mut ledger = Ledger::with_config(test_config());
    ledger.append(String::new(), "miner");
    ledger.append(String::new(), "miner");
    assert_eq!(compute_balance("miner", &ledger), 20);

    // Flip one byte of a historical payload and rebuild the chain.
    let mut blocks = ledger.blocks().to_vec();
    let mut bytes = blocks[1].payload.clone().into_bytes();
    bytes[0] ^= 1;
    blocks[1].payload = String::from_utf8(bytes).unwrap();
    let tampered = Ledger::from_blocks(blocks, test_config());

    assert!(!tampered.validate());
    assert_eq!(compute_balance("miner", &tampered), 0);
}

#[test]
fn block_serializes_for_display_layers() {
    init_logging();

    let mut ledger = Ledger::with_config(test_config());
    ledger.append(String::new(), "miner");

    let json = serde_json::to_string(ledger.tip()).unwrap();
    let round_tripped: microledger::Block = serde_json::from_str(&json).unwrap();

    assert_eq!(&round_tripped, ledger.tip());
}
