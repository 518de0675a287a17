// microledger
//
// A single-node, append-only ledger that proves work for each appended
// block, chains blocks by hash, and authorizes value transfers with RSA-PSS
// signatures whose public keys are distributed through the ledger itself.
//
// The crate is the core only: interactive sessions, display formatting and
// credential prompting belong to the caller, which drives the ledger through
// `TransactionBatch`, `Ledger::append` and `compute_balance`.

pub mod ledger;

pub use ledger::{
    build_key_registry, compute_balance, derive_fingerprint, parse_payload, transfer_digest,
    verify_signature, Block, CancelFlag, ChainConfig, FundsPolicy, Identity, Ledger, Record,
    TransactionBatch, SENTINEL,
};
