// Ledger module
//
// This module contains the core ledger implementation including:
// - Block structure and its pinned hash encoding
// - Proof-of-work miner with cancellation
// - The append-only chain and its integrity validation
// - Credential-derived identities and RSA-PSS signing
// - The payload wire codec and transaction batch encoder
// - Balance computation by full ledger replay

pub mod balance;
pub mod block;
pub mod chain;
pub mod config;
pub mod crypto;
pub mod identity;
pub mod miner;
pub mod transaction;

// Re-export main components for easier access
pub use balance::{build_key_registry, compute_balance};
pub use block::Block;
pub use chain::{Ledger, LedgerError, GENESIS_PAYLOAD};
pub use config::{ChainConfig, FundsPolicy};
pub use crypto::{transfer_digest, verify_signature, CryptoError, KeyPair, SENTINEL};
pub use identity::{derive_fingerprint, Identity, IdentityError};
pub use miner::CancelFlag;
pub use transaction::{parse_payload, BatchError, Record, RecordError, TransactionBatch};
