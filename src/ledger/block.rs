use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use std::fmt;

/// Represents a block in the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Index of the block in the chain
    pub index: u64,

    /// Unix timestamp (seconds) when the block was created
    pub timestamp: i64,

    /// Payload carried by this block (delimited transaction records)
    pub payload: String,

    /// Proof-of-work nonce
    pub nonce: u64,

    /// Hash of the previous block
    pub previous_hash: String,

    /// Hash of the current block (calculated)
    pub hash: String,
}

impl Block {
    /// Creates a new block with nonce 0 and its hash already computed
    ///
    /// # Arguments
    ///
    /// * `index` - The index of the block in the chain
    /// * `timestamp` - Unix timestamp in seconds
    /// * `payload` - The payload to store in the block
    /// * `previous_hash` - The hash of the previous block
    ///
    /// # Returns
    ///
    /// A new Block instance
    pub fn new(index: u64, timestamp: i64, payload: String, previous_hash: String) -> Self {
        let mut block = Block {
            index,
            timestamp,
            payload,
            nonce: 0,
            previous_hash,
            hash: String::new(),
        };

        block.hash = block.calculate_hash();
        block
    }

    /// Calculates the hash of the block
    ///
    /// Hash encoding v1: the lowercase-hex SHA-256 digest of the decimal
    /// forms of index, timestamp and nonce, with the payload and previous
    /// hash in between, concatenated in the order
    /// `index, timestamp, payload, previous_hash, nonce`. Every stored hash
    /// in a chain depends on this exact encoding.
    ///
    /// # Returns
    ///
    /// The SHA-256 hash of the block as a hexadecimal string
    pub fn calculate_hash(&self) -> String {
        let mut hasher = Sha256::new();

        hasher.update(self.index.to_string().as_bytes());
        hasher.update(self.timestamp.to_string().as_bytes());
        hasher.update(self.payload.as_bytes());
        hasher.update(self.previous_hash.as_bytes());
        hasher.update(self.nonce.to_string().as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Index: {}", self.index)?;
        writeln!(f, "Time: {}", self.timestamp)?;
        writeln!(f, "Payload: {}", self.payload)?;
        writeln!(f, "Nonce: {}", self.nonce)?;
        writeln!(f, "Previous Hash: {}", self.previous_hash)?;
        write!(f, "Hash: {}", self.hash)
    }
}
