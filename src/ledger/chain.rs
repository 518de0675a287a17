use chrono::Utc;
use log::{info, warn};
use thiserror::Error;

use super::block::Block;
use super::config::ChainConfig;
use super::crypto::SENTINEL;
use super::miner::{self, CancelFlag};
use super::transaction::Record;

/// Fixed payload of the genesis block
pub const GENESIS_PAYLOAD: &str = "The first block!";

/// Errors that can occur during ledger operations
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Block index out of range: {index} (chain length {len})")]
    OutOfRange { index: u64, len: u64 },
}

/// An append-only sequence of proof-of-work blocks
///
/// Mutation is `&mut self`: there is exactly one in-flight append per chain
/// tip, and nothing can observe a block mid-mine. Callers that share a
/// ledger across threads own the locking around `append`.
#[derive(Debug, Clone)]
pub struct Ledger {
    /// The chain of blocks
    blocks: Vec<Block>,

    /// Tunable parameters (difficulty, reward, funds policy)
    config: ChainConfig,
}

impl Ledger {
    /// Creates a new ledger with the default config and a genesis block
    pub fn new() -> Self {
        Self::with_config(ChainConfig::default())
    }

    /// Creates a new ledger with the given config and a genesis block
    ///
    /// The genesis block sits at index 0 with a fixed payload and the
    /// all-zero digest as its predecessor hash. It is not mined; the
    /// proof-of-work invariant starts at index 1.
    pub fn with_config(config: ChainConfig) -> Self {
        let genesis = Block::new(
            0,
            Utc::now().timestamp(),
            GENESIS_PAYLOAD.to_string(),
            SENTINEL.to_string(),
        );

        Ledger {
            blocks: vec![genesis],
            config,
        }
    }

    /// Rebuilds a ledger from previously produced blocks
    ///
    /// No validation happens here; call `validate` to check the chain. An
    /// empty block list falls back to a fresh genesis chain.
    pub fn from_blocks(blocks: Vec<Block>, config: ChainConfig) -> Self {
        if blocks.is_empty() {
            return Self::with_config(config);
        }

        Ledger { blocks, config }
    }

    /// Builds the next candidate block for the given payload
    ///
    /// Appends the miner-reward transfer (sentinel account to miner, sentinel
    /// signature) when rewards are enabled, stamps the next index, and links
    /// to the stored hash of the current tail.
    fn candidate(&self, mut payload: String, miner_fingerprint: &str) -> Block {
        if self.config.reward_enabled {
            let reward = Record::Transfer {
                from: SENTINEL.to_string(),
                amount: self.config.mining_reward,
                to: miner_fingerprint.to_string(),
                signature: SENTINEL.to_string(),
            };
            payload.push_str(&reward.encode());
        }

        let tail = self.tip();
        // Block timestamps never decrease, even if the wall clock does.
        let timestamp = Utc::now().timestamp().max(tail.timestamp);

        Block::new(tail.index + 1, timestamp, payload, tail.hash.clone())
    }

    /// Mines and appends a new block carrying the given payload
    ///
    /// # Arguments
    ///
    /// * `payload` - Encoded records, as produced by `TransactionBatch::drain`
    /// * `miner_fingerprint` - Fingerprint credited with the mining reward
    ///
    /// # Returns
    ///
    /// The index of the appended block
    pub fn append(&mut self, payload: String, miner_fingerprint: &str) -> u64 {
        let candidate = self.candidate(payload, miner_fingerprint);
        let block = miner::mine(candidate, self.config.difficulty);

        info!("Mined block {} with hash {}", block.index, block.hash);

        let index = block.index;
        self.blocks.push(block);
        index
    }

    /// Mines and appends a new block, giving up if the flag is raised
    ///
    /// On cancellation nothing is appended and the partially mined candidate
    /// is discarded; the chain is left exactly as it was.
    ///
    /// # Returns
    ///
    /// The index of the appended block, or `None` if mining was cancelled
    pub fn try_append(
        &mut self,
        payload: String,
        miner_fingerprint: &str,
        cancel: &CancelFlag,
    ) -> Option<u64> {
        let candidate = self.candidate(payload, miner_fingerprint);
        let block = miner::try_mine(candidate, self.config.difficulty, cancel)?;

        info!("Mined block {} with hash {}", block.index, block.hash);

        let index = block.index;
        self.blocks.push(block);
        Some(index)
    }

    /// Gets the block at the given index
    ///
    /// # Returns
    ///
    /// Result with a reference to the block, or `OutOfRange`
    pub fn get(&self, index: u64) -> Result<&Block, LedgerError> {
        self.blocks
            .get(index as usize)
            .ok_or(LedgerError::OutOfRange {
                index,
                len: self.blocks.len() as u64,
            })
    }

    /// Gets the current tail block
    pub fn tip(&self) -> &Block {
        // The genesis block guarantees a non-empty chain.
        self.blocks.last().unwrap()
    }

    /// Gets the number of blocks in the chain
    pub fn len(&self) -> u64 {
        self.blocks.len() as u64
    }

    /// Returns true when the chain holds no blocks (never, in practice)
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Gets the blocks of the chain, in order
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Gets the ledger's config
    pub fn config(&self) -> &ChainConfig {
        &self.config
    }

    /// Validates every predecessor link in the chain
    ///
    /// The prior block's hash is recomputed from its stored fields and
    /// compared with the link the next block carries; stored hashes are not
    /// trusted. Never panics or errors.
    ///
    /// # Returns
    ///
    /// true if every link checks out, false on the first mismatch
    pub fn validate(&self) -> bool {
        for i in 1..self.blocks.len() {
            let recomputed = self.blocks[i - 1].calculate_hash();

            if self.blocks[i].previous_hash != recomputed {
                warn!("Chain invalid at block {}: predecessor hash mismatch", i);
                return false;
            }
        }

        true
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
