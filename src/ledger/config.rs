use serde::{Deserialize, Serialize};

/// Default number of leading zero hex characters required of a block hash
pub const DEFAULT_DIFFICULTY: usize = 4;

/// Policy applied when a transfer is requested for more than the sender holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FundsPolicy {
    /// Record the transfer with its amount downgraded to zero. This is the
    /// historical wire behavior: the transfer stays in the ledger but moves
    /// no value.
    ZeroAmount,

    /// Refuse to record the transfer and report the shortfall to the caller.
    Reject,
}

impl Default for FundsPolicy {
    fn default() -> Self {
        FundsPolicy::ZeroAmount
    }
}

/// Tunable parameters of a ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Mining difficulty (number of leading zeros required in hash)
    pub difficulty: usize,

    /// Amount credited to the miner of each appended block
    pub mining_reward: u64,

    /// Whether appending a block credits the miner at all
    pub reward_enabled: bool,

    /// What to do with transfers that exceed the sender's balance
    pub funds_policy: FundsPolicy,
}

impl ChainConfig {
    /// Creates a config for the given difficulty with the matching reward
    ///
    /// # Arguments
    ///
    /// * `difficulty` - Required number of leading zero hex characters
    pub fn with_difficulty(difficulty: usize) -> Self {
        ChainConfig {
            difficulty,
            mining_reward: reward_for(difficulty),
            ..ChainConfig::default()
        }
    }
}

impl Default for ChainConfig {
    fn default() -> Self {
        ChainConfig {
            difficulty: DEFAULT_DIFFICULTY,
            mining_reward: reward_for(DEFAULT_DIFFICULTY),
            reward_enabled: true,
            funds_policy: FundsPolicy::default(),
        }
    }
}

/// Reward for mining one block at the given difficulty
///
/// Scaled as 8^difficulty so that raising the difficulty by one level halves
/// the currency mined per second (one extra zero costs a 16x longer search).
pub fn reward_for(difficulty: usize) -> u64 {
    8u64.pow(difficulty as u32)
}
