use log::debug;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::block::Block;

/// Checks whether a hash meets the difficulty target
///
/// # Arguments
///
/// * `hash` - The hex-encoded block hash
/// * `difficulty` - Required number of leading `'0'` characters
pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
    hash.len() >= difficulty && hash.as_bytes()[..difficulty].iter().all(|&b| b == b'0')
}

/// Performs proof of work to find a valid hash
///
/// Pure function over the candidate block: the nonce is incremented and the
/// hash recomputed until the hash meets the difficulty target. The search is
/// unbounded; the difficulty must be chosen so it terminates in practice.
///
/// # Arguments
///
/// * `block` - The candidate block (nonce and hash will be replaced)
/// * `difficulty` - Required number of leading zero hex characters
///
/// # Returns
///
/// The mined block with its terminal nonce and hash
pub fn mine(mut block: Block, difficulty: usize) -> Block {
    while !meets_difficulty(&block.hash, difficulty) {
        block.nonce += 1;
        block.hash = block.calculate_hash();
    }

    block
}

/// A shared flag for cancelling an in-flight nonce search
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    /// Creates a new, unset flag
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation of the search holding this flag
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Returns true once cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Performs proof of work, giving up when the flag is raised
///
/// The flag is checked on every iteration. On cancellation the partially
/// mined candidate is discarded and `None` is returned, so a cancelled
/// search can never leak a half-mined block into a chain.
///
/// # Returns
///
/// The mined block, or `None` if the search was cancelled first
pub fn try_mine(mut block: Block, difficulty: usize, cancel: &CancelFlag) -> Option<Block> {
    while !meets_difficulty(&block.hash, difficulty) {
        if cancel.is_cancelled() {
            debug!("Mining cancelled for block {} at nonce {}", block.index, block.nonce);
            return None;
        }

        block.nonce += 1;
        block.hash = block.calculate_hash();
    }

    Some(block)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> Block {
        Block::new(1, 1700000000, "payload".to_string(), "previous_hash".to_string())
    }

    #[test]
    fn test_meets_difficulty() {
        assert!(meets_difficulty("00ab", 2));
        assert!(meets_difficulty("ab", 0));
        assert!(!meets_difficulty("0ab", 2));
        assert!(!meets_difficulty("0", 2));
    }

    #[test]
    fn test_mine_meets_target() {
        for difficulty in 0..3 {
            let block = mine(candidate(), difficulty);
            assert!(meets_difficulty(&block.hash, difficulty));
            assert_eq!(block.hash, block.calculate_hash());
        }
    }

    #[test]
    fn test_try_mine_completes_when_not_cancelled() {
        let cancel = CancelFlag::new();
        let block = try_mine(candidate(), 1, &cancel).unwrap();
        assert!(meets_difficulty(&block.hash, 1));
    }

    #[test]
    fn test_try_mine_cancelled() {
        let cancel = CancelFlag::new();
        cancel.cancel();

        // Difficulty high enough that the target cannot be hit on the
        // nonce-0 hash; the pre-raised flag must stop the search.
        let result = try_mine(candidate(), 16, &cancel);
        assert!(result.is_none());
    }
}
