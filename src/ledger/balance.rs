use log::{debug, warn};

use std::collections::HashMap;

use super::chain::Ledger;
use super::crypto::{self, SENTINEL};
use super::transaction::{parse_payload, Record};

/// Rebuilds the fingerprint-to-public-key registry from the chain
///
/// Every key-registration record is applied in chain order; the last write
/// for a fingerprint wins. The sentinel account is always present, mapped to
/// itself. The registry is derived state: it is recomputed from the ledger
/// on demand and never stored.
pub fn build_key_registry(ledger: &Ledger) -> HashMap<String, String> {
    let mut registry = HashMap::new();
    registry.insert(SENTINEL.to_string(), SENTINEL.to_string());

    for block in ledger.blocks() {
        for record in parse_payload(&block.payload) {
            if let Record::KeyRegistration {
                owner,
                public_key_hex,
            } = record
            {
                registry.insert(owner, public_key_hex);
            }
        }
    }

    registry
}

/// Computes a fingerprint's balance by replaying the full ledger
///
/// The scan walks every block in order, maintaining the key registry as
/// registrations are encountered, and applies each transfer whose signature
/// verifies under the sender's key on record at that point. Transfers with
/// a missing sender key or a failing signature are skipped; they never abort
/// the scan. If the chain itself fails validation the result is 0 no matter
/// what the replay accumulated.
///
/// # Arguments
///
/// * `fingerprint` - The account to balance; unknown fingerprints yield 0
/// * `ledger` - The ledger to replay
///
/// # Returns
///
/// The account's balance (debits can outrun credits, so it may be negative)
pub fn compute_balance(fingerprint: &str, ledger: &Ledger) -> i64 {
    let mut balance: i64 = 0;
    let mut registry: HashMap<String, String> = HashMap::new();
    registry.insert(SENTINEL.to_string(), SENTINEL.to_string());

    for block in ledger.blocks() {
        for record in parse_payload(&block.payload) {
            match record {
                Record::Transfer {
                    from,
                    amount,
                    to,
                    signature,
                } => {
                    // Only transfers touching the target move its balance.
                    if from != fingerprint && to != fingerprint {
                        continue;
                    }

                    let message = crypto::transfer_digest(&from, amount, &to);

                    let sender_key = match registry.get(&from) {
                        Some(key) => key,
                        None => {
                            debug!("No key registered for sender {}", from);
                            continue;
                        }
                    };

                    if !crypto::verify_signature(&message, sender_key, &signature) {
                        debug!("Skipping transfer with invalid signature from {}", from);
                        continue;
                    }

                    if to == fingerprint {
                        balance += amount as i64;
                    }
                    if from == fingerprint {
                        balance -= amount as i64;
                    }
                }
                Record::KeyRegistration {
                    owner,
                    public_key_hex,
                } => {
                    registry.insert(owner, public_key_hex);
                }
            }
        }
    }

    // An invalid chain is untrustworthy; it yields no claimable balance.
    if !ledger.validate() {
        warn!("Balance for {} collapsed to 0: chain failed validation", fingerprint);
        return 0;
    }

    balance
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::config::ChainConfig;

    fn test_config() -> ChainConfig {
        let mut config = ChainConfig::with_difficulty(1);
        config.reward_enabled = false;
        config
    }

    fn sentinel_transfer(amount: u64, to: &str) -> String {
        Record::Transfer {
            from: SENTINEL.to_string(),
            amount,
            to: to.to_string(),
            signature: SENTINEL.to_string(),
        }
        .encode()
    }

    fn registration(owner: &str, key: &str) -> String {
        Record::KeyRegistration {
            owner: owner.to_string(),
            public_key_hex: key.to_string(),
        }
        .encode()
    }

    #[test]
    fn test_empty_chain_balances_are_zero() {
        let ledger = Ledger::with_config(test_config());

        assert_eq!(compute_balance("anyone", &ledger), 0);
        assert_eq!(compute_balance(SENTINEL, &ledger), 0);
    }

    #[test]
    fn test_sentinel_transfers_credit_and_debit() {
        let mut ledger = Ledger::with_config(test_config());
        ledger.append(sentinel_transfer(10, "f"), "f");
        ledger.append(sentinel_transfer(3, "g"), "f");

        assert_eq!(compute_balance("f", &ledger), 10);
        assert_eq!(compute_balance("g", &ledger), 3);
        assert_eq!(compute_balance(SENTINEL, &ledger), -13);
        assert_eq!(compute_balance("stranger", &ledger), 0);
    }

    #[test]
    fn test_mining_reward_credits_miner() {
        let mut config = ChainConfig::with_difficulty(1);
        config.mining_reward = 10;

        let mut ledger = Ledger::with_config(config);
        ledger.append(String::new(), "miner");

        assert_eq!(compute_balance("miner", &ledger), 10);
    }

    #[test]
    fn test_transfer_without_registered_key_is_skipped() {
        let mut ledger = Ledger::with_config(test_config());
        let unsigned = Record::Transfer {
            from: "f".to_string(),
            amount: 5,
            to: "g".to_string(),
            signature: "deadbeef".to_string(),
        }
        .encode();
        ledger.append(unsigned, "f");

        assert_eq!(compute_balance("g", &ledger), 0);
        assert_eq!(compute_balance("f", &ledger), 0);
    }

    #[test]
    fn test_registry_last_write_wins() {
        let mut ledger = Ledger::with_config(test_config());
        ledger.append(registration("f", "aa"), "f");
        ledger.append(registration("f", "bb"), "f");

        let registry = build_key_registry(&ledger);
        assert_eq!(registry.get("f").map(String::as_str), Some("bb"));
        assert_eq!(registry.get(SENTINEL).map(String::as_str), Some(SENTINEL));
    }

    #[test]
    fn test_invalid_chain_collapses_balance() {
        let mut ledger = Ledger::with_config(test_config());
        ledger.append(sentinel_transfer(10, "f"), "f");
        ledger.append(String::new(), "f");

        let mut blocks = ledger.blocks().to_vec();
        blocks[1].payload = sentinel_transfer(10000, "f");
        let tampered = Ledger::from_blocks(blocks, test_config());

        assert_eq!(compute_balance("f", &tampered), 0);
    }
}
