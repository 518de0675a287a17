use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::balance::compute_balance;
use super::chain::Ledger;
use super::config::FundsPolicy;
use super::crypto::{self, CryptoError};
use super::identity::Identity;

/// Wire tag of a value transfer record
pub const TRANSFER_TAG: &str = "Transaction";

/// Wire tag of a public-key registration record
pub const KEY_REGISTRATION_TAG: &str = "Signature";

/// Separator between the records of one block payload
const RECORD_SEPARATOR: char = ';';

/// Separator between the fields of one record
const FIELD_SEPARATOR: char = ',';

/// Errors that can occur while parsing a payload record
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Malformed record: {0}")]
    Malformed(String),
}

/// Errors that can occur while building a transaction batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: u64, available: i64 },

    #[error("Identity has no key pair to register")]
    KeysNotGenerated,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// One record of a block payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Record {
    /// A signed instruction moving value between two fingerprints
    Transfer {
        from: String,
        amount: u64,
        to: String,
        /// Hex signature, or the sentinel for system-originated transfers
        signature: String,
    },

    /// Binds a fingerprint to a public key from this point in the chain on
    KeyRegistration {
        owner: String,
        public_key_hex: String,
    },
}

impl Record {
    /// Encodes the record in its wire form, trailing separator included
    pub fn encode(&self) -> String {
        match self {
            Record::Transfer {
                from,
                amount,
                to,
                signature,
            } => format!(
                "{}{sep}{}{sep}{}{sep}{}{sep}{}{end}",
                TRANSFER_TAG,
                from,
                amount,
                to,
                signature,
                sep = FIELD_SEPARATOR,
                end = RECORD_SEPARATOR
            ),
            Record::KeyRegistration {
                owner,
                public_key_hex,
            } => format!(
                "{}{sep}{}{sep}{}{end}",
                KEY_REGISTRATION_TAG,
                owner,
                public_key_hex,
                sep = FIELD_SEPARATOR,
                end = RECORD_SEPARATOR
            ),
        }
    }

    /// Parses one payload segment into a record
    ///
    /// # Arguments
    ///
    /// * `segment` - One record's worth of payload, without the trailing
    ///   separator
    ///
    /// # Returns
    ///
    /// Result with the parsed record, or `Malformed` for an unknown tag,
    /// wrong field count, or unparseable amount
    pub fn parse(segment: &str) -> Result<Record, RecordError> {
        let fields: Vec<&str> = segment.split(FIELD_SEPARATOR).collect();

        match fields.as_slice() {
            [TRANSFER_TAG, from, amount, to, signature] => {
                let amount = amount
                    .parse::<u64>()
                    .map_err(|_| RecordError::Malformed(segment.to_string()))?;

                Ok(Record::Transfer {
                    from: from.to_string(),
                    amount,
                    to: to.to_string(),
                    signature: signature.to_string(),
                })
            }
            [KEY_REGISTRATION_TAG, owner, public_key_hex] => Ok(Record::KeyRegistration {
                owner: owner.to_string(),
                public_key_hex: public_key_hex.to_string(),
            }),
            _ => Err(RecordError::Malformed(segment.to_string())),
        }
    }
}

/// Splits a block payload into its well-formed records
///
/// Malformed segments are skipped, not fatal: a block may carry foreign or
/// truncated data alongside well-formed records, and one bad segment must
/// not poison the rest of the scan.
pub fn parse_payload(payload: &str) -> Vec<Record> {
    payload
        .split(RECORD_SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .filter_map(|segment| match Record::parse(segment) {
            Ok(record) => Some(record),
            Err(err) => {
                debug!("Skipping record: {}", err);
                None
            }
        })
        .collect()
}

/// Accumulates pending records for inclusion in the next mined block
///
/// Single-use per mining round: `drain` consumes the batch, and a fresh
/// batch starts empty.
#[derive(Debug, Clone, Default)]
pub struct TransactionBatch {
    data: String,
    policy: FundsPolicy,
}

impl TransactionBatch {
    /// Creates an empty batch with the given insufficient-funds policy
    pub fn new(policy: FundsPolicy) -> Self {
        TransactionBatch {
            data: String::new(),
            policy,
        }
    }

    /// Appends a transfer record, pre-checking the sender's balance
    ///
    /// When the sender's replayed balance is below the requested amount, the
    /// batch's policy decides: `ZeroAmount` records the transfer with amount
    /// 0, `Reject` refuses it.
    ///
    /// # Arguments
    ///
    /// * `from` - Sender fingerprint
    /// * `amount` - Amount to transfer
    /// * `to` - Recipient fingerprint
    /// * `signature` - Hex signature over `transfer_digest(from, amount, to)`
    /// * `ledger` - The ledger to pre-check the balance against
    pub fn add_transfer(
        &mut self,
        from: &str,
        amount: u64,
        to: &str,
        signature: &str,
        ledger: &Ledger,
    ) -> Result<(), BatchError> {
        let available = compute_balance(from, ledger);

        let amount = if available < amount as i64 {
            match self.policy {
                FundsPolicy::ZeroAmount => {
                    debug!(
                        "Insufficient funds for {}: recording amount 0 instead of {}",
                        from, amount
                    );
                    0
                }
                FundsPolicy::Reject => {
                    return Err(BatchError::InsufficientFunds {
                        required: amount,
                        available,
                    })
                }
            }
        } else {
            amount
        };

        let record = Record::Transfer {
            from: from.to_string(),
            amount,
            to: to.to_string(),
            signature: signature.to_string(),
        };
        self.data.push_str(&record.encode());

        Ok(())
    }

    /// Appends a key-registration record for an identity
    ///
    /// # Arguments
    ///
    /// * `identity` - The identity whose public key is registered; its key
    ///   pair must already be generated
    pub fn add_key_registration(&mut self, identity: &Identity) -> Result<(), BatchError> {
        let public_key = identity.public_key().ok_or(BatchError::KeysNotGenerated)?;
        let public_key_hex = crypto::encode_public_key(public_key)?;

        let record = Record::KeyRegistration {
            owner: identity.fingerprint().to_string(),
            public_key_hex,
        };
        self.data.push_str(&record.encode());

        Ok(())
    }

    /// Returns true when no records have been added
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Consumes the batch, returning the accumulated payload
    pub fn drain(self) -> String {
        self.data
    }
}
