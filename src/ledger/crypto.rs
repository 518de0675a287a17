use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey, LineEnding};
use rsa::pss::Pss;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256};
use thiserror::Error;

use std::fmt;

/// The reserved all-zero digest. Doubles as the system/reward fingerprint
/// and as the "no signature required" sentinel signature value.
pub const SENTINEL: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// RSA modulus size used for newly generated key pairs
const RSA_BITS: usize = 2048;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Failed to generate keypair: {0}")]
    KeyGeneration(String),

    #[error("Failed to sign message: {0}")]
    Signing(String),

    #[error("Invalid public key: {0}")]
    InvalidPublicKey(String),

    #[error("Decoding error: {0}")]
    Decoding(String),
}

/// Hashes the UTF-8 concatenation of the given parts
///
/// # Returns
///
/// The SHA-256 digest as a lowercase hexadecimal string
pub fn sha256_hex(parts: &[&str]) -> String {
    let mut hasher = Sha256::new();

    for part in parts {
        hasher.update(part.as_bytes());
    }

    format!("{:x}", hasher.finalize())
}

/// Computes the message a transfer signs: `H(from || amount || to)` with the
/// amount in its decimal form
pub fn transfer_digest(from: &str, amount: u64, to: &str) -> String {
    sha256_hex(&[from, &amount.to_string(), to])
}

/// Maximal PSS salt length for a key of the given byte size
fn pss_salt_len(key_bytes: usize) -> usize {
    key_bytes.saturating_sub(Sha256::output_size() + 2)
}

/// An RSA key pair used to authorize transfers
#[derive(Clone)]
pub struct KeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl KeyPair {
    /// Generates a fresh 2048-bit RSA key pair
    ///
    /// # Returns
    ///
    /// Result with the new KeyPair
    pub fn generate() -> Result<Self, CryptoError> {
        let mut rng = OsRng;

        let private = RsaPrivateKey::new(&mut rng, RSA_BITS)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = private.to_public_key();

        Ok(KeyPair { private, public })
    }

    /// Gets the public half of the key pair
    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Signs a message with the private key
    ///
    /// Scheme: RSA-PSS with an MGF1/SHA-256 mask and maximal salt length,
    /// over the SHA-256 digest of the message.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to sign
    ///
    /// # Returns
    ///
    /// Result with the signature as a hexadecimal string
    pub fn sign(&self, message: &str) -> Result<String, CryptoError> {
        let digest = Sha256::digest(message.as_bytes());
        let salt_len = pss_salt_len(self.private.size());

        let signature = self
            .private
            .sign_with_rng(&mut OsRng, Pss::new_with_salt::<Sha256>(salt_len), &digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        Ok(hex::encode(signature))
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair").finish_non_exhaustive()
    }
}

/// Verifies a signature against a message and a hex-encoded public key
///
/// The sentinel signature is accepted unconditionally; it marks
/// system-originated transfers such as mining rewards. Every other failure
/// mode (bad hex, unparseable key, verification mismatch) yields `false`.
/// Verification never propagates an error.
///
/// # Arguments
///
/// * `message` - The original message
/// * `public_key_hex` - Hex encoding of the signer's PEM public key
/// * `signature_hex` - Hex encoding of the signature
pub fn verify_signature(message: &str, public_key_hex: &str, signature_hex: &str) -> bool {
    if signature_hex == SENTINEL {
        return true;
    }

    let public_key = match decode_public_key(public_key_hex) {
        Ok(key) => key,
        Err(_) => return false,
    };

    let signature = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let digest = Sha256::digest(message.as_bytes());
    let salt_len = pss_salt_len(public_key.size());

    public_key
        .verify(Pss::new_with_salt::<Sha256>(salt_len), &digest, &signature)
        .is_ok()
}

/// Serializes a public key for inclusion in a key-registration record
///
/// # Returns
///
/// Result with the hex encoding of the SPKI PEM bytes
pub fn encode_public_key(public_key: &RsaPublicKey) -> Result<String, CryptoError> {
    let pem = public_key
        .to_public_key_pem(LineEnding::LF)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))?;

    Ok(hex::encode(pem.as_bytes()))
}

/// Parses a public key from its hex-encoded PEM form
pub fn decode_public_key(public_key_hex: &str) -> Result<RsaPublicKey, CryptoError> {
    let pem_bytes = hex::decode(public_key_hex).map_err(|e| CryptoError::Decoding(e.to_string()))?;
    let pem = String::from_utf8(pem_bytes).map_err(|e| CryptoError::Decoding(e.to_string()))?;

    RsaPublicKey::from_public_key_pem(&pem)
        .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
}
