use rsa::RsaPublicKey;
use thiserror::Error;

use super::crypto::{self, CryptoError, KeyPair};

/// Errors that can occur during identity operations
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("Credentials do not match this identity")]
    Unauthorized,

    #[error("No key pair has been generated for this identity")]
    KeysNotGenerated,

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),
}

/// Derives the public account fingerprint from a secret credential pair
///
/// Pure and deterministic: `H(credential_a || credential_b)`. The digest is
/// one-way; the credentials cannot be recovered from it.
pub fn derive_fingerprint(credential_a: &str, credential_b: &str) -> String {
    crypto::sha256_hex(&[credential_a, credential_b])
}

/// An account bound to a secret credential pair
///
/// Holds the derived fingerprint and, once generated, the RSA key pair used
/// to authorize transfers. The credentials themselves are never stored; they
/// must be re-presented every time a message is signed.
#[derive(Debug, Clone)]
pub struct Identity {
    fingerprint: String,
    keypair: Option<KeyPair>,
}

impl Identity {
    /// Creates a new identity from a credential pair
    ///
    /// # Arguments
    ///
    /// * `credential_a` - First secret credential
    /// * `credential_b` - Second secret credential
    ///
    /// # Returns
    ///
    /// A new Identity with no key pair yet
    pub fn new(credential_a: &str, credential_b: &str) -> Self {
        Identity {
            fingerprint: derive_fingerprint(credential_a, credential_b),
            keypair: None,
        }
    }

    /// Gets the identity's public fingerprint
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Gets the identity's public key, if one has been generated
    pub fn public_key(&self) -> Option<&RsaPublicKey> {
        self.keypair.as_ref().map(KeyPair::public_key)
    }

    /// Generates the identity's RSA key pair
    ///
    /// Lazy and idempotent: the pair is created on the first call and every
    /// later call returns the existing public key unchanged.
    ///
    /// # Returns
    ///
    /// Result with the identity's public key
    pub fn generate_keys(&mut self) -> Result<&RsaPublicKey, CryptoError> {
        let keypair = match self.keypair.take() {
            Some(keypair) => keypair,
            None => KeyPair::generate()?,
        };

        Ok(self.keypair.insert(keypair).public_key())
    }

    /// Signs a message after re-checking the supplied credentials
    ///
    /// The fingerprint is recomputed from the supplied credentials and must
    /// match the stored one; holding a reference to the Identity is not
    /// enough to sign with it. The private key never leaves this type.
    ///
    /// # Arguments
    ///
    /// * `credential_a` - First secret credential, re-supplied
    /// * `credential_b` - Second secret credential, re-supplied
    /// * `message` - The message to sign
    ///
    /// # Returns
    ///
    /// Result with the signature as a hexadecimal string
    pub fn sign(
        &self,
        credential_a: &str,
        credential_b: &str,
        message: &str,
    ) -> Result<String, IdentityError> {
        if derive_fingerprint(credential_a, credential_b) != self.fingerprint {
            return Err(IdentityError::Unauthorized);
        }

        let keypair = self.keypair.as_ref().ok_or(IdentityError::KeysNotGenerated)?;

        Ok(keypair.sign(message)?)
    }
}
