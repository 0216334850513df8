//! [`KeyPair`] (PEM text as persisted) and [`KeyContext`] (parsed keys shared
//! by every request).

use rsa::{
    pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey},
    traits::PublicKeyParts,
    RsaPrivateKey, RsaPublicKey,
};
use zeroize::Zeroizing;

use crate::crypto::CipherError;

/// PKCS#1 PEM encoded key pair, exactly as read from or written to disk.
#[derive(Clone)]
pub struct KeyPair {
    public_pem: String,
    private_pem: Zeroizing<String>,
}

impl KeyPair {
    pub fn new(public_pem: impl Into<String>, private_pem: Zeroizing<String>) -> Self {
        Self {
            public_pem: public_pem.into(),
            private_pem,
        }
    }

    pub fn public_pem(&self) -> &str {
        &self.public_pem
    }

    pub fn private_pem(&self) -> &str {
        &self.private_pem
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print private key material, not even in debug builds.
        f.debug_struct("KeyPair")
            .field("public_pem", &self.public_pem)
            .field("private_pem", &"[REDACTED]")
            .finish()
    }
}

/// Parsed, validated key pair.
///
/// Built once at startup and never mutated. Handlers share it behind an
/// `Arc`; no lock is needed because nothing in it changes.
#[derive(Clone)]
pub struct KeyContext {
    public: RsaPublicKey,
    private: RsaPrivateKey,
}

impl KeyContext {
    /// Parse both halves of `pair` and check that they belong together.
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::InvalidKey`] if either PEM is malformed or if the
    /// public key is not the public half of the private key.
    pub fn from_pair(pair: &KeyPair) -> Result<Self, CipherError> {
        let private = RsaPrivateKey::from_pkcs1_pem(pair.private_pem())
            .map_err(|e| CipherError::InvalidKey(format!("private key: {e}")))?;
        let public = RsaPublicKey::from_pkcs1_pem(pair.public_pem())
            .map_err(|e| CipherError::InvalidKey(format!("public key: {e}")))?;

        if RsaPublicKey::from(&private) != public {
            return Err(CipherError::InvalidKey(
                "public key does not match private key".into(),
            ));
        }

        Ok(Self { public, private })
    }

    pub fn public(&self) -> &RsaPublicKey {
        &self.public
    }

    pub fn private(&self) -> &RsaPrivateKey {
        &self.private
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.public.size() * 8
    }
}

impl std::fmt::Debug for KeyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyContext")
            .field("bits", &self.bits())
            .finish_non_exhaustive()
    }
}
