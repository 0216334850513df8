//! RSA-OAEP field encryption and RSA-PSS signing.
//!
//! **Algorithm choice:** every payload is encrypted directly with the public
//! key under OAEP/SHA-256. There is no symmetric envelope, so a single payload
//! (marker included) can never exceed [`max_plaintext_len`] bytes (190 for a
//! 2048-bit key). Oversized input is rejected, never truncated.
//!
//! All binary values cross the text boundary as standard (padded) base64.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::rngs::OsRng;
use rsa::{
    pkcs1::{EncodeRsaPrivateKey, EncodeRsaPublicKey, LineEnding},
    traits::PublicKeyParts,
    Oaep, Pss, RsaPrivateKey, RsaPublicKey,
};
use sha2::{Digest, Sha256};
use thiserror::Error;
use zeroize::Zeroizing;

use crate::keys::KeyPair;

/// Modulus size of freshly generated key pairs.
pub const KEY_BITS: usize = 2048;

/// Prefix written in front of every plaintext before encryption.
///
/// A successful OAEP decryption whose output does not start with this
/// sequence is treated as a failure.
pub const MARKER: &[u8] = b"rsa:";

/// Output length of SHA-256, used by both OAEP and PSS.
const HASH_LEN: usize = 32;

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// Key material could not be parsed, encoded, or does not form a pair.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// RSA key generation failed.
    #[error("key generation failed")]
    KeyGeneration,

    /// The marker-prefixed payload does not fit in one OAEP block.
    #[error("payload too large: {len} bytes exceeds the {max}-byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    /// The value could not be serialised to JSON text.
    #[error("failed to serialise value: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The RSA encryption primitive failed for a reason other than size.
    #[error("rsa encryption failed")]
    Encryption,

    /// Decryption failed. Carries no cause: bad base64, the wrong key, a
    /// padding failure and a missing marker are indistinguishable.
    #[error("decryption failed")]
    Decryption,

    /// The RSA signing primitive failed.
    #[error("rsa signing failed")]
    Signing,
}

/// Largest plaintext, marker included, that `key` can encrypt under
/// OAEP/SHA-256: `modulus_bytes - 2 * hash_bytes - 2`.
pub fn max_plaintext_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(2 * HASH_LEN + 2)
}

/// Prefix `plaintext` with [`MARKER`], encrypt it under RSA-OAEP/SHA-256 and
/// return the base64 ciphertext.
///
/// # Errors
///
/// Returns [`CipherError::PayloadTooLarge`] if the marker-prefixed payload
/// exceeds [`max_plaintext_len`], and [`CipherError::Encryption`] on any other
/// primitive failure.
pub fn encrypt(plaintext: &[u8], key: &RsaPublicKey) -> Result<String, CipherError> {
    let max = max_plaintext_len(key);
    let len = MARKER.len() + plaintext.len();
    if len > max {
        return Err(CipherError::PayloadTooLarge { len, max });
    }

    let mut tagged = Zeroizing::new(Vec::with_capacity(len));
    tagged.extend_from_slice(MARKER);
    tagged.extend_from_slice(plaintext);

    let ciphertext = key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), &tagged)
        .map_err(|e| match e {
            rsa::Error::MessageTooLong => CipherError::PayloadTooLarge { len, max },
            _ => CipherError::Encryption,
        })?;

    Ok(STANDARD.encode(ciphertext))
}

/// Decode and decrypt a base64 ciphertext produced by [`encrypt`], returning
/// the plaintext with the marker stripped.
///
/// # Errors
///
/// Returns [`CipherError::Decryption`] for every failure path.
pub fn decrypt(ciphertext: &str, key: &RsaPrivateKey) -> Result<Vec<u8>, CipherError> {
    let raw = STANDARD
        .decode(ciphertext)
        .map_err(|_| CipherError::Decryption)?;
    // OAEP output is always exactly one modulus long.
    if raw.len() != key.size() {
        return Err(CipherError::Decryption);
    }

    let mut plaintext = Zeroizing::new(
        key.decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), &raw)
            .map_err(|_| CipherError::Decryption)?,
    );
    if !plaintext.starts_with(MARKER) {
        return Err(CipherError::Decryption);
    }

    Ok(plaintext.split_off(MARKER.len()))
}

/// Sign `data` with RSA-PSS/SHA-256 and return the base64 signature.
///
/// # Errors
///
/// Returns [`CipherError::Signing`] if the primitive fails.
pub fn sign(data: &[u8], key: &RsaPrivateKey) -> Result<String, CipherError> {
    let digest = Sha256::digest(data);
    let signature = key
        .sign_with_rng(&mut OsRng, Pss::new::<Sha256>(), &digest)
        .map_err(|_| CipherError::Signing)?;
    Ok(STANDARD.encode(signature))
}

/// Check a base64 RSA-PSS/SHA-256 `signature` over `data`.
///
/// A mismatch or an undecodable signature yields `false`. Both a
/// digest-length salt (what [`sign`] produces) and the maximum salt length
/// for the modulus are accepted.
pub fn verify(data: &[u8], signature: &str, key: &RsaPublicKey) -> bool {
    let Ok(signature) = STANDARD.decode(signature) else {
        return false;
    };
    let digest = Sha256::digest(data);
    let max_salt = key.size().saturating_sub(HASH_LEN + 2);

    key.verify(Pss::new::<Sha256>(), &digest, &signature).is_ok()
        || key
            .verify(Pss::new_with_salt::<Sha256>(max_salt), &digest, &signature)
            .is_ok()
}

/// Sign the canonical JSON text of `value`.
///
/// # Errors
///
/// Returns [`CipherError::Serialization`] or [`CipherError::Signing`].
pub fn sign_value(value: &serde_json::Value, key: &RsaPrivateKey) -> Result<String, CipherError> {
    let text = Zeroizing::new(serde_json::to_string(value)?);
    sign(text.as_bytes(), key)
}

/// Verify `signature` against the canonical JSON text of `value`.
///
/// # Errors
///
/// Returns [`CipherError::Serialization`] if `value` cannot be serialised. A
/// bad signature is `Ok(false)`.
pub fn verify_value(
    value: &serde_json::Value,
    signature: &str,
    key: &RsaPublicKey,
) -> Result<bool, CipherError> {
    let text = Zeroizing::new(serde_json::to_string(value)?);
    Ok(verify(text.as_bytes(), signature, key))
}

/// Generate a fresh [`KEY_BITS`]-bit key pair, PKCS#1 PEM encoded with LF
/// line endings.
///
/// # Errors
///
/// Returns [`CipherError::KeyGeneration`] if the primitive fails and
/// [`CipherError::InvalidKey`] if PEM encoding fails.
pub fn generate_key_pair() -> Result<KeyPair, CipherError> {
    let private =
        RsaPrivateKey::new(&mut OsRng, KEY_BITS).map_err(|_| CipherError::KeyGeneration)?;
    let public = RsaPublicKey::from(&private);

    let private_pem = private
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CipherError::InvalidKey(format!("private key encoding: {e}")))?;
    let public_pem = public
        .to_pkcs1_pem(LineEnding::LF)
        .map_err(|e| CipherError::InvalidKey(format!("public key encoding: {e}")))?;

    Ok(KeyPair::new(public_pem, private_pem))
}
