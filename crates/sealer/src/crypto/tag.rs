//! Ciphertext classification.
//!
//! Our ciphertext carries no visible type tag. A string is ours exactly when
//! it decrypts under the held private key to output that starts with
//! [`MARKER`](super::cipher::MARKER), so classification is attempted
//! decryption. The result is relative to the private key in use.

use rsa::RsaPrivateKey;
use tracing::trace;
use zeroize::Zeroizing;

use super::cipher::decrypt;

/// Outcome of classifying a single string.
pub enum Classified {
    /// The string is our ciphertext; holds the plaintext with the marker removed.
    Ciphertext(Zeroizing<Vec<u8>>),
    /// The string is anything else and must be left untouched.
    Plaintext,
}

/// Classify `s` by attempting to decrypt it with `key`.
///
/// The decryption error is discarded here on purpose: every failure cause
/// (bad base64, wrong key, padding failure, missing marker) means
/// "not ours", and none of them is reported further.
pub fn classify(s: &str, key: &RsaPrivateKey) -> Classified {
    match decrypt(s, key) {
        Ok(plaintext) => Classified::Ciphertext(Zeroizing::new(plaintext)),
        Err(_) => {
            trace!(len = s.len(), "string is not ciphertext under the held key");
            Classified::Plaintext
        }
    }
}

/// Returns `true` iff `s` is a ciphertext produced by this service for `key`.
///
/// Never fails.
pub fn is_ciphertext(s: &str, key: &RsaPrivateKey) -> bool {
    matches!(classify(s, key), Classified::Ciphertext(_))
}
