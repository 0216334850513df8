//! Selective, structure-preserving RSA encryption for JSON values.
//!
//! - [`crypto::cipher`]: RSA-OAEP encrypt/decrypt, RSA-PSS sign/verify, key generation.
//! - [`crypto::tag`]: tells our ciphertext apart from plaintext by attempted decryption.
//! - [`crypto::tree`]: one-level field encryption and recursive tree decryption.
//! - [`keys`]: PEM key pair provisioning and the immutable [`keys::KeyContext`].
//! - [`server`]: the Axum HTTP envelope around the above.

pub mod config;
pub mod crypto;
pub mod keys;
pub mod server;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod test_support;
