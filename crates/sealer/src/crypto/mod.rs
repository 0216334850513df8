//! RSA field-sealing primitives and JSON traversal.
//!
//! This module is intentionally free of HTTP and filesystem dependencies.
//! Every operation takes its key explicitly; there is no process-wide key.
//!
//! # Ciphertext format
//!
//! ```text
//! base64( RSA-OAEP-SHA256( "rsa:" || plaintext ) )
//! ```
//!
//! The `rsa:` marker is only visible after decryption. It is how
//! [`tag::is_ciphertext`] tells our ciphertext apart from arbitrary strings.

pub mod cipher;
pub mod tag;
pub mod tree;

pub use cipher::CipherError;
