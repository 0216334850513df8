//! Request and response types exchanged with the HTTP API.
//!
//! `/encrypt`, `/decrypt` and `/sign` take a bare JSON object as their body,
//! so only the envelope-shaped bodies have dedicated types here.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Sign / verify endpoints
// ---------------------------------------------------------------------------

/// Successful response body for `POST /sign`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignResponse {
    /// Base64 RSA-PSS/SHA-256 signature over the serialised request body.
    pub signature: String,
}

/// Request body for `POST /verify`.
///
/// `data` may still carry ciphertext fields; they are decrypted before the
/// signature is checked.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    /// Base64 signature previously returned by `POST /sign`.
    pub signature: String,
    /// The signed JSON object.
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Response body for `POST /verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(rename = "isVerified")]
    pub is_verified: bool,
}

// ---------------------------------------------------------------------------
// Error response
// ---------------------------------------------------------------------------

/// Standard error response body returned on any non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Short machine-readable error code (e.g. `"bad_request"`).
    pub code: String,
    /// Human-readable description safe to expose to callers.
    pub message: String,
}

impl ErrorResponse {
    /// Construct an [`ErrorResponse`] from a code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<&crate::ServiceError> for ErrorResponse {
    fn from(err: &crate::ServiceError) -> Self {
        Self::new(err.code(), err.to_string())
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

/// Response body for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall service status. Always `"ok"` once the server is accepting requests.
    pub status: String,
    /// Modulus size of the loaded RSA key pair.
    pub key_bits: usize,
}
