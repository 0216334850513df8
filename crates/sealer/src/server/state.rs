//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::keys::KeyContext;

/// Application state shared across all request handlers.
///
/// Cloned per request by Axum; the key context sits behind an `Arc` and is
/// read-only for the life of the process.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Parsed key pair used by every encrypt / decrypt / sign / verify call.
    pub keys: Arc<KeyContext>,
}

impl AppState {
    /// Create a new [`AppState`] around an already-validated key context.
    pub fn new(keys: KeyContext) -> Self {
        Self {
            keys: Arc::new(keys),
        }
    }
}
