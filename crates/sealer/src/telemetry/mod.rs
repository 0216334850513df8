//! Logging and optional OpenTelemetry span export.
//!
//! # Telemetry invariants
//!
//! - **No plaintext, ciphertext contents, or key material** may appear in any
//!   span attribute or log field. Counts, sizes and outcomes are fine.
//! - Log level comes from `log_level` in the config file or the `LOG_LEVEL`
//!   env var (default: `info`), overridden by `RUST_LOG`.

pub mod init;

pub use init::{init_telemetry, shutdown_telemetry};
