//! Configuration loading and validation for the sealer service.
//!
//! Values are layered: serde defaults, then an optional JSON file, then
//! environment variables. The file path is taken from `CONFIG_PATH`, else the
//! first command-line argument, else `./config.json`. A missing file is not an
//! error. The process exits with a clear message if the result is invalid.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Config file consulted when neither `CONFIG_PATH` nor a CLI argument is given.
pub const DEFAULT_CONFIG_PATH: &str = "./config.json";

/// Validated service configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Port the HTTP server listens on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// PKCS#1 PEM public key file. Created on first start if absent.
    #[serde(default = "default_public_key_path")]
    pub public_key_path: String,

    /// PKCS#1 PEM private key file. Created on first start if absent.
    #[serde(default = "default_private_key_path")]
    pub private_key_path: String,

    /// Tracing log level (e.g. `"info"`, `"debug"`). `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit structured JSON logs; plain text when `false`.
    #[serde(default = "default_log_json")]
    pub log_json: bool,

    /// ANSI colours for plain-text logs.
    #[serde(default)]
    pub log_color: bool,

    /// OTLP/gRPC endpoint for span export. Export is disabled when unset.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,
}

fn default_port() -> u16 {
    5000
}
fn default_public_key_path() -> String {
    "public.pem".into()
}
fn default_private_key_path() -> String {
    "private.pem".into()
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_json() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            public_key_path: default_public_key_path(),
            private_key_path: default_private_key_path(),
            log_level: default_log_level(),
            log_json: default_log_json(),
            log_color: false,
            otel_exporter_otlp_endpoint: None,
        }
    }
}

impl Config {
    /// Load and validate configuration from the config file and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is present but unreadable, if a value
    /// cannot be parsed, or if validation fails.
    pub fn load() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH")
            .ok()
            .or_else(|| std::env::args().nth(1))
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.into());
        Self::from_sources(&path, config::Environment::default())
    }

    fn from_sources(path: &str, env: config::Environment) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::new(path, config::FileFormat::Json).required(false))
            .add_source(env)
            .build()
            .with_context(|| format!("failed to build configuration from {path} and environment"))?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.public_key_path, "PUBLIC_KEY_PATH")?;
        ensure_non_empty(&self.private_key_path, "PRIVATE_KEY_PATH")?;

        if self.public_key_path == self.private_key_path {
            anyhow::bail!("PUBLIC_KEY_PATH and PRIVATE_KEY_PATH must name different files");
        }
        if self.port == 0 {
            anyhow::bail!("PORT must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
