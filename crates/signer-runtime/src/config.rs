//! # Runtime Configuration
//!
//! Defaults, then an optional TOML file, then `SB_*` environment overrides.
//!
//! ```toml
//! [signer]
//! target = "com.greenart7c3.nostrsigner"
//! reply_scheme = "signerbridge"
//! opener = "/usr/local/bin/signer-open"
//! query_program = "/usr/local/bin/signer-query"
//!
//! [identity]
//! app_id = "org.example.todo"
//! app_name = "Todo"
//! account = "npub1..."
//!
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use sb_01_link_codec::{SplitAddress, DEFAULT_REPLY_SCHEME, DEFAULT_SIGNER_TARGET};
use serde::Deserialize;
use shared_types::CallerIdentity;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Failed to parse config: {0}")]
    Parse(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub signer: SignerConfig,
    pub identity: IdentityConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Where the signer lives and how to reach it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    /// Signer application identifier.
    pub target: String,
    /// Scheme inbound replies arrive on.
    pub reply_scheme: String,
    /// Program that launches the signer. Launches are only logged when unset.
    pub opener: Option<PathBuf>,
    pub opener_args: Vec<String>,
    /// Program that answers direct queries. Direct queries fail when unset.
    pub query_program: Option<PathBuf>,
    pub query_args: Vec<String>,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_SIGNER_TARGET.to_string(),
            reply_scheme: DEFAULT_REPLY_SCHEME.to_string(),
            opener: None,
            opener_args: Vec::new(),
            query_program: None,
            query_args: Vec::new(),
        }
    }
}

/// Who the bridge asks on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub app_id: String,
    pub app_name: String,
    pub account: Option<String>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            app_id: "dev.signerbridge.cli".to_string(),
            app_name: "Signer Bridge".to_string(),
            account: None,
        }
    }
}

impl IdentityConfig {
    #[must_use]
    pub fn caller_identity(&self) -> CallerIdentity {
        let identity = CallerIdentity::new(&self.app_id, &self.app_name);
        match &self.account {
            Some(account) => identity.with_account(account),
            None => identity,
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the pending store.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
        }
    }
}

impl StorageConfig {
    /// File name of the pending store inside `data_dir`.
    pub const STORE_FILE: &'static str = "signer_bridge.db";

    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(Self::STORE_FILE)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Defaults overlaid with `path`, if given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    error: e.to_string(),
                })?;
                Self::parse(&content)
            }
            None => Ok(Self::default()),
        }
    }

    /// Parse configuration from a TOML string. Missing keys keep defaults.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply `SB_*` overrides read through `lookup`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("SB_DATA_DIR") {
            self.storage.data_dir = PathBuf::from(dir);
        }
        if let Some(target) = lookup("SB_SIGNER_TARGET") {
            self.signer.target = target;
        }
        if let Some(scheme) = lookup("SB_REPLY_SCHEME") {
            self.signer.reply_scheme = scheme;
        }
        if let Some(account) = lookup("SB_ACCOUNT") {
            self.identity.account = Some(account).filter(|a| !a.is_empty());
        }
        if let Some(level) = lookup("SB_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(opener) = lookup("SB_OPENER") {
            self.signer.opener = Some(PathBuf::from(opener));
        }
        if let Some(program) = lookup("SB_QUERY_PROGRAM") {
            self.signer.query_program = Some(PathBuf::from(program));
        }
    }

    /// Check values that cannot be fixed up silently.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.signer.target.trim().is_empty() {
            return Err(ConfigError::Invalid("signer.target is empty".into()));
        }
        let sample = format!("{}://", self.signer.reply_scheme);
        if self.signer.reply_scheme.is_empty() || SplitAddress::parse(&sample).is_err() {
            return Err(ConfigError::Invalid(format!(
                "signer.reply_scheme `{}` is not a valid URI scheme",
                self.signer.reply_scheme
            )));
        }
        if self.identity.app_id.trim().is_empty() {
            return Err(ConfigError::Invalid("identity.app_id is empty".into()));
        }
        Ok(())
    }
}
