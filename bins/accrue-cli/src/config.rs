//! CLI configuration.
//!
//! Layered with the `config` crate: an optional TOML file, then `ACCRUE_*`
//! environment variables. Command-line flags are applied on top by `main`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use accrue_core::constants::{DEFAULT_POOL_NAME, DEFAULT_RSCORE_DECIMALS};
use accrue_core::DeliveryKind;
use ::config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

/// Prefix of environment variables read into [`CliConfig`].
pub const ENV_PREFIX: &str = "ACCRUE";

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Configuration for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Root directory for persistent data.
    pub data_dir: PathBuf,
    /// Reward pool the commands operate on.
    pub pool: String,
    /// Decimal digits of the internal reward unit.
    pub rscore_decimals: u8,
    /// How claims are paid out.
    pub delivery: DeliveryKind,
    /// Log level filter string (e.g. "info", "accrue_core=debug").
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for CliConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("accrue");

        Self {
            data_dir,
            pool: DEFAULT_POOL_NAME.to_string(),
            rscore_decimals: DEFAULT_RSCORE_DECIMALS,
            delivery: DeliveryKind::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl CliConfig {
    /// Load from an optional TOML file and the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, Environment::with_prefix(ENV_PREFIX).try_parsing(true))
    }

    /// Load from an optional TOML file and the given environment source.
    ///
    /// A missing file is an error only when a path was given explicitly.
    pub fn load_with(path: Option<&Path>, env: Environment) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        }
        builder.add_source(env).build()?.try_deserialize()
    }

    /// Path to the RocksDB reward database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("rewarddb")
    }
}
