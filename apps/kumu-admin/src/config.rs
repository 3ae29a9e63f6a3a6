//! Resolved runtime configuration.
//!
//! Flags and environment variables are read by clap (see [`crate::cli::Cli`]);
//! this module turns them into one [`Config`] value and supplies defaults.

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Base URL used when neither `--api-url` nor `KUMU_API_BASE_URL` is set.
pub const DEFAULT_API_URL: &str = "http://localhost:3005";

/// Token file used when no config directory is available.
pub const FALLBACK_TOKEN_DB: &str = "kumu-tokens.redb";

/// Deployment the console talks to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AppEnv {
    #[default]
    Development,
    Production,
}

impl AppEnv {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AppEnv::Development => "development",
            AppEnv::Production => "production",
        }
    }

    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, AppEnv::Production)
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    pub api_url: String,
    pub env: AppEnv,
    pub token_db: PathBuf,
}

impl Config {
    /// `token_db` falls back to [`default_token_db`] when unset.
    #[must_use]
    pub fn new(api_url: impl Into<String>, env: AppEnv, token_db: Option<PathBuf>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            env,
            token_db: token_db.unwrap_or_else(default_token_db),
        }
    }
}

/// `<config dir>/kumu-admin/tokens.redb`, or `./kumu-tokens.redb`.
#[must_use]
pub fn default_token_db() -> PathBuf {
    token_db_under(dirs::config_dir().as_deref())
}

fn token_db_under(config_dir: Option<&Path>) -> PathBuf {
    match config_dir {
        Some(dir) => dir.join("kumu-admin").join("tokens.redb"),
        None => PathBuf::from(FALLBACK_TOKEN_DB),
    }
}
