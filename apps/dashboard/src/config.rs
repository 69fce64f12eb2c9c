use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

/// Where login/signup identities come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    /// POST to the remote `/api/login` and `/api/signup` endpoints.
    Remote,
    /// Fabricate identities locally. Demo mode only; never the silent default.
    Simulated,
}

impl std::str::FromStr for AuthMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "remote" => Ok(AuthMode::Remote),
            "simulated" => Ok(AuthMode::Simulated),
            other => bail!("AUTH_MODE must be 'remote' or 'simulated', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub auth_mode: AuthMode,
    pub storage_path: PathBuf,
    pub redis_url: Option<String>,
    pub analyze_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

pub const DEFAULT_API_BASE_URL: &str = "https://resume-tracker-3.onrender.com";

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            api_base_url: env_or("API_BASE_URL", DEFAULT_API_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            auth_mode: env_or("AUTH_MODE", "remote").parse()?,
            storage_path: PathBuf::from(env_or(
                "STORAGE_PATH",
                ".resume-dashboard/storage.json",
            )),
            redis_url: std::env::var("REDIS_URL").ok().filter(|v| !v.is_empty()),
            analyze_timeout: Duration::from_secs(
                env_or("ANALYZE_TIMEOUT_SECS", "30")
                    .parse::<u64>()
                    .context("ANALYZE_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
