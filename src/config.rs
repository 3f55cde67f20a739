use std::env;
use std::time::Duration;

use anyhow::{Result, bail};

pub(crate) const DEFAULT_API_BASE: &str = "https://api.themoviedb.org/3";
pub(crate) const LANGUAGE: &str = "en-US";

pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
pub(crate) const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Wall-clock delay between progress samples while a video plays.
pub(crate) const PROGRESS_TICK: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub(crate) struct Config {
    pub(crate) api_key: String,
    pub(crate) api_base: String,
}

impl Config {
    pub(crate) fn from_env() -> Result<Self> {
        Self::from_values(
            env::var("REELTRACK_API_KEY").ok(),
            env::var("REELTRACK_API_BASE").ok(),
        )
    }

    pub(crate) fn from_values(api_key: Option<String>, api_base: Option<String>) -> Result<Self> {
        let api_key = match api_key {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => bail!("REELTRACK_API_KEY is not set"),
        };
        let api_base = api_base
            .filter(|base| !base.trim().is_empty())
            .map(|base| base.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Ok(Self { api_key, api_base })
    }
}
