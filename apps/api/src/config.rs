use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default; startup fails only on values that do not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory for per-extraction scratch files.
    pub scratch_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub max_concurrent_extractions: usize,
    pub extraction_timeout_secs: u64,
    pub preview_chars: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scratch_dir = lookup("SCRATCH_DIR")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        let max_concurrent_extractions: usize =
            parse_or(&lookup, "MAX_CONCURRENT_EXTRACTIONS", 4)?;
        if max_concurrent_extractions == 0 {
            anyhow::bail!("MAX_CONCURRENT_EXTRACTIONS must be at least 1");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            scratch_dir,
            max_upload_bytes: parse_or(&lookup, "MAX_UPLOAD_BYTES", 16 * 1024 * 1024)?,
            max_concurrent_extractions,
            extraction_timeout_secs: parse_or(&lookup, "EXTRACTION_TIMEOUT_SECS", 30)?,
            preview_chars: parse_or(&lookup, "PREVIEW_CHARS", 200)?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
