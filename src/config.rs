//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::isbn::patterns;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::num::NonZeroUsize;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Column holding the ISBN, first column is 1
    #[serde(default)]
    pub isbn_column: Option<NonZeroUsize>,

    /// Whether the first input row is a header to be extended
    #[serde(default = "default_with_header_row")]
    pub with_header_row: bool,

    /// Pause after every data row in milliseconds
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Site serving the price pages
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Symbol written in front of every price
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// Regex for marketplace offers, capture group 1 is the amount
    #[serde(default = "default_price_pattern")]
    pub price_pattern: String,

    /// Regex for the publisher list price, capture group 1 is the amount
    #[serde(default = "default_list_price_pattern")]
    pub list_price_pattern: String,
}

fn default_with_header_row() -> bool {
    true
}

fn default_throttle_ms() -> u64 {
    15_000
}

fn default_base_url() -> String {
    "https://isbn.nu".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

fn default_price_pattern() -> String {
    patterns::PRICE.to_string()
}

fn default_list_price_pattern() -> String {
    patterns::LIST_PRICE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            isbn_column: None,
            with_header_row: default_with_header_row(),
            throttle_ms: default_throttle_ms(),
            base_url: default_base_url(),
            proxy: None,
            timeout_secs: default_timeout_secs(),
            currency_symbol: default_currency_symbol(),
            price_pattern: default_price_pattern(),
            list_price_pattern: default_list_price_pattern(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("isbn-prices").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(base_url) = std::env::var("ISBN_PRICES_BASE_URL") {
            self.base_url = base_url;
        }

        if let Ok(proxy) = std::env::var("ISBN_PRICES_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(throttle) = std::env::var("ISBN_PRICES_THROTTLE") {
            if let Ok(d) = parse_duration(&throttle) {
                self.throttle_ms = d.as_millis() as u64;
            }
        }

        self
    }

    /// Pause inserted after every data row.
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    /// Returns the configured ISBN column, failing when no layer set one.
    pub fn isbn_column(&self) -> Result<NonZeroUsize> {
        self.isbn_column.context("ISBN column is required: pass --isbn-column <N>")
    }

    /// Checks settings that have no usable default.
    pub fn validate(&self) -> Result<()> {
        self.isbn_column()?;

        if self.base_url.trim().is_empty() {
            anyhow::bail!("Base URL must not be empty");
        }

        Ok(())
    }
}

/// Parses durations like `15s`, `500ms`, `2m` or `1m30s`. A bare `0` is allowed.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s == "0" {
        return Ok(Duration::ZERO);
    }
    if s.is_empty() {
        return Err("Empty duration".to_string());
    }

    let is_number = |c: char| c.is_ascii_digit() || c == '.';
    let mut millis = 0.0;
    let mut rest = s;

    while !rest.is_empty() {
        let number_end = rest.find(|c: char| !is_number(c)).unwrap_or(rest.len());
        let value: f64 =
            rest[..number_end].parse().map_err(|_| format!("Invalid duration: {}", s))?;
        rest = &rest[number_end..];

        let unit_end = rest.find(is_number).unwrap_or(rest.len());
        let unit_millis = match &rest[..unit_end] {
            "ms" => 1.0,
            "s" => 1_000.0,
            "m" => 60_000.0,
            "h" => 3_600_000.0,
            "" => return Err(format!("Missing unit in duration: {}. Use: ms, s, m, h", s)),
            unit => {
                return Err(format!("Unknown unit '{}' in duration: {}. Use: ms, s, m, h", unit, s))
            }
        };
        rest = &rest[unit_end..];

        millis += value * unit_millis;
    }

    Ok(Duration::from_millis(millis.round() as u64))
}
