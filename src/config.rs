//! Configuration module.
//!
//! Handles loading, validating, and merging `memora.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to override.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! base_url = "http://localhost:8080"  # Viewer address share links point at
//! query_param = "gallery"             # Query parameter carrying the token
//! data_dir = ".memora"                # Where saved galleries live
//!
//! [assets]
//! timeout_secs = 15         # Per-asset HTTP timeout
//! max_bytes = 26214400      # Assets above this are not inlined
//! max_parallel = 4          # Parallel fetches (omit for auto = CPU cores)
//!
//! [qr]
//! size = 200                # Minimum QR code size in pixels
//! error_correction = "H"    # L, M, Q or H
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the config directory.
pub const CONFIG_FILENAME: &str = "memora.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Settings loaded from `memora.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MemoraConfig {
    /// Address of the gallery viewer; share links are `<base_url>?<query_param>=<token>`.
    pub base_url: String,
    /// Query parameter that carries the share token.
    pub query_param: String,
    /// Directory holding saved galleries.
    pub data_dir: String,
    /// Asset fetching limits used while generating share links.
    pub assets: AssetsConfig,
    /// QR code rendering.
    pub qr: QrConfig,
}

impl Default for MemoraConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            query_param: "gallery".to_string(),
            data_dir: ".memora".to_string(),
            assets: AssetsConfig::default(),
            qr: QrConfig::default(),
        }
    }
}

impl MemoraConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Validation(
                "base_url must start with http:// or https://".into(),
            ));
        }
        if self.query_param.is_empty()
            || !self
                .query_param
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(ConfigError::Validation(
                "query_param must be non-empty and alphanumeric".into(),
            ));
        }
        if self.data_dir.trim().is_empty() {
            return Err(ConfigError::Validation("data_dir must not be empty".into()));
        }
        if self.assets.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "assets.timeout_secs must be non-zero".into(),
            ));
        }
        if self.assets.max_bytes == 0 {
            return Err(ConfigError::Validation(
                "assets.max_bytes must be non-zero".into(),
            ));
        }
        if self.assets.max_parallel == Some(0) {
            return Err(ConfigError::Validation(
                "assets.max_parallel must be non-zero".into(),
            ));
        }
        if self.qr.size == 0 {
            return Err(ConfigError::Validation("qr.size must be non-zero".into()));
        }
        Ok(())
    }
}

/// Asset fetching settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    /// Per-request timeout for `http(s)://` assets, in seconds.
    pub timeout_secs: u64,
    /// Largest asset that will be inlined, in bytes.
    pub max_bytes: u64,
    /// Maximum number of parallel asset fetches.
    /// When absent, defaults to the number of CPU cores.
    pub max_parallel: Option<usize>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            max_bytes: 25 * 1024 * 1024,
            max_parallel: None,
        }
    }
}

/// Resolve the effective fetch parallelism from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &AssetsConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.max_parallel.map(|n| n.min(cores)).unwrap_or(cores)
}

/// QR error-correction level; higher levels survive more damage but hold less data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCorrection {
    L,
    M,
    Q,
    H,
}

/// QR code rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QrConfig {
    /// Minimum rendered width/height in pixels.
    pub size: u32,
    pub error_correction: ErrorCorrection,
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            size: 200,
            error_correction: ErrorCorrection::H,
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(MemoraConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `memora.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<MemoraConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: MemoraConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `memora.toml` in the given directory.
pub fn load_config(dir: &Path) -> Result<MemoraConfig, ConfigError> {
    resolve_config(stock_defaults_value(), load_raw_config(dir)?)
}

/// Returns a fully-commented stock `memora.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Memora Configuration
# ====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# Address of the gallery viewer. Share links look like
#   <base_url>?<query_param>=<token>
base_url = "http://localhost:8080"

# Query parameter that carries the share token.
query_param = "gallery"

# Directory holding saved galleries (relative to the config directory).
data_dir = ".memora"

# ---------------------------------------------------------------------------
# Asset fetching (share link generation)
# ---------------------------------------------------------------------------
[assets]
# Per-request timeout for http(s) images and audio, in seconds.
# A timed-out asset keeps its original reference in the link.
timeout_secs = 15

# Largest asset that will be inlined into a link, in bytes.
max_bytes = 26214400

# Maximum parallel asset fetches.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_parallel = 4

# ---------------------------------------------------------------------------
# QR code
# ---------------------------------------------------------------------------
[qr]
# Minimum rendered size in pixels.
size = 200

# Error correction: "L", "M", "Q" or "H".
error_correction = "H"
"##
}
