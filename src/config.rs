//! Runtime configuration.
//!
//! Read from a JSON file; every field has a default so partial files are fine.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{StudioError, StudioResult};

/// Top-level configuration of the CLI and adapters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    /// Image host used by `link --target image-host`.
    pub image_host: ImageHostConfig,

    /// Object store used by `link --target object-store`.
    pub object_store: ObjectStoreConfig,

    /// Where downloads are written.
    pub download_dir: PathBuf,

    /// File holding the persisted anonymous client id.
    pub anon_id_path: PathBuf,

    /// Base directory for relative frame urls.
    pub asset_dir: Option<PathBuf>,

    /// Optional JSON frame catalog replacing the built-in one.
    pub catalog: Option<PathBuf>,

    /// Timeout applied to every HTTP request.
    pub http_timeout_secs: u64,

    pub logging: LoggingConfig,
}

/// Cloudinary-compatible unsigned upload settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageHostConfig {
    pub endpoint: String,
    pub cloud_name: String,
    pub upload_preset: String,
}

/// Supabase-compatible storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectStoreConfig {
    /// Project base url, e.g. `https://xyz.supabase.co`. Empty disables the target.
    pub base_url: String,
    pub bucket: String,
    /// Public (anon) api key sent as `apikey` and bearer token.
    pub anon_key: String,
    /// Table receiving one metadata row per upload.
    pub metadata_table: String,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g. "info", "frame_studio=debug,warn"). `RUST_LOG` wins when set.
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            image_host: ImageHostConfig::default(),
            object_store: ObjectStoreConfig::default(),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            anon_id_path: data_dir().join("anon_id"),
            asset_dir: None,
            catalog: None,
            http_timeout_secs: 30,
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for ImageHostConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.cloudinary.com".to_string(),
            cloud_name: "dac3tqyuj".to_string(),
            upload_preset: "ml_default".to_string(),
        }
    }
}

impl Default for ObjectStoreConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            bucket: "starpics".to_string(),
            anon_key: String::new(),
            metadata_table: "uploads".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl StudioConfig {
    /// Parse a JSON config document.
    pub fn from_json_str(s: &str) -> StudioResult<Self> {
        let cfg: Self = serde_json::from_str(s).map_err(|e| StudioError::config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read and parse the config file at `path`.
    pub fn from_path(path: &Path) -> StudioResult<Self> {
        let s = std::fs::read_to_string(path)
            .map_err(|e| StudioError::config(format!("read '{}': {e}", path.display())))?;
        Self::from_json_str(&s).map_err(|e| match e {
            StudioError::Config(m) => StudioError::config(format!("'{}': {m}", path.display())),
            other => other,
        })
    }

    /// Load `explicit` if given (it must exist), else the default location if present,
    /// else built-in defaults.
    pub fn load(explicit: Option<&Path>) -> StudioResult<Self> {
        if let Some(path) = explicit {
            return Self::from_path(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => {
                tracing::debug!(path = %path.display(), "loading config");
                Self::from_path(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    /// Standard config file location (`<config dir>/frame-studio/config.json`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("frame-studio").join("config.json"))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    fn validate(&self) -> StudioResult<()> {
        if self.http_timeout_secs == 0 {
            return Err(StudioError::config("http_timeout_secs must be positive"));
        }
        if self.image_host.endpoint.trim().is_empty() {
            return Err(StudioError::config("image_host.endpoint must be non-empty"));
        }
        Ok(())
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("frame-studio"))
        .unwrap_or_else(|| PathBuf::from(".frame-studio"))
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
