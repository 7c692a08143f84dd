//! Shared config utilities: generic JSON config loading with default
//! fallback, plus the request-parameter config artifact.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

/// Generic load for any Serde config type with a `Default` implementation.
/// Falls back to `T::default()` if the file is missing or unparsable.
pub fn load_json_config<T: DeserializeOwned + Default>(path: &Path, label: &str) -> T {
    match std::fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<T>(&content) {
            Ok(config) => {
                info!("[{}] Loaded config from {}", label, path.display());
                config
            }
            Err(e) => {
                warn!(
                    "[{}] Failed to parse config {}: {} — using defaults",
                    label,
                    path.display(),
                    e
                );
                T::default()
            }
        },
        Err(_) => {
            info!(
                "[{}] No config file at {} — using defaults",
                label,
                path.display()
            );
            T::default()
        }
    }
}

// ── Request Parameter Config ───────────────────────────

/// Supported-value sets for request validation. Loaded once at startup from
/// a JSON artifact; built-in defaults apply when the artifact is absent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamsConfig {
    #[serde(default = "default_supported_languages")]
    pub supported_languages: Vec<String>,
    #[serde(default = "default_supported_formats")]
    pub supported_formats: Vec<String>,
}

impl Default for ParamsConfig {
    fn default() -> Self {
        Self {
            supported_languages: default_supported_languages(),
            supported_formats: default_supported_formats(),
        }
    }
}

impl ParamsConfig {
    pub fn supports_language(&self, language: &str) -> bool {
        self.supported_languages.iter().any(|l| l == language)
    }

    pub fn supports_format(&self, format: &str) -> bool {
        self.supported_formats.iter().any(|f| f == format)
    }
}

fn default_supported_languages() -> Vec<String> {
    ["中文", "英文", "日文", "中英混合", "日英混合", "多语种混合"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_supported_formats() -> Vec<String> {
    ["wav", "mp3", "ogg"].iter().map(|s| s.to_string()).collect()
}
