//! Engine configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the keys it
//! changes:
//!
//! ```
//! use lumen_engine::config::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "animator": { "capacity": 64 } }"#).unwrap();
//! assert_eq!(config.animator.capacity, 64);
//! assert_eq!(config.tick.fixed_dt, 1.0 / 60.0);
//! ```

use std::path::{Path, PathBuf};

use lumen_tween::animator::AnimatorConfig;
use serde::{Deserialize, Serialize};

use crate::tick::TickConfig;

/// Errors produced while loading or validating an [`EngineConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick: TickConfig,
    pub animator: AnimatorConfig,
    /// Fallback `tracing` filter used when `RUST_LOG` is unset.
    pub log_filter: LogFilter,
}

/// Wrapper so the default filter survives partial config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogFilter(pub String);

impl Default for LogFilter {
    fn default() -> Self {
        Self("warn".to_owned())
    }
}

impl LogFilter {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl EngineConfig {
    /// Parse and validate a JSON config.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dt = self.tick.fixed_dt;
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "tick.fixed_dt",
                reason: format!("must be positive and finite, got {dt}"),
            });
        }
        if self.animator.capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "animator.capacity",
                reason: "must be at least 1".to_owned(),
            });
        }
        let scale = self.animator.time_scale;
        if !(scale >= 0.0 && scale.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "animator.time_scale",
                reason: format!("must be finite and non-negative, got {scale}"),
            });
        }
        Ok(())
    }
}
