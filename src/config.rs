//! Engine configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```
//! use u_matching::config::MatchingConfig;
//!
//! let config = MatchingConfig::from_toml_str("top_k = 5\nseed = 42").unwrap();
//! assert_eq!(config.top_k, 5);
//! assert_eq!(config.seed, Some(42));
//! assert!((config.rank_decay - 0.1).abs() < 1e-12);
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigurationError;

/// Tunables for the matching strategies.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MatchingConfig {
    /// Number of best-ranked candidates the batch strategy samples from.
    pub top_k: usize,
    /// Rank decay factor: a candidate's weight is scaled by
    /// `exp(-rank_decay * (rank - 1))`.
    pub rank_decay: f64,
    /// How many times a strategy re-selects after the store rejects a write
    /// because the pair was taken concurrently.
    pub max_conflict_retries: u32,
    /// Seed for the random source. `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            rank_decay: 0.1,
            max_conflict_retries: 3,
            seed: None,
        }
    }
}

impl MatchingConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        let config: Self =
            toml::from_str(source).map_err(|e| ConfigurationError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded matching configuration");
        Ok(config)
    }

    /// Sets the candidate window.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Sets a fixed seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Checks value ranges.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.top_k == 0 {
            return Err(ConfigurationError::InvalidValue {
                field: "top_k",
                message: "must be at least 1".into(),
            });
        }
        if !self.rank_decay.is_finite() || self.rank_decay < 0.0 {
            return Err(ConfigurationError::InvalidValue {
                field: "rank_decay",
                message: format!("must be a finite non-negative number, got {}", self.rank_decay),
            });
        }
        Ok(())
    }
}
