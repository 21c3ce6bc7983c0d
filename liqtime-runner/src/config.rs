//! Serializable analysis configuration.
//!
//! One TOML file describes a complete, reproducible analysis: the model
//! parameters, the Monte Carlo settings and the quantiles to report.
//!
//! ```toml
//! quantiles = [0.1, 0.5, 0.9]
//!
//! [parameters]
//! leverage = 10.0
//! volatility = 0.8
//! funding = 0.1
//!
//! [simulation]
//! n_paths = 1000
//! seed = 7
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use liqtime_core::{LiquidationParameters, ParamError, Percentile, RawParameters};

use crate::aggregate::DEFAULT_QUANTILES;
use crate::simulator::SimulationConfig;

/// Unique identifier for an analysis run (content-addressable hash).
pub type RunId = String;

/// Errors from loading or validating an [`AnalysisConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize config: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(#[from] ParamError),
}

fn default_quantiles() -> Vec<f64> {
    DEFAULT_QUANTILES.to_vec()
}

/// Everything needed to reproduce one analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Empirical quantiles to report, each strictly inside (0, 1).
    #[serde(default = "default_quantiles")]
    pub quantiles: Vec<f64>,
    pub parameters: RawParameters,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl AnalysisConfig {
    pub fn new(parameters: RawParameters) -> Self {
        Self {
            quantiles: default_quantiles(),
            parameters,
            simulation: SimulationConfig::default(),
        }
    }

    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string. Values are not validated here.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Check parameters, simulation settings and quantiles together.
    pub fn validate(&self) -> Result<LiquidationParameters, ConfigError> {
        let params = self.parameters.validate()?;
        self.simulation.validate()?;
        for &q in &self.quantiles {
            Percentile::new(q)?;
        }
        Ok(params)
    }

    /// Deterministic hash of the canonical JSON form.
    ///
    /// Two configs with identical content share a `RunId`.
    pub fn run_id(&self) -> Result<RunId, ConfigError> {
        let json = serde_json::to_string(self)?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}
