//! Pipeline configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "encoder": { "kind": "adaptive", "strategy": "median" },
//!   "steps": [ { "kind": "standardize" } ],
//!   "matrix_retries": 0,
//!   "validation_threshold": 0.25
//! }
//! ```

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::encoding::BinaryEncoder;
use crate::error::{BioHashError, Result};
use crate::quantize::QuantizationStep;

/// Everything a [`Pipeline`](super::Pipeline) needs apart from the token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Final binarization strategy.
    pub encoder: BinaryEncoder,

    /// Quantization steps, applied in order.
    pub steps: Vec<QuantizationStep>,

    /// Perturbed-seed retries after a degenerate matrix (0 = fail fast).
    pub matrix_retries: u32,

    /// Acceptance threshold attached to generated templates.
    pub validation_threshold: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            encoder: BinaryEncoder::default(),
            steps: Vec::new(),
            matrix_retries: 0,
            validation_threshold: None,
        }
    }
}

impl PipelineConfig {
    /// Check every parameter, surfacing the first problem.
    pub fn validate(&self) -> Result<()> {
        self.encoder.validate()?;
        for step in &self.steps {
            step.validate()?;
        }
        if let Some(value) = self.validation_threshold {
            if !(0.0..=1.0).contains(&value) {
                return Err(BioHashError::ThresholdOutOfRange { value });
            }
        }
        Ok(())
    }

    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        let config: Self =
            serde_json::from_str(json).context("failed to parse pipeline config")?;
        config.validate().context("invalid pipeline config")?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("failed to load config file '{}'", path.display()))
    }
}
