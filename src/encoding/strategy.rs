//! Data-derived binarization thresholds.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::BioHashError;

/// How the cutoff is computed from the vector being encoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdStrategy {
    Median,
    Mean,
    Zero,
}

impl ThresholdStrategy {
    pub fn all() -> [ThresholdStrategy; 3] {
        [
            ThresholdStrategy::Median,
            ThresholdStrategy::Mean,
            ThresholdStrategy::Zero,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThresholdStrategy::Median => "median",
            ThresholdStrategy::Mean => "mean",
            ThresholdStrategy::Zero => "zero",
        }
    }

    /// Cutoff for `data`. Empty input yields 0.
    pub fn threshold(&self, data: ArrayView1<'_, f64>) -> f64 {
        if data.is_empty() {
            return 0.0;
        }
        match self {
            ThresholdStrategy::Median => median(data),
            ThresholdStrategy::Mean => data.sum() / data.len() as f64,
            ThresholdStrategy::Zero => 0.0,
        }
    }
}

impl fmt::Display for ThresholdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ThresholdStrategy {
    type Err = BioHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "median" => Ok(ThresholdStrategy::Median),
            "mean" => Ok(ThresholdStrategy::Mean),
            "zero" => Ok(ThresholdStrategy::Zero),
            _ => Err(BioHashError::InvalidStrategy {
                name: s.to_string(),
            }),
        }
    }
}

/// Median with the mean-of-middle-pair rule for even lengths.
fn median(data: ArrayView1<'_, f64>) -> f64 {
    let mut sorted: Vec<f64> = data.iter().copied().collect();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
