//! Quantization steps applied between mixing and encoding.
//!
//! Each step is a pure `RealVector -> RealVector` map that keeps one value per
//! basis projection. Steps run in list order inside a
//! [`Pipeline`](crate::pipeline::Pipeline).

use ndarray::{Array1, ArrayView1};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::error::{BioHashError, Result};

/// The available steps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuantizationStep {
    /// Multiply every element by `factor`.
    Scale { factor: f64 },

    /// Add `delta` to every element.
    Offset { delta: f64 },

    /// Clamp each element to `[min, max]`.
    Clamp { min: f64, max: f64 },

    /// Divide by the L2 norm (zero vectors pass through).
    L2Normalize,

    /// Subtract the mean, divide by the standard deviation.
    /// Constant vectors become all-zero.
    Standardize,

    /// Add Gaussian noise N(0, sigma²) drawn from a PRNG seeded with `seed`.
    /// Same seed, same noise.
    Jitter { sigma: f64, seed: u64 },
}

impl QuantizationStep {
    pub fn name(&self) -> &'static str {
        match self {
            QuantizationStep::Scale { .. } => "scale",
            QuantizationStep::Offset { .. } => "offset",
            QuantizationStep::Clamp { .. } => "clamp",
            QuantizationStep::L2Normalize => "l2_normalize",
            QuantizationStep::Standardize => "standardize",
            QuantizationStep::Jitter { .. } => "jitter",
        }
    }

    /// Check parameters without running the step.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| BioHashError::InvalidStep {
            step: self.name(),
            reason: reason.to_string(),
        };
        match *self {
            QuantizationStep::Scale { factor } if !factor.is_finite() => {
                Err(invalid("factor must be finite"))
            }
            QuantizationStep::Offset { delta } if !delta.is_finite() => {
                Err(invalid("delta must be finite"))
            }
            QuantizationStep::Clamp { min, max } => {
                if min.is_nan() || max.is_nan() {
                    Err(invalid("bounds must not be NaN"))
                } else if min > max {
                    Err(invalid("min must be <= max"))
                } else {
                    Ok(())
                }
            }
            QuantizationStep::Jitter { sigma, .. } if !(sigma.is_finite() && sigma >= 0.0) => {
                Err(invalid("sigma must be finite and >= 0"))
            }
            _ => Ok(()),
        }
    }

    /// Run the step.
    pub fn apply(&self, data: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.validate()?;
        let out = match *self {
            QuantizationStep::Scale { factor } => data.mapv(|v| v * factor),
            QuantizationStep::Offset { delta } => data.mapv(|v| v + delta),
            QuantizationStep::Clamp { min, max } => data.mapv(|v| v.clamp(min, max)),
            QuantizationStep::L2Normalize => {
                let norm = data.dot(&data).sqrt();
                if norm > 0.0 {
                    data.mapv(|v| v / norm)
                } else {
                    data.to_owned()
                }
            }
            QuantizationStep::Standardize => {
                if data.is_empty() {
                    return Ok(data.to_owned());
                }
                let n = data.len() as f64;
                let mean = data.sum() / n;
                let var = data.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
                let std = var.sqrt();
                if std > 0.0 {
                    data.mapv(|v| (v - mean) / std)
                } else {
                    Array1::zeros(data.len())
                }
            }
            QuantizationStep::Jitter { sigma, seed } => {
                if sigma == 0.0 {
                    data.to_owned()
                } else {
                    let normal = Normal::new(0.0, sigma).map_err(|e| BioHashError::InvalidStep {
                        step: self.name(),
                        reason: e.to_string(),
                    })?;
                    let mut rng = ChaCha20Rng::seed_from_u64(seed);
                    data.mapv(|v| v + normal.sample(&mut rng))
                }
            }
        };
        Ok(out)
    }
}

/// Apply `steps` in order, rejecting any step that changes the length.
pub fn apply_steps(steps: &[QuantizationStep], data: Array1<f64>) -> Result<Array1<f64>> {
    let expected = data.len();
    let mut current = data;
    for step in steps {
        let next = step.apply(current.view())?;
        if next.len() != expected {
            return Err(BioHashError::StepChangedLength {
                step: step.name(),
                expected,
                actual: next.len(),
            });
        }
        current = next;
    }
    Ok(current)
}
