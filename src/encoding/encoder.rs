//! Binary encoders: real vector → `{0,1}` string.

use ndarray::{ArrayBase, ArrayView1, Data, Dimension, Ix1};
use serde::{Deserialize, Serialize};

use super::strategy::ThresholdStrategy;
use crate::error::{BioHashError, Result};

/// Closed set of binarization strategies.
///
/// Both emit `'1'` for `x > t` and `'0'` otherwise; they differ only in how
/// `t` is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BinaryEncoder {
    /// Fixed global cutoff.
    Threshold { value: f64 },
    /// Cutoff recomputed from each vector.
    Adaptive { strategy: ThresholdStrategy },
}

impl BinaryEncoder {
    /// Fixed-cutoff encoder. Rejects NaN and infinities.
    pub fn threshold(value: f64) -> Result<Self> {
        if !value.is_finite() {
            return Err(BioHashError::InvalidThreshold { value });
        }
        Ok(BinaryEncoder::Threshold { value })
    }

    pub fn adaptive(strategy: ThresholdStrategy) -> Self {
        BinaryEncoder::Adaptive { strategy }
    }

    /// Re-check parameters (e.g. after deserialisation).
    pub fn validate(&self) -> Result<()> {
        match self {
            BinaryEncoder::Threshold { value } if !value.is_finite() => {
                Err(BioHashError::InvalidThreshold { value: *value })
            }
            _ => Ok(()),
        }
    }

    /// Cutoff this encoder would apply to `data`.
    pub fn cutoff(&self, data: ArrayView1<'_, f64>) -> f64 {
        match self {
            BinaryEncoder::Threshold { value } => *value,
            BinaryEncoder::Adaptive { strategy } => strategy.threshold(data),
        }
    }

    /// Encode a rank-1 array. Any other rank is a [`BioHashError::Shape`].
    pub fn encode<S, D>(&self, data: &ArrayBase<S, D>) -> Result<String>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let flat = data
            .view()
            .into_dimensionality::<Ix1>()
            .map_err(|source| BioHashError::Shape {
                shape: data.shape().to_vec(),
                source,
            })?;
        self.validate()?;
        let t = self.cutoff(flat);
        Ok(binarize(flat, t))
    }
}

impl Default for BinaryEncoder {
    fn default() -> Self {
        BinaryEncoder::Adaptive {
            strategy: crate::config::DEFAULT_STRATEGY,
        }
    }
}

fn binarize(data: ArrayView1<'_, f64>, threshold: f64) -> String {
    data.iter()
        .map(|&x| if x > threshold { '1' } else { '0' })
        .collect()
}
