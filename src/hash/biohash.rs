//! The BioHash value object.

use std::fmt;
use std::str::FromStr;

use ndarray::{ArrayBase, Data, Dimension};
use serde::{Deserialize, Serialize};

use super::compare;
use crate::encoding::BinaryEncoder;
use crate::error::{BioHashError, Result};
use crate::matrix::MatrixSource;
use crate::pipeline::Pipeline;
use crate::token::Token;

/// An immutable binary template, optionally carrying an acceptance threshold.
///
/// Content always matches `^[01]+$`; the threshold, when present, lies in
/// `[0, 1]`. Both are checked on every construction path, deserialisation
/// included.
///
/// `==` is structural (same bits, same threshold). Tolerant comparison goes
/// through [`matches`](Self::matches).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBioHash", into = "RawBioHash")]
pub struct BioHash {
    content: String,
    validation_threshold: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct RawBioHash {
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    validation_threshold: Option<f64>,
}

impl TryFrom<RawBioHash> for BioHash {
    type Error = BioHashError;

    fn try_from(raw: RawBioHash) -> Result<Self> {
        Self::from_parts(raw.content, raw.validation_threshold)
    }
}

impl From<BioHash> for RawBioHash {
    fn from(h: BioHash) -> Self {
        RawBioHash {
            content: h.content,
            validation_threshold: h.validation_threshold,
        }
    }
}

fn is_valid_content(content: &str) -> bool {
    !content.is_empty() && content.bytes().all(|b| b == b'0' || b == b'1')
}

fn check_threshold(value: f64) -> Result<f64> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(BioHashError::ThresholdOutOfRange { value })
    }
}

impl BioHash {
    /// Wrap an existing template (e.g. one reloaded by the caller).
    pub fn new(content: impl Into<String>) -> Result<Self> {
        Self::from_parts(content.into(), None)
    }

    /// Wrap a template together with its acceptance threshold.
    pub fn with_threshold(content: impl Into<String>, threshold: f64) -> Result<Self> {
        Self::from_parts(content.into(), Some(threshold))
    }

    fn from_parts(content: String, threshold: Option<f64>) -> Result<Self> {
        if !is_valid_content(&content) {
            return Err(BioHashError::InvalidHash { content });
        }
        let validation_threshold = threshold.map(check_threshold).transpose()?;
        Ok(Self {
            content,
            validation_threshold,
        })
    }

    /// Derive a template from raw features: token matrix, mixing, encoding.
    pub fn generate_hash<S, D>(
        features: &ArrayBase<S, D>,
        token: impl Into<Token>,
        encoder: BinaryEncoder,
    ) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        Self::generate_with_pipeline(features, &Pipeline::new(token, encoder))
    }

    /// Derive a template through a fully configured pipeline.
    pub fn generate_with_pipeline<S, D, M>(
        features: &ArrayBase<S, D>,
        pipeline: &Pipeline<M>,
    ) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
        M: MatrixSource,
    {
        Self::new(pipeline.transform(features)?)
    }

    /// Same as [`generate_with_pipeline`](Self::generate_with_pipeline), then
    /// attach `threshold`.
    pub fn generate_with_threshold<S, D, M>(
        features: &ArrayBase<S, D>,
        pipeline: &Pipeline<M>,
        threshold: f64,
    ) -> Result<Self>
    where
        S: Data<Elem = f64>,
        D: Dimension,
        M: MatrixSource,
    {
        check_threshold(threshold)?;
        Self::with_threshold(pipeline.transform(features)?, threshold)
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// Never true for a constructed template.
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn validation_threshold(&self) -> Option<f64> {
        self.validation_threshold
    }

    /// Normalised Hamming difference, see [`compare::compare`].
    pub fn compare(a: &BioHash, b: &BioHash) -> f64 {
        compare::compare(a, b)
    }

    /// Strict variant that refuses templates of unequal length.
    pub fn compare_exact(a: &BioHash, b: &BioHash) -> Result<f64> {
        compare::compare_exact(a, b)
    }

    pub fn hamming_distance(&self, other: &BioHash) -> usize {
        compare::hamming_distance(self, other)
    }

    /// Threshold that governs a match between `self` and `other`. A score
    /// within either instance's threshold is accepted, so this is the larger
    /// of the two, or `None` when neither carries one.
    pub fn effective_threshold(&self, other: &BioHash) -> Option<f64> {
        match (self.validation_threshold, other.validation_threshold) {
            (Some(a), Some(b)) => Some(a.max(b)),
            (Some(t), None) | (None, Some(t)) => Some(t),
            (None, None) => None,
        }
    }

    /// Whether the two templates are close enough to be the same identity.
    /// Without any threshold only identical bit patterns match.
    pub fn matches(&self, other: &BioHash) -> bool {
        let score = Self::compare(self, other);
        score <= self.effective_threshold(other).unwrap_or(0.0)
    }
}

impl fmt::Display for BioHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

impl FromStr for BioHash {
    type Err = BioHashError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl AsRef<str> for BioHash {
    fn as_ref(&self) -> &str {
        &self.content
    }
}
