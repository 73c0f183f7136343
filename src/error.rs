//! Error taxonomy for template generation and comparison.
//!
//! Every failure is synchronous and surfaces on the return path. Nothing is
//! retried internally except where a caller opted into a
//! [`MatrixRetryPolicy`](crate::pipeline::MatrixRetryPolicy).

use ndarray::ShapeError;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BioHashError>;

/// Coarse classification of a [`BioHashError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed caller input: bad templates, ranks, thresholds, dimensions.
    InputValidation,
    /// Shapes that do not line up between stages.
    ShapeMismatch,
    /// Degenerate numerics during matrix generation.
    NumericFailure,
}

/// All errors produced by the library.
#[derive(Debug, Error)]
pub enum BioHashError {
    /// Requested matrix dimension is zero.
    #[error("invalid dimension {dimension}: must be > 0")]
    InvalidDimension { dimension: usize },

    /// Template content is not a non-empty string over `{0,1}`.
    #[error("'{content}' is not a valid BioHash")]
    InvalidHash { content: String },

    /// Validation threshold outside `[0, 1]` (or NaN).
    #[error("validation threshold {value} is out of range [0, 1]")]
    ThresholdOutOfRange { value: f64 },

    /// Fixed encoder cutoff is not a finite number.
    #[error("encoder threshold {value} is not finite")]
    InvalidThreshold { value: f64 },

    /// Unknown threshold strategy name.
    #[error("invalid threshold strategy '{name}' (expected median, mean or zero)")]
    InvalidStrategy { name: String },

    /// Feature data is not a flat vector.
    #[error("feature data must be 1-dimensional, got rank {ndim}")]
    InvalidRank { ndim: usize },

    /// Feature vector contains NaN or an infinity.
    #[error("feature at index {index} is not finite")]
    NonFiniteFeature { index: usize },

    /// Token cannot be used as a seed.
    #[error("invalid token: {reason}")]
    InvalidToken { reason: String },

    /// Quantization step parameters are unusable.
    #[error("invalid quantization step {step}: {reason}")]
    InvalidStep { step: &'static str, reason: String },

    /// Feature vector is longer than the token matrix has rows.
    #[error(
        "count of feature elements must be <= rows in token matrix \
         (expected at least {features} rows, got {rows})"
    )]
    DimensionMismatch {
        features: usize,
        rows: usize,
        #[source]
        source: ShapeError,
    },

    /// Data handed to an encoder is not rank-1.
    #[error("expected 1-D data for binarization, got shape {shape:?}")]
    Shape {
        shape: Vec<usize>,
        #[source]
        source: ShapeError,
    },

    /// A quantization step returned a vector of a different length.
    #[error("quantization step {step} changed length from {expected} to {actual}")]
    StepChangedLength {
        step: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Strict comparison of templates with different bit lengths.
    #[error("template lengths differ ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    /// QR orthonormalisation did not yield a full-rank orthogonal factor.
    #[error("token matrix generation failed for dimension {dimension}: {reason}")]
    MatrixGeneration { dimension: usize, reason: String },
}

impl BioHashError {
    /// Which of the three error families this belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BioHashError::InvalidDimension { .. }
            | BioHashError::InvalidHash { .. }
            | BioHashError::ThresholdOutOfRange { .. }
            | BioHashError::InvalidThreshold { .. }
            | BioHashError::InvalidStrategy { .. }
            | BioHashError::InvalidRank { .. }
            | BioHashError::NonFiniteFeature { .. }
            | BioHashError::InvalidToken { .. }
            | BioHashError::InvalidStep { .. } => ErrorKind::InputValidation,
            BioHashError::DimensionMismatch { .. }
            | BioHashError::Shape { .. }
            | BioHashError::StepChangedLength { .. }
            | BioHashError::LengthMismatch { .. } => ErrorKind::ShapeMismatch,
            BioHashError::MatrixGeneration { .. } => ErrorKind::NumericFailure,
        }
    }

    /// Whether a caller-side retry with a perturbed seed could help.
    pub fn is_numeric(&self) -> bool {
        self.kind() == ErrorKind::NumericFailure
    }
}
