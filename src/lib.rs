//! # biohash
//!
//! **Cancelable biometric templates** via BioHashing: a real-valued feature
//! vector plus a per-user secret token become a fixed-length bit string.
//!
//! ## Properties
//!
//! 1. **Non-invertible without the token**: the features are rotated into a
//!    secret orthonormal basis before binarization
//! 2. **Stable per identity**: same features, same token → same template;
//!    nearby features → small Hamming distance
//! 3. **Cancelable**: a new token yields an unrelated template from the
//!    same features
//!
//! ## Flow
//!
//! ```text
//! features ──► TokenMatrixGenerator(token, n) ──► mix ──► steps… ──► BinaryEncoder ──► BioHash
//! ```
//!
//! ```
//! use biohash::{BioHash, BinaryEncoder, ThresholdStrategy};
//! use ndarray::array;
//!
//! let features = array![0.31, -1.2, 0.07, 2.4, -0.55, 0.9];
//! let encoder = BinaryEncoder::adaptive(ThresholdStrategy::Median);
//! let enrolled = BioHash::generate_hash(&features, "user-token", encoder).unwrap();
//! let probe = BioHash::generate_hash(&features, "user-token", encoder).unwrap();
//! assert_eq!(BioHash::compare(&enrolled, &probe), 0.0);
//! ```

pub mod encoding;
pub mod error;
pub mod hash;
pub mod matrix;
pub mod mixing;
pub mod pipeline;
pub mod quantize;
pub mod token;

pub use encoding::{BinaryEncoder, ThresholdStrategy};
pub use error::{BioHashError, ErrorKind, Result};
pub use hash::BioHash;
pub use matrix::{generate_token_matrix, MatrixSource, TokenMatrix, TokenMatrixGenerator};
pub use mixing::{mix, TokenMixer};
pub use pipeline::{MatrixRetryPolicy, Pipeline, PipelineConfig};
pub use quantize::QuantizationStep;
pub use token::{generate_token, Token};

/// Crate-wide constants.
pub mod config {
    use crate::encoding::ThresholdStrategy;

    /// Default byte length for [`generate_token`](crate::generate_token).
    pub const DEFAULT_TOKEN_BYTES: usize = 32;

    /// QR fails when min |R_kk| ≤ this × max |R_kk|.
    pub const RANK_TOLERANCE: f64 = 1e-10;

    /// Max |M·Mᵀ - I| accepted as orthonormal.
    pub const ORTHONORMAL_TOLERANCE: f64 = 1e-9;

    /// Strategy used by `BinaryEncoder::default()`.
    pub const DEFAULT_STRATEGY: ThresholdStrategy = ThresholdStrategy::Median;
}
