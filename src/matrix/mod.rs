//! Token matrices: the secret rotation applied to every feature vector.
//!
//! A token seeds a deterministic PRNG, `dimension²` Gaussian draws form a raw
//! matrix, and its QR orthogonal factor becomes the mixing basis. The matrix
//! is rebuilt on every use and never stored.

pub mod generator;
pub mod qr;

pub use generator::{generate_token_matrix, MatrixSource, TokenMatrix, TokenMatrixGenerator};
