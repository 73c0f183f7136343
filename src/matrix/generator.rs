//! Token-seeded orthonormal matrix generation.

use ndarray::{Array2, ArrayView1, ArrayView2};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, StandardNormal};

use super::qr::{householder_qr, orthonormality_error};
use crate::error::{BioHashError, Result};
use crate::token::Token;

/// A square matrix used to mix a feature vector.
///
/// Matrices produced by [`TokenMatrixGenerator`] have orthonormal rows.
/// [`TokenMatrix::from_array`] accepts any matrix so that the mixing step can
/// be driven by a fixed basis.
#[derive(Clone, Debug, PartialEq)]
pub struct TokenMatrix {
    data: Array2<f64>,
}

impl TokenMatrix {
    /// Wrap an arbitrary matrix. No orthonormality check is made.
    pub fn from_array(data: Array2<f64>) -> Self {
        Self { data }
    }

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.data.row(i)
    }

    /// Max |M·Mᵀ - I| entry.
    pub fn orthonormality_error(&self) -> f64 {
        orthonormality_error(&self.data)
    }

    pub fn is_orthonormal(&self, tolerance: f64) -> bool {
        self.orthonormality_error() <= tolerance
    }
}

/// Anything that can hand out a mixing matrix for a dimension.
///
/// `attempt` is 0 for the first try; a retry policy passes 1, 2, ... to ask for
/// a perturbed but still deterministic matrix.
pub trait MatrixSource {
    fn matrix(&self, dimension: usize, attempt: u32) -> Result<TokenMatrix>;
}

/// Derives an orthonormal matrix from a secret token.
///
/// Stateless: every call reseeds from the token, nothing is cached.
#[derive(Clone, Debug)]
pub struct TokenMatrixGenerator {
    token: Token,
}

impl TokenMatrixGenerator {
    pub fn new(token: impl Into<Token>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Generate the `dimension × dimension` orthonormal matrix for this token.
    pub fn generate(&self, dimension: usize) -> Result<TokenMatrix> {
        self.generate_attempt(dimension, 0)
    }

    /// Generate with a perturbed seed. Attempt 0 equals [`generate`](Self::generate).
    pub fn generate_attempt(&self, dimension: usize, attempt: u32) -> Result<TokenMatrix> {
        if dimension == 0 {
            return Err(BioHashError::InvalidDimension { dimension });
        }
        let seed = self.token.seed_for_attempt(attempt)?;
        let mut rng = ChaCha20Rng::from_seed(seed);

        // Row i of the raw matrix is the i-th drawn basis vector.
        let raw: Array2<f64> = Array2::from_shape_simple_fn((dimension, dimension), || {
            StandardNormal.sample(&mut rng)
        });

        let factors = householder_qr(&raw)?;
        Ok(TokenMatrix { data: factors.q })
    }
}

impl MatrixSource for TokenMatrixGenerator {
    fn matrix(&self, dimension: usize, attempt: u32) -> Result<TokenMatrix> {
        self.generate_attempt(dimension, attempt)
    }
}

/// One-shot form of [`TokenMatrixGenerator::generate`].
pub fn generate_token_matrix(token: impl Into<Token>, dimension: usize) -> Result<TokenMatrix> {
    TokenMatrixGenerator::new(token).generate(dimension)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ORTHONORMAL_TOLERANCE;

    #[test]
    fn test_random_matrix_generation() {
        let generator = TokenMatrixGenerator::new("qwertyuiopasdfghjklzxcvbnmqwerty");
        let matrix = generator.generate(4).unwrap();
        assert_eq!(matrix.rows(), 4);
        assert_eq!(matrix.cols(), 4);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let a = generate_token_matrix("user-17", 16).unwrap();
        let b = generate_token_matrix("user-17", 16).unwrap();
        // Bit-identical, not just close.
        assert_eq!(a, b);
    }

    #[test]
    fn test_rows_are_orthonormal() {
        for dim in [1, 2, 7, 32, 128] {
            let m = generate_token_matrix(1234_i64, dim).unwrap();
            assert!(
                m.is_orthonormal(ORTHONORMAL_TOLERANCE),
                "dim {} error {}",
                dim,
                m.orthonormality_error()
            );
            for i in 0..dim {
                let norm = m.row(i).dot(&m.row(i)).sqrt();
                assert!((norm - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_different_tokens_different_matrices() {
        let a = generate_token_matrix("alice", 8).unwrap();
        let b = generate_token_matrix("bob", 8).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = generate_token_matrix("t", 0).unwrap_err();
        assert!(matches!(err, BioHashError::InvalidDimension { dimension: 0 }));
    }

    #[test]
    fn test_attempt_changes_matrix() {
        let g = TokenMatrixGenerator::new(99_i64);
        let a = g.generate_attempt(6, 0).unwrap();
        let b = g.generate_attempt(6, 1).unwrap();
        assert_eq!(a, g.generate(6).unwrap());
        assert_ne!(a, b);
        assert!(b.is_orthonormal(ORTHONORMAL_TOLERANCE));
    }
}
