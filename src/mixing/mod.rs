//! Feature mixing: projection of a feature vector onto the token basis.
//!
//! mixed[i] = ⟨features, row_i⟩, rows taken in generated order.
//!
//! With an orthonormal basis this is a rotation, so distances between feature
//! vectors survive while the coordinates themselves depend on the token.

use ndarray::{s, Array1, ArrayView1, ArrayView2, ErrorKind as NdErrorKind, ShapeError};

use crate::error::{BioHashError, Result};
use crate::matrix::{MatrixSource, TokenMatrix};

/// Project `features` onto every row of `matrix`.
///
/// Requires `features.len() <= rows`. A feature vector shorter than the row
/// length is zero-extended, i.e. only the leading columns take part in the
/// inner product. Output length equals the row count.
pub fn mix(features: ArrayView1<'_, f64>, matrix: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    let (rows, cols) = matrix.dim();
    let n = features.len();
    if n > rows || n > cols {
        return Err(BioHashError::DimensionMismatch {
            features: n,
            rows,
            source: ShapeError::from_kind(NdErrorKind::IncompatibleShape),
        });
    }

    let basis = matrix.slice(s![.., ..n]);
    Ok(Array1::from_iter(
        basis.rows().into_iter().map(|row| row.dot(&features)),
    ))
}

/// Mixes feature vectors with the matrix a [`MatrixSource`] yields for their
/// length.
#[derive(Clone, Debug)]
pub struct TokenMixer<M> {
    source: M,
}

impl<M: MatrixSource> TokenMixer<M> {
    pub fn new(source: M) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &M {
        &self.source
    }

    /// Generate the matrix for `features.len()` and mix.
    pub fn normalize(&self, features: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        self.normalize_attempt(features, 0)
    }

    /// As [`normalize`](Self::normalize), with a perturbed matrix seed.
    pub fn normalize_attempt(
        &self,
        features: ArrayView1<'_, f64>,
        attempt: u32,
    ) -> Result<Array1<f64>> {
        let matrix: TokenMatrix = self.source.matrix(features.len(), attempt)?;
        mix(features, matrix.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::TokenMatrixGenerator;
    use ndarray::{array, Array2};

    struct ConstantSource(f64);

    impl MatrixSource for ConstantSource {
        fn matrix(&self, dimension: usize, _attempt: u32) -> Result<TokenMatrix> {
            Ok(TokenMatrix::from_array(Array2::from_elem(
                (dimension, dimension),
                self.0,
            )))
        }
    }

    #[test]
    fn test_normalization_method() {
        let mixer = TokenMixer::new(ConstantSource(2.0));
        let out = mixer.normalize(Array1::<f64>::ones(2).view()).unwrap();
        assert_eq!(out, array![4.0, 4.0]);
    }

    #[test]
    fn test_invalid_mixing_shape() {
        let features = Array1::<f64>::ones(10);
        let matrix = Array2::<f64>::ones((5, 5));
        let err = mix(features.view(), matrix.view()).unwrap_err();
        assert!(matches!(
            err,
            BioHashError::DimensionMismatch {
                features: 10,
                rows: 5,
                ..
            }
        ));
    }

    #[test]
    fn test_row_order_preserved() {
        let matrix = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]];
        let out = mix(array![3.0, 5.0, 7.0].view(), matrix.view()).unwrap();
        assert_eq!(out, array![3.0, 7.0, 5.0]);
    }

    #[test]
    fn test_short_features_zero_extended() {
        let matrix = array![[1.0, 2.0, 9.0], [3.0, 4.0, 9.0], [5.0, 6.0, 9.0]];
        let out = mix(array![1.0, 1.0].view(), matrix.view()).unwrap();
        assert_eq!(out, array![3.0, 7.0, 11.0]);
    }

    #[test]
    fn test_orthonormal_mix_preserves_norm() {
        let mixer = TokenMixer::new(TokenMatrixGenerator::new("norm-check"));
        let features = array![0.3, -1.2, 4.5, 0.0, 2.2, -0.7];
        let mixed = mixer.normalize(features.view()).unwrap();
        let before = features.dot(&features).sqrt();
        let after = mixed.dot(&mixed).sqrt();
        assert!((before - after).abs() < 1e-9);
    }
}
