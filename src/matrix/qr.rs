//! Householder QR orthonormalisation.
//!
//! For square A: A = Q·R with Q orthogonal. Each reflector
//! H_k = I - 2·v·vᵀ zeroes column k below the diagonal of R and is
//! accumulated into Q from the right.
//!
//! Q's columns are sign-normalised so that diag(R) > 0; this makes the
//! factorisation unique and, for Gaussian A, makes Q Haar-distributed.

use ndarray::{s, Array1, Array2, Axis};

use crate::config::RANK_TOLERANCE;
use crate::error::{BioHashError, Result};

/// Result of a QR factorisation.
#[derive(Clone, Debug)]
pub struct QrFactors {
    /// Orthogonal factor.
    pub q: Array2<f64>,

    /// Diagonal of the upper-triangular factor (after sign normalisation).
    pub r_diag: Array1<f64>,
}

/// Factor a square matrix. Fails if it is rank deficient or contains
/// non-finite values.
pub fn householder_qr(a: &Array2<f64>) -> Result<QrFactors> {
    let (rows, cols) = a.dim();
    if rows != cols {
        return Err(BioHashError::MatrixGeneration {
            dimension: rows,
            reason: format!("expected a square matrix, got {}x{}", rows, cols),
        });
    }
    if rows == 0 {
        return Err(BioHashError::InvalidDimension { dimension: 0 });
    }
    if a.iter().any(|v| !v.is_finite()) {
        return Err(BioHashError::MatrixGeneration {
            dimension: rows,
            reason: "raw matrix contains non-finite values".to_string(),
        });
    }

    let n = rows;
    let mut r = a.clone();
    let mut q = Array2::<f64>::eye(n);

    for k in 0..n {
        let x = r.slice(s![k.., k]).to_owned();
        let x_norm = l2_norm(&x);
        if x_norm == 0.0 {
            // Column already zero below the diagonal: rank deficiency is
            // caught by the diagonal check below.
            continue;
        }

        let alpha = if x[0] >= 0.0 { -x_norm } else { x_norm };
        let mut v = x;
        v[0] -= alpha;
        let v_norm = l2_norm(&v);
        if v_norm == 0.0 {
            continue;
        }
        v.mapv_inplace(|e| e / v_norm);

        // R[k.., ..] -= 2 v (vᵀ R[k.., ..])
        {
            let mut sub = r.slice_mut(s![k.., ..]);
            let w = sub.t().dot(&v);
            let outer = outer(&v, &w);
            sub.scaled_add(-2.0, &outer);
        }

        // Q[.., k..] -= 2 (Q[.., k..] v) vᵀ
        {
            let mut sub = q.slice_mut(s![.., k..]);
            let u = sub.dot(&v);
            let outer = outer(&u, &v);
            sub.scaled_add(-2.0, &outer);
        }
    }

    let mut r_diag = r.diag().to_owned();
    for (k, d) in r_diag.iter_mut().enumerate() {
        if *d < 0.0 {
            q.column_mut(k).mapv_inplace(|e| -e);
            *d = -*d;
        }
    }

    let max_diag = r_diag.iter().cloned().fold(0.0_f64, f64::max);
    let min_diag = r_diag.iter().cloned().fold(f64::INFINITY, f64::min);
    tracing::trace!(n, min_diag, max_diag, "householder qr");

    if !max_diag.is_finite() || max_diag == 0.0 || min_diag <= RANK_TOLERANCE * max_diag {
        return Err(BioHashError::MatrixGeneration {
            dimension: n,
            reason: format!(
                "rank deficient raw matrix (|R_kk| min {:e}, max {:e})",
                min_diag, max_diag
            ),
        });
    }

    if q.iter().any(|v| !v.is_finite()) {
        return Err(BioHashError::MatrixGeneration {
            dimension: n,
            reason: "orthogonal factor contains non-finite values".to_string(),
        });
    }

    Ok(QrFactors { q, r_diag })
}

/// Largest absolute deviation of M·Mᵀ from the identity.
pub fn orthonormality_error(m: &Array2<f64>) -> f64 {
    let gram = m.dot(&m.t());
    let eye = Array2::<f64>::eye(gram.nrows());
    (&gram - &eye)
        .iter()
        .fold(0.0_f64, |acc, v| acc.max(v.abs()))
}

fn l2_norm(v: &Array1<f64>) -> f64 {
    v.iter().map(|e| e * e).sum::<f64>().sqrt()
}

fn outer(a: &Array1<f64>, b: &Array1<f64>) -> Array2<f64> {
    let col = a.view().insert_axis(Axis(1));
    let row = b.view().insert_axis(Axis(0));
    col.dot(&row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_qr_reconstructs_input() {
        let a = array![[2.0, -1.0, 0.5], [1.0, 3.0, -2.0], [0.0, 1.0, 4.0]];
        let f = householder_qr(&a).unwrap();
        assert!(orthonormality_error(&f.q) < 1e-12);

        // R = Qᵀ A must be upper triangular with the reported diagonal.
        let r = f.q.t().dot(&a);
        for i in 0..3 {
            assert!((r[[i, i]] - f.r_diag[i]).abs() < 1e-10);
            for j in 0..i {
                assert!(r[[i, j]].abs() < 1e-10, "r[{},{}] = {}", i, j, r[[i, j]]);
            }
        }
    }

    #[test]
    fn test_positive_diagonal() {
        let a = array![[-4.0, 1.0], [2.0, -3.0]];
        let f = householder_qr(&a).unwrap();
        assert!(f.r_diag.iter().all(|&d| d > 0.0));
    }

    #[test]
    fn test_one_by_one() {
        let a = array![[-5.0]];
        let f = householder_qr(&a).unwrap();
        assert!((f.q[[0, 0]] + 1.0).abs() < 1e-12);
        assert!((f.r_diag[0] - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_deficient_rejected() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        let err = householder_qr(&a).unwrap_err();
        assert!(err.is_numeric(), "{}", err);
    }

    #[test]
    fn test_constant_matrix_rejected() {
        let a = Array2::from_elem((4, 4), 2.0);
        assert!(householder_qr(&a).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        let a = array![[1.0, f64::NAN], [0.0, 1.0]];
        assert!(householder_qr(&a).unwrap_err().is_numeric());
    }

    #[test]
    fn test_non_square_rejected() {
        let a = Array2::<f64>::zeros((2, 3));
        assert!(householder_qr(&a).is_err());
    }
}
