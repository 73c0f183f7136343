//! Hamming-distance scoring between binary templates.
//!
//! Templates are packed into u64 words aligned at the least-significant end,
//! so a shorter template behaves as if zero-padded on its most-significant
//! side. The normalised score divides by the longer length:
//!
//! score(a, b) = popcount(a ⊕ b) / max(|a|, |b|)   ∈ [0, 1]

use rayon::prelude::*;

use super::biohash::BioHash;
use crate::error::{BioHashError, Result};

/// Pack a `{0,1}` string into words; bit 0 of word 0 is the last character.
fn pack(bits: &str, words: usize) -> Vec<u64> {
    let mut out = vec![0u64; words];
    for (i, b) in bits.bytes().rev().enumerate() {
        if b == b'1' {
            out[i / 64] |= 1u64 << (i % 64);
        }
    }
    out
}

/// Number of differing bits, with implicit leading-zero padding.
pub fn hamming_distance(a: &BioHash, b: &BioHash) -> usize {
    let width = a.len().max(b.len());
    let words = (width + 63) / 64;
    let pa = pack(a.as_str(), words);
    let pb = pack(b.as_str(), words);
    pa.iter()
        .zip(pb.iter())
        .map(|(&x, &y)| (x ^ y).count_ones() as usize)
        .sum()
}

/// Normalised difference in `[0, 1]`: 0 = identical, 1 = every bit differs.
pub fn compare(a: &BioHash, b: &BioHash) -> f64 {
    let width = a.len().max(b.len());
    hamming_distance(a, b) as f64 / width as f64
}

/// As [`compare`], but templates of different lengths are an error.
pub fn compare_exact(a: &BioHash, b: &BioHash) -> Result<f64> {
    if a.len() != b.len() {
        return Err(BioHashError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    Ok(compare(a, b))
}

/// Score `probe` against every template in `gallery`, in parallel.
pub fn compare_many(probe: &BioHash, gallery: &[BioHash]) -> Vec<f64> {
    gallery.par_iter().map(|g| compare(probe, g)).collect()
}

/// Index and score of the closest gallery entry, if any.
pub fn best_match(probe: &BioHash, gallery: &[BioHash]) -> Option<(usize, f64)> {
    compare_many(probe, gallery)
        .into_iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(&b.1))
}
