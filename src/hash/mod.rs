//! BioHash templates and their comparison.
//!
//! A [`BioHash`] is created either by running a feature vector through a
//! [`Pipeline`](crate::pipeline::Pipeline) or by wrapping a template the
//! caller already holds. Comparison is a normalised Hamming distance.

pub mod biohash;
pub mod compare;

pub use biohash::BioHash;
pub use compare::{best_match, compare_many};
