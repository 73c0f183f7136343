//! Binarization of mixed vectors.
//!
//! - **Threshold**: fixed cutoff `t`, bit = `x > t`
//! - **Adaptive**: `t` = median, mean or zero of the vector itself

pub mod encoder;
pub mod strategy;

pub use encoder::BinaryEncoder;
pub use strategy::ThresholdStrategy;
