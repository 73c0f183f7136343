//! Feature vector in, binary template out.
//!
//! Stages, in order:
//! 1. Generate the token matrix for `len(features)`
//! 2. Mix features with the matrix
//! 3. Apply each quantization step
//! 4. Encode with the configured [`BinaryEncoder`]
//!
//! Stages 1–2 hold the secret; stages 3–4 are quantization policy and never
//! see the token.

pub mod config;

use std::time::Instant;

use ndarray::{Array1, ArrayBase, ArrayView1, Data, Dimension, Ix1};
use rayon::prelude::*;

use crate::encoding::BinaryEncoder;
use crate::error::{BioHashError, Result};
use crate::matrix::{MatrixSource, TokenMatrixGenerator};
use crate::mixing::TokenMixer;
use crate::quantize::{apply_steps, QuantizationStep};
use crate::token::Token;

pub use config::PipelineConfig;

/// How many perturbed seeds to try after a degenerate matrix.
///
/// The default never retries. Templates produced after a retry are still
/// reproducible: the attempt sequence is deterministic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatrixRetryPolicy {
    pub max_retries: u32,
}

impl MatrixRetryPolicy {
    pub fn none() -> Self {
        Self { max_retries: 0 }
    }

    pub fn retries(max_retries: u32) -> Self {
        Self { max_retries }
    }
}

/// A configured transformation pipeline.
#[derive(Clone, Debug)]
pub struct Pipeline<M = TokenMatrixGenerator> {
    mixer: TokenMixer<M>,
    steps: Vec<QuantizationStep>,
    encoder: BinaryEncoder,
    retry: MatrixRetryPolicy,
}

impl Pipeline<TokenMatrixGenerator> {
    /// Pipeline for `token` with no quantization steps.
    pub fn new(token: impl Into<Token>, encoder: BinaryEncoder) -> Self {
        Self::with_source(TokenMatrixGenerator::new(token), encoder)
    }

    /// Build from a validated [`PipelineConfig`].
    pub fn from_config(token: impl Into<Token>, config: &PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(token, config.encoder)
            .with_steps(config.steps.iter().cloned())
            .with_retry_policy(MatrixRetryPolicy::retries(config.matrix_retries)))
    }
}

impl<M: MatrixSource> Pipeline<M> {
    /// Pipeline driven by an arbitrary matrix source.
    pub fn with_source(source: M, encoder: BinaryEncoder) -> Self {
        Self {
            mixer: TokenMixer::new(source),
            steps: Vec::new(),
            encoder,
            retry: MatrixRetryPolicy::default(),
        }
    }

    /// Append one quantization step.
    pub fn with_step(mut self, step: QuantizationStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Append several quantization steps, keeping their order.
    pub fn with_steps(mut self, steps: impl IntoIterator<Item = QuantizationStep>) -> Self {
        self.steps.extend(steps);
        self
    }

    pub fn with_retry_policy(mut self, retry: MatrixRetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn encoder(&self) -> &BinaryEncoder {
        &self.encoder
    }

    pub fn steps(&self) -> &[QuantizationStep] {
        &self.steps
    }

    pub fn retry_policy(&self) -> MatrixRetryPolicy {
        self.retry
    }

    /// Transform one feature vector into a binary template.
    ///
    /// Fails without partial output on any stage error.
    pub fn transform<S, D>(&self, features: &ArrayBase<S, D>) -> Result<String>
    where
        S: Data<Elem = f64>,
        D: Dimension,
    {
        let start = Instant::now();
        let features = validate_features(features)?;

        let mixed = self.mix_with_retry(features)?;
        let quantized = apply_steps(&self.steps, mixed)?;
        let template = self.encoder.encode(&quantized)?;

        tracing::debug!(
            dimension = features.len(),
            steps = self.steps.len(),
            elapsed_us = start.elapsed().as_micros() as u64,
            "biohash transform"
        );
        Ok(template)
    }

    fn mix_with_retry(&self, features: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
        let mut attempt = 0;
        loop {
            match self.mixer.normalize_attempt(features, attempt) {
                Err(err) if err.is_numeric() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        dimension = features.len(),
                        attempt,
                        max_retries = self.retry.max_retries,
                        "degenerate token matrix, retrying with perturbed seed: {}",
                        err
                    );
                }
                other => return other,
            }
        }
    }
}

impl<M: MatrixSource + Sync> Pipeline<M> {
    /// Transform many vectors in parallel. Results keep input order.
    pub fn transform_batch(&self, batch: &[Array1<f64>]) -> Vec<Result<String>> {
        batch.par_iter().map(|f| self.transform(f)).collect()
    }
}

/// Rank-1, finite check shared by every entry point.
pub(crate) fn validate_features<S, D>(features: &ArrayBase<S, D>) -> Result<ArrayView1<'_, f64>>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let ndim = features.ndim();
    let flat = features
        .view()
        .into_dimensionality::<Ix1>()
        .map_err(|_| BioHashError::InvalidRank { ndim })?;
    if flat.is_empty() {
        return Err(BioHashError::InvalidDimension { dimension: 0 });
    }
    if let Some(index) = flat.iter().position(|v| !v.is_finite()) {
        return Err(BioHashError::NonFiniteFeature { index });
    }
    Ok(flat)
}
