//! End-to-end properties of template generation and comparison.

use biohash::config::ORTHONORMAL_TOLERANCE;
use biohash::{
    generate_token, generate_token_matrix, mix, BinaryEncoder, BioHash, BioHashError, ErrorKind,
    Pipeline, PipelineConfig, QuantizationStep, ThresholdStrategy,
};
use ndarray::{Array1, Array2};

/// Deterministic pseudo-feature vector (no RNG needed).
fn features(dim: usize, phase: f64) -> Array1<f64> {
    Array1::from_iter((0..dim).map(|i| ((i as f64 + 1.0) * 0.7 + phase).sin() * 2.0))
}

#[test]
fn test_matrix_determinism_and_orthonormality() {
    for dim in [3, 16, 64] {
        let a = generate_token_matrix("enrolment-token", dim).unwrap();
        let b = generate_token_matrix("enrolment-token", dim).unwrap();
        assert_eq!(a, b);
        assert!(a.is_orthonormal(ORTHONORMAL_TOLERANCE));
    }
}

#[test]
fn test_mix_shape_contract() {
    let err = mix(Array1::<f64>::ones(10).view(), Array2::<f64>::ones((5, 5)).view()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ShapeMismatch);
}

#[test]
fn test_round_trip_determinism() {
    let x = features(128, 0.0);
    let token = generate_token(32).unwrap();
    for strategy in ThresholdStrategy::all() {
        let enc = BinaryEncoder::adaptive(strategy);
        let a = BioHash::generate_hash(&x, token.as_str(), enc).unwrap();
        let b = BioHash::generate_hash(&x, token.as_str(), enc).unwrap();
        assert_eq!(a.as_str(), b.as_str());
        assert_eq!(a.len(), 128);
    }
}

#[test]
fn test_same_token_tolerates_noise() {
    let token = "noise-token";
    let enrolled = features(256, 0.0);
    let probe = &enrolled + &features(256, 1.3).mapv(|v| v * 0.02);
    let other = features(256, 2.1);

    let enc = BinaryEncoder::adaptive(ThresholdStrategy::Median);
    let h_enrolled = BioHash::generate_hash(&enrolled, token, enc).unwrap();
    let h_probe = BioHash::generate_hash(&probe, token, enc).unwrap();
    let h_other = BioHash::generate_hash(&other, token, enc).unwrap();

    let genuine = BioHash::compare(&h_enrolled, &h_probe);
    let impostor = BioHash::compare(&h_enrolled, &h_other);
    assert!(genuine < 0.1, "genuine score {}", genuine);
    assert!(genuine < impostor, "genuine {} impostor {}", genuine, impostor);
}

#[test]
fn test_token_change_decorrelates() {
    let x = features(512, 0.4);
    let enc = BinaryEncoder::adaptive(ThresholdStrategy::Median);
    let a = BioHash::generate_hash(&x, "token-one", enc).unwrap();
    let b = BioHash::generate_hash(&x, "token-two", enc).unwrap();
    let score = BioHash::compare(&a, &b);
    // Unrelated 512-bit templates sit near 0.5.
    assert!(score > 0.35 && score < 0.65, "score {}", score);
}

#[test]
fn test_hamming_properties() {
    let a = BioHash::new("1".repeat(32)).unwrap();
    let z = BioHash::new("0".repeat(32)).unwrap();
    assert_eq!(BioHash::compare(&a, &a), 0.0);
    assert_eq!(BioHash::compare(&a, &z), 1.0);
    assert_eq!(BioHash::compare(&z, &a), 1.0);

    let x = BioHash::new("1111111111").unwrap();
    let y = BioHash::new("1111111110").unwrap();
    assert_eq!(BioHash::compare(&x, &y), 0.1);
}

#[test]
fn test_validation_rejection() {
    let err = BioHash::new("0101x0101").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InputValidation);
}

#[test]
fn test_threshold_based_equality() {
    let enrolled = BioHash::with_threshold("1111111111", 0.2).unwrap();
    assert!(enrolled.matches(&BioHash::new("1111111110").unwrap()));
    assert!(!enrolled.matches(&BioHash::new("1111111000").unwrap()));

    // Loose enrolment threshold accepts a candidate carrying a stricter one.
    let candidate = BioHash::with_threshold("1111111000", 0.1).unwrap();
    let loose = BioHash::with_threshold("1111111111", 0.5).unwrap();
    assert!(loose.matches(&candidate));
    assert!(!enrolled.matches(&candidate));
}

#[test]
fn test_configured_pipeline() {
    let cfg = PipelineConfig::from_json_str(
        r#"{
            "encoder": {"kind": "adaptive", "strategy": "zero"},
            "steps": [{"kind": "standardize"}, {"kind": "clamp", "min": -3.0, "max": 3.0}],
            "validation_threshold": 0.15
        }"#,
    )
    .unwrap();
    let pipeline = Pipeline::from_config("cfg-token", &cfg).unwrap();
    assert_eq!(
        pipeline.steps(),
        &[
            QuantizationStep::Standardize,
            QuantizationStep::Clamp { min: -3.0, max: 3.0 }
        ]
    );

    let x = features(48, 0.9);
    let h = BioHash::generate_with_threshold(&x, &pipeline, 0.15).unwrap();
    assert_eq!(h.len(), 48);
    assert_eq!(h.validation_threshold(), Some(0.15));
}

#[test]
fn test_generation_is_atomic_on_error() {
    let p = Pipeline::new("t", BinaryEncoder::default());
    let err = BioHash::generate_with_pipeline(&Array2::<f64>::zeros((3, 3)), &p).unwrap_err();
    assert!(matches!(err, BioHashError::InvalidRank { ndim: 2 }));
}
