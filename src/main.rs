//! biohash: cancelable biometric templates from the command line.
//!
//! ```text
//! biohash token --bytes 32
//! biohash hash --token <hex> --strategy median 0.1 -0.4 1.3 ...
//! biohash hash --token 42 --token-kind int 0.1 -0.4 1.3 ...
//! biohash compare 1011 1001 --threshold 0.25
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use biohash::config::DEFAULT_TOKEN_BYTES;
use biohash::{
    generate_token, BinaryEncoder, BioHash, Pipeline, PipelineConfig, ThresholdStrategy, Token,
};

/// BioHash CLI.
#[derive(Parser, Debug)]
#[command(
    name = "biohash",
    about = "biohash: token-seeded cancelable biometric templates",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a fresh random token (hex).
    Token {
        /// Number of random bytes (output is twice as many hex digits).
        #[arg(short, long, default_value_t = DEFAULT_TOKEN_BYTES)]
        bytes: usize,
    },

    /// Derive a template from a feature vector.
    Hash {
        /// Secret token (read from BIOHASH_TOKEN if omitted).
        #[arg(short, long, env = "BIOHASH_TOKEN", hide_env_values = true)]
        token: String,

        /// How to read the token. `int` and `float` derive the same matrix as
        /// the equal numeric token in the library.
        #[arg(long, value_enum, default_value_t = TokenKind::Text)]
        token_kind: TokenKind,

        /// JSON pipeline config file.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Adaptive threshold strategy: median, mean or zero.
        #[arg(short, long, conflicts_with = "threshold")]
        strategy: Option<String>,

        /// Fixed encoder threshold.
        #[arg(long)]
        threshold: Option<f64>,

        /// Feature values, separated by spaces or commas.
        #[arg(required = true, allow_negative_numbers = true, num_args = 1..)]
        features: Vec<String>,
    },

    /// Compare two templates and print the normalised difference.
    Compare {
        a: String,
        b: String,

        /// Acceptance threshold; prints MATCH / NO MATCH when given.
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum TokenKind {
    Text,
    Int,
    Float,
}

fn parse_token(raw: String, kind: TokenKind) -> Result<Token> {
    Ok(match kind {
        TokenKind::Text => Token::Text(raw),
        TokenKind::Int => Token::Integer(
            raw.trim()
                .parse::<i64>()
                .context("token is not a valid integer")?,
        ),
        TokenKind::Float => Token::Float(
            raw.trim()
                .parse::<f64>()
                .context("token is not a valid float")?,
        ),
    })
}

fn parse_features(raw: &[String]) -> Result<Vec<f64>> {
    raw.iter()
        .flat_map(|s| s.split(','))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<f64>()
                .with_context(|| format!("invalid feature value '{}'", s))
        })
        .collect()
}

fn run_hash(
    token: Token,
    config: Option<PathBuf>,
    strategy: Option<String>,
    threshold: Option<f64>,
    features: &[String],
) -> Result<()> {
    let mut cfg = match config {
        Some(path) => PipelineConfig::from_file(&path)?,
        None => PipelineConfig::default(),
    };
    if let Some(name) = strategy {
        let strategy: ThresholdStrategy = name.parse()?;
        cfg.encoder = BinaryEncoder::adaptive(strategy);
    }
    if let Some(t) = threshold {
        cfg.encoder = BinaryEncoder::threshold(t)?;
    }

    let values = parse_features(features)?;
    if values.is_empty() {
        bail!("no feature values given");
    }
    tracing::info!("Hashing {} features", values.len());

    let pipeline = Pipeline::from_config(token, &cfg)?;
    let features = ndarray::Array1::from_vec(values);
    let hash = match cfg.validation_threshold {
        Some(t) => BioHash::generate_with_threshold(&features, &pipeline, t)?,
        None => BioHash::generate_with_pipeline(&features, &pipeline)?,
    };
    println!("{}", hash);
    Ok(())
}

fn run_compare(a: &str, b: &str, threshold: Option<f64>) -> Result<()> {
    let a: BioHash = a.parse().context("first template")?;
    let b: BioHash = match threshold {
        Some(t) => BioHash::with_threshold(b, t).context("second template")?,
        None => b.parse().context("second template")?,
    };
    if a.len() != b.len() {
        tracing::warn!(
            "Template lengths differ ({} vs {}); shorter one is zero-padded",
            a.len(),
            b.len()
        );
    }
    let score = BioHash::compare(&a, &b);
    println!("{:.6}", score);
    if threshold.is_some() {
        println!("{}", if a.matches(&b) { "MATCH" } else { "NO MATCH" });
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    tracing::debug!("biohash v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Token { bytes } => {
            println!("{}", generate_token(bytes)?);
        }
        Command::Hash {
            token,
            token_kind,
            config,
            strategy,
            threshold,
            features,
        } => {
            let token = parse_token(token, token_kind)?;
            run_hash(token, config, strategy, threshold, &features)?
        }
        Command::Compare { a, b, threshold } => run_compare(&a, &b, threshold)?,
    }

    Ok(())
}
