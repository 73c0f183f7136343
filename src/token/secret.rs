//! Token value and deterministic seed derivation.
//!
//! seed = SHA-256("biohash/token/v1" ‖ tag ‖ canonical bytes ‖ attempt?)
//!
//! Integral floats canonicalise to the equal integer so `Token::Integer(7)` and
//! `Token::Float(7.0)` derive the same matrix.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::error::{BioHashError, Result};

const SEED_DOMAIN: &[u8] = b"biohash/token/v1";

const TAG_INTEGER: u8 = 0x01;
const TAG_FLOAT: u8 = 0x02;
const TAG_TEXT: u8 = 0x03;

/// A secret token. Never logged: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq)]
pub enum Token {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Token {
    /// 32-byte seed for the matrix PRNG.
    pub fn seed(&self) -> Result<[u8; 32]> {
        self.seed_for_attempt(0)
    }

    /// Seed perturbed by a retry attempt index. Attempt 0 is the plain seed.
    pub fn seed_for_attempt(&self, attempt: u32) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        hasher.update(SEED_DOMAIN);
        match self.canonical()? {
            Canonical::Integer(v) => {
                hasher.update([TAG_INTEGER]);
                hasher.update(v.to_le_bytes());
            }
            Canonical::Float(bits) => {
                hasher.update([TAG_FLOAT]);
                hasher.update(bits.to_le_bytes());
            }
            Canonical::Text(s) => {
                hasher.update([TAG_TEXT]);
                hasher.update((s.len() as u64).to_le_bytes());
                hasher.update(s.as_bytes());
            }
        }
        if attempt > 0 {
            hasher.update(b"retry");
            hasher.update(attempt.to_le_bytes());
        }
        Ok(hasher.finalize().into())
    }

    fn canonical(&self) -> Result<Canonical<'_>> {
        match self {
            Token::Integer(v) => Ok(Canonical::Integer(*v)),
            Token::Float(v) => {
                if !v.is_finite() {
                    return Err(BioHashError::InvalidToken {
                        reason: "float token must be finite".to_string(),
                    });
                }
                // i64::MIN..2^63 round-trips exactly for integral floats in range.
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v < i64::MAX as f64 {
                    Ok(Canonical::Integer(*v as i64))
                } else {
                    Ok(Canonical::Float(v.to_bits()))
                }
            }
            Token::Text(s) => Ok(Canonical::Text(s)),
        }
    }
}

enum Canonical<'a> {
    Integer(i64),
    Float(u64),
    Text(&'a str),
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Token::Integer(_) => "Integer",
            Token::Float(_) => "Float",
            Token::Text(_) => "Text",
        };
        write!(f, "Token::{}(<redacted>)", kind)
    }
}

impl From<i64> for Token {
    fn from(v: i64) -> Self {
        Token::Integer(v)
    }
}

impl From<i32> for Token {
    fn from(v: i32) -> Self {
        Token::Integer(v as i64)
    }
}

impl From<f64> for Token {
    fn from(v: f64) -> Self {
        Token::Float(v)
    }
}

impl From<&str> for Token {
    fn from(v: &str) -> Self {
        Token::Text(v.to_string())
    }
}

impl From<String> for Token {
    fn from(v: String) -> Self {
        Token::Text(v)
    }
}

impl From<&Token> for Token {
    fn from(v: &Token) -> Self {
        v.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_is_deterministic() {
        let t = Token::from("correct horse battery staple");
        assert_eq!(t.seed().unwrap(), t.seed().unwrap());
    }

    #[test]
    fn test_distinct_tokens_distinct_seeds() {
        let a = Token::from("alpha").seed().unwrap();
        let b = Token::from("beta").seed().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_integral_float_matches_integer() {
        let i = Token::from(42_i64).seed().unwrap();
        let f = Token::from(42.0).seed().unwrap();
        assert_eq!(i, f);
        assert_ne!(Token::from(42.5).seed().unwrap(), i);
    }

    #[test]
    fn test_text_and_integer_do_not_collide() {
        let i = Token::from(42_i64).seed().unwrap();
        let s = Token::from("42").seed().unwrap();
        assert_ne!(i, s);
    }

    #[test]
    fn test_nan_token_rejected() {
        let err = Token::from(f64::NAN).seed().unwrap_err();
        assert!(matches!(err, BioHashError::InvalidToken { .. }));
    }

    #[test]
    fn test_attempt_perturbs_seed() {
        let t = Token::from(7_i64);
        assert_eq!(t.seed().unwrap(), t.seed_for_attempt(0).unwrap());
        assert_ne!(t.seed().unwrap(), t.seed_for_attempt(1).unwrap());
    }

    #[test]
    fn test_debug_is_redacted() {
        let t = Token::from("hunter2");
        let dbg = format!("{:?}", t);
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("redacted"));
    }
}
