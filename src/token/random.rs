//! Cryptographically random token issuance.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{BioHashError, Result};

/// Generate a fresh token: `size` bytes from the OS CSPRNG, hex-encoded.
///
/// The returned string is `2 * size` characters long and is accepted as a
/// [`Token::Text`](super::Token::Text).
pub fn generate_token(size: usize) -> Result<String> {
    if size == 0 {
        return Err(BioHashError::InvalidToken {
            reason: "token size must be > 0 bytes".to_string(),
        });
    }
    let mut bytes = vec![0u8; size];
    OsRng.fill_bytes(&mut bytes);
    Ok(hex::encode(bytes))
}
