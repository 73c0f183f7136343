//! User-specific secret tokens.
//!
//! A token is the only secret in the scheme: it seeds the orthonormal mixing
//! matrix. Revoking a template means issuing a new token. Storage and rotation
//! of tokens happen outside this crate.

pub mod random;
pub mod secret;

pub use random::generate_token;
pub use secret::Token;
