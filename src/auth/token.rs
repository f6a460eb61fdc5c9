//! Opaque bearer tokens: random bytes handed to the client once, with only
//! their SHA-256 hash ever persisted.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Lower bound on token entropy, in bytes.
pub const MIN_BYTES_PER_TOKEN: usize = 32;

#[derive(Debug, Clone)]
pub struct Token {
    pub token: String,
    pub token_hash: String,
}

/// Generate a new token of at least [`MIN_BYTES_PER_TOKEN`] random bytes.
pub fn new_token(bytes_per_token: usize) -> Token {
    let token = random_string(bytes_per_token.max(MIN_BYTES_PER_TOKEN));
    let token_hash = hash(&token);
    Token { token, token_hash }
}

/// URL-safe base64 of `n` random bytes.
pub fn random_string(n: usize) -> String {
    let mut bytes = vec![0u8; n];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// URL-safe base64 of the SHA-256 digest of `token`.
pub fn hash(token: &str) -> String {
    URL_SAFE.encode(Sha256::digest(token.as_bytes()))
}
