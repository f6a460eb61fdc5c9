use axum_extra::extract::cookie::Key;
use hkdf::Hkdf;
use sha2::Sha256;
use subtle::ConstantTimeEq;

const HKDF_SALT: &[u8] = b"picturebook-v1";
const HKDF_INFO: &[u8] = b"private-cookie-key";

/// Derive the 64-byte private cookie key from the configured secret.
pub fn derive_cookie_key(secret: &str) -> Key {
    let hk = Hkdf::<Sha256>::new(Some(HKDF_SALT), secret.as_bytes());
    let mut okm = [0u8; 64];
    hk.expand(HKDF_INFO, &mut okm)
        .expect("64 bytes is a valid HKDF-SHA256 output length");
    Key::from(&okm[..])
}

/// Compare two secrets without leaking where they differ.
pub fn constant_time_eq(a: &str, b: &str) -> bool {
    a.as_bytes().ct_eq(b.as_bytes()).into()
}
