use base64::{engine::general_purpose::URL_SAFE, Engine};
use rand::{rngs::OsRng, RngCore};

pub const REMEMBER_TOKEN_BYTES: usize = 32;

/// `n` bytes from the operating system CSPRNG.
pub fn bytes(n: usize) -> Result<Vec<u8>, rand::Error> {
    let mut buf = vec![0u8; n];
    OsRng.try_fill_bytes(&mut buf)?;
    Ok(buf)
}

/// `n_bytes` random bytes, URL-safe base64 encoded.
pub fn string(n_bytes: usize) -> Result<String, rand::Error> {
    Ok(URL_SAFE.encode(bytes(n_bytes)?))
}

pub fn remember_token() -> Result<String, rand::Error> {
    string(REMEMBER_TOKEN_BYTES)
}

/// Number of raw bytes behind an encoded token.
pub fn n_bytes(encoded: &str) -> Result<usize, base64::DecodeError> {
    Ok(URL_SAFE.decode(encoded)?.len())
}
