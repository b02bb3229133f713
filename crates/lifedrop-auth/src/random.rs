//! CSPRNG helpers for opaque tokens, one-time codes, and digests.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE;
use rand::{Rng, RngExt};
use sha2::{Digest, Sha256};

const OPAQUE_TOKEN_BYTES: usize = 32;
const OTP_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Returns a URL-safe base64 opaque token from 32 crypto-random bytes.
///
/// Used for refresh tokens; the output is cryptographically unrelated to
/// any signed token issued alongside it.
pub fn rand_token() -> String {
    let mut bytes = [0u8; OPAQUE_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE.encode(bytes)
}

/// Returns an `n`-character string of random uppercase letters and digits.
pub fn rand_chars(n: usize) -> String {
    let mut rng = rand::rng();
    (0..n)
        .map(|_| OTP_CHARSET[rng.random_range(0..OTP_CHARSET.len())] as char)
        .collect()
}

/// Returns the SHA-256 hex digest of the input.
pub fn sha256_hex(input: &str) -> String {
    let digest = Sha256::digest(input.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Checks an input against a stored SHA-256 hex digest in constant time.
pub fn verify_sha256(input: &str, digest: &str) -> bool {
    constant_time_eq(sha256_hex(input).as_bytes(), digest.as_bytes())
}

/// Compares two byte slices without early exit.
///
/// The comparison touches every byte of both inputs so that the running
/// time depends only on the slice length, not on the position of the
/// first mismatch.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (left, right) in a.iter().zip(b.iter()) {
        diff |= left ^ right;
    }
    diff == 0
}
