use sha2::{Digest, Sha256};

use crate::salt::{SALT_LEN, generate_salt, normalize_salt};

/// Length of the hex-encoded SHA-256 digest.
pub const DIGEST_HEX_LEN: usize = 64;

/// Length of a complete hashed credential: salt followed by digest.
pub const HASHED_LEN: usize = SALT_LEN + DIGEST_HEX_LEN;

/// Hash a password with the given salt, or a freshly generated one.
/// Returns `salt || hex(sha256(salt || password))`.
pub fn hash_password(password: &str, salt: Option<&str>) -> String {
    let salt = match salt {
        Some(salt) => normalize_salt(salt),
        None => generate_salt(),
    };

    let digest = digest_hex(&salt, password);
    salt + &digest
}

/// Verify a candidate password against a stored hashed credential.
/// Malformed stored values simply fail verification.
pub fn check_password(candidate: &str, stored: &str) -> bool {
    let Some((salt, digest)) = split_hashed(stored) else {
        return false;
    };

    digest_hex(salt, candidate) == digest
}

/// Split a stored credential into its salt and digest parts.
/// Returns `None` when it holds fewer than [`SALT_LEN`] characters.
pub fn split_hashed(stored: &str) -> Option<(&str, &str)> {
    match stored.char_indices().nth(SALT_LEN) {
        Some((idx, _)) => Some(stored.split_at(idx)),
        None if stored.chars().count() == SALT_LEN => Some((stored, "")),
        None => None,
    }
}

fn digest_hex(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}
