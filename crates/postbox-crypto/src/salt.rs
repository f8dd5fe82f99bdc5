use rand::Rng;

/// Number of characters in every salt used for hashing.
pub const SALT_LEN: usize = 16;

/// Character used to right-pad salts shorter than [`SALT_LEN`].
pub const SALT_FILLER: char = 'a';

/// The 62 symbols a generated salt is drawn from.
pub const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a random 16-character salt over [`ALPHABET`].
pub fn generate_salt() -> String {
    let mut rng = rand::rng();
    (0..SALT_LEN)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Bring a salt to exactly [`SALT_LEN`] characters: keep the first 16,
/// or pad on the right with [`SALT_FILLER`].
pub fn normalize_salt(salt: &str) -> String {
    let mut normalized: String = salt.chars().take(SALT_LEN).collect();
    let missing = SALT_LEN - normalized.chars().count();
    normalized.extend(std::iter::repeat_n(SALT_FILLER, missing));
    normalized
}
