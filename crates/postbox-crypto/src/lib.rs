//! Postbox Crypto Library
//!
//! Salted SHA-256 credential hashing. A stored credential is the 16-character
//! salt followed by the lowercase hex digest of `salt || password`, so
//! verification needs nothing but the stored string itself.

pub mod hash;
pub mod salt;

pub use hash::{DIGEST_HEX_LEN, HASHED_LEN, check_password, hash_password, split_hashed};
pub use salt::{ALPHABET, SALT_FILLER, SALT_LEN, generate_salt, normalize_salt};
