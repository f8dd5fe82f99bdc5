//! In-memory entities. Both track whether they have a row yet through
//! [`Identity`]; persistence lives in `queries.rs`.

use std::fmt;

use chrono::{DateTime, Utc};
use postbox_crypto::{check_password, hash_password};

/// Storage identity of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Identity {
    /// Never inserted, or deleted since.
    #[default]
    Unsaved,
    /// Key generated by the database on insert.
    Persisted(i64),
}

impl Identity {
    pub fn id(self) -> Option<i64> {
        match self {
            Identity::Unsaved => None,
            Identity::Persisted(id) => Some(id),
        }
    }

    pub fn is_persisted(self) -> bool {
        matches!(self, Identity::Persisted(_))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Identity::Unsaved => write!(f, "unsaved"),
            Identity::Persisted(id) => write!(f, "{}", id),
        }
    }
}

/// A user account. Only the salted hash of the password is kept.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) id: Identity,
    pub username: String,
    pub(crate) hashed_password: String,
}

impl User {
    /// New unsaved user hashed with the default empty salt, which pads to
    /// `aaaaaaaaaaaaaaaa`.
    pub fn new(username: impl Into<String>, password: &str) -> Self {
        Self::with_salt(username, password, "")
    }

    /// New unsaved user with a freshly generated salt.
    pub fn with_random_salt(username: impl Into<String>, password: &str) -> Self {
        Self {
            id: Identity::Unsaved,
            username: username.into(),
            hashed_password: hash_password(password, None),
        }
    }

    /// New unsaved user hashed with an explicit salt. The salt is cut or
    /// padded to 16 characters, so an empty salt becomes `aaaaaaaaaaaaaaaa`.
    pub fn with_salt(username: impl Into<String>, password: &str, salt: &str) -> Self {
        Self {
            id: Identity::Unsaved,
            username: username.into(),
            hashed_password: hash_password(password, Some(salt)),
        }
    }

    pub(crate) fn from_row(id: i64, username: String, hashed_password: String) -> Self {
        Self {
            id: Identity::Persisted(id),
            username,
            hashed_password,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }

    pub fn hashed_password(&self) -> &str {
        &self.hashed_password
    }

    /// Replace the stored hash. `Some("")` is the default padded salt, `None`
    /// generates one. Identity is left alone; call `save` to persist.
    pub fn set_password(&mut self, password: &str, salt: Option<&str>) {
        self.hashed_password = hash_password(password, salt);
    }

    pub fn verify_password(&self, candidate: &str) -> bool {
        check_password(candidate, &self.hashed_password)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("hashed_password", &"[REDACTED]")
            .finish()
    }
}

/// A text message between two users. `from_id` and `to_id` are plain user
/// keys; the database checks that they exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub(crate) id: Identity,
    pub from_id: i64,
    pub to_id: i64,
    pub text: String,
    pub creation_date: DateTime<Utc>,
}

impl Message {
    /// New unsaved message stamped with the current time.
    pub fn new(from_id: i64, to_id: i64, text: impl Into<String>) -> Self {
        Self::with_creation_date(from_id, to_id, text, Utc::now())
    }

    pub fn with_creation_date(
        from_id: i64,
        to_id: i64,
        text: impl Into<String>,
        creation_date: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Identity::Unsaved,
            from_id,
            to_id,
            text: text.into(),
            creation_date,
        }
    }

    pub fn id(&self) -> Identity {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postbox_crypto::{HASHED_LEN, SALT_LEN};

    #[test]
    fn new_user_is_unsaved_and_hashed() {
        let user = User::new("alice", "pw1");
        assert_eq!(user.id(), Identity::Unsaved);
        assert_eq!(user.hashed_password().len(), HASHED_LEN);
        assert_ne!(user.hashed_password(), "pw1");
        assert!(user.verify_password("pw1"));
    }

    #[test]
    fn default_salt_is_empty_and_padded() {
        let user = User::new("alice", "pw1");
        assert_eq!(&user.hashed_password()[..SALT_LEN], "aaaaaaaaaaaaaaaa");
        assert_eq!(user.hashed_password(), hash_password("pw1", Some("")));
        assert!(user.verify_password("pw1"));

        let mut user = user;
        user.set_password("pw2", Some(""));
        assert_eq!(&user.hashed_password()[..SALT_LEN], "aaaaaaaaaaaaaaaa");
        assert!(user.verify_password("pw2"));
    }

    #[test]
    fn random_salt_constructor_differs_per_user() {
        let a = User::with_random_salt("a", "same");
        let b = User::with_random_salt("b", "same");
        assert_ne!(a.hashed_password(), b.hashed_password());
        assert!(a.verify_password("same") && b.verify_password("same"));
    }

    #[test]
    fn empty_salt_is_padded() {
        let user = User::with_salt("bob", "pw", "");
        assert_eq!(&user.hashed_password()[..SALT_LEN], "aaaaaaaaaaaaaaaa");
    }

    #[test]
    fn set_password_replaces_hash_only() {
        let mut user = User::from_row(7, "dave".into(), hash_password("old", None));
        user.set_password("new", Some("0123456789abcdef"));

        assert_eq!(user.id(), Identity::Persisted(7));
        assert!(user.hashed_password().starts_with("0123456789abcdef"));
        assert!(user.verify_password("new"));
        assert!(!user.verify_password("old"));
    }

    #[test]
    fn debug_hides_hash() {
        let user = User::with_salt("eve", "pw", "visible-salt");
        let out = format!("{:?}", user);
        assert!(out.contains("eve"));
        assert!(!out.contains(user.hashed_password()));
    }

    #[test]
    fn message_defaults_to_now() {
        let before = Utc::now();
        let message = Message::new(1, 2, "hi");
        let after = Utc::now();

        assert_eq!(message.id(), Identity::Unsaved);
        assert!(message.creation_date >= before && message.creation_date <= after);
    }

    #[test]
    fn identity_accessors() {
        assert_eq!(Identity::Unsaved.id(), None);
        assert!(!Identity::Unsaved.is_persisted());
        assert_eq!(Identity::Persisted(3).id(), Some(3));
        assert!(Identity::Persisted(3).is_persisted());
        assert_eq!(Identity::Persisted(3).to_string(), "3");
    }
}
