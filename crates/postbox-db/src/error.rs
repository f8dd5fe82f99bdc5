use rusqlite::ErrorCode;
use rusqlite::ffi;
use thiserror::Error;

/// Storage errors. SQLite failures pass through untouched; the helpers
/// below only classify them.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error("failed to prepare database directory: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Any constraint failure: unique, foreign key, check or not-null.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Error::Sqlite(rusqlite::Error::SqliteFailure(e, _))
                if e.code == ErrorCode::ConstraintViolation
        )
    }

    /// Duplicate value in a unique column, e.g. an existing username.
    pub fn is_unique_violation(&self) -> bool {
        self.extended_code() == Some(ffi::SQLITE_CONSTRAINT_UNIQUE)
    }

    /// Reference to a missing user, or removal of a user still referenced.
    pub fn is_foreign_key_violation(&self) -> bool {
        self.extended_code() == Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY)
    }

    fn extended_code(&self) -> Option<i32> {
        match self {
            Error::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => Some(e.extended_code),
            _ => None,
        }
    }
}
