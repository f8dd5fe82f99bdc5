use rusqlite::{Connection, OptionalExtension, Row};
use tracing::debug;

use crate::Result;
use crate::models::{Identity, Message, User};

impl User {
    /// Insert when unsaved (adopting the generated id), update otherwise.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        match self.id {
            Identity::Unsaved => {
                let id: i64 = conn.query_row(
                    "INSERT INTO users (username, hashed_password) VALUES (?1, ?2) RETURNING id",
                    (&self.username, &self.hashed_password),
                    |row| row.get(0),
                )?;
                self.id = Identity::Persisted(id);
                debug!(user_id = id, "User inserted");
            }
            Identity::Persisted(id) => {
                let updated = conn.execute(
                    "UPDATE users SET username = ?1, hashed_password = ?2 WHERE id = ?3",
                    rusqlite::params![self.username, self.hashed_password, id],
                )?;
                debug!(user_id = id, rows = updated, "User updated");
            }
        }
        Ok(())
    }

    pub fn load_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, username, hashed_password FROM users WHERE id = ?1",
                [id],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    pub fn load_by_username(conn: &Connection, username: &str) -> Result<Option<User>> {
        let user = conn
            .query_row(
                "SELECT id, username, hashed_password FROM users WHERE username = ?1",
                [username],
                user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    /// Every user, in whatever order the database returns them.
    pub fn load_all(conn: &Connection) -> Result<Vec<User>> {
        let mut stmt = conn.prepare("SELECT id, username, hashed_password FROM users")?;
        let users = stmt
            .query_map([], user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    /// Remove the row and forget the id. A user that was never saved is left as is.
    pub fn delete(&mut self, conn: &Connection) -> Result<()> {
        let Identity::Persisted(id) = self.id else {
            return Ok(());
        };

        conn.execute("DELETE FROM users WHERE id = ?1", [id])?;
        self.id = Identity::Unsaved;
        debug!(user_id = id, "User deleted");
        Ok(())
    }
}

impl Message {
    /// Insert when unsaved, update otherwise. `creation_date` is written as
    /// held, never regenerated.
    pub fn save(&mut self, conn: &Connection) -> Result<()> {
        match self.id {
            Identity::Unsaved => {
                let id: i64 = conn.query_row(
                    "INSERT INTO messages (from_id, to_id, text, creation_date)
                     VALUES (?1, ?2, ?3, ?4) RETURNING id",
                    rusqlite::params![self.from_id, self.to_id, self.text, self.creation_date],
                    |row| row.get(0),
                )?;
                self.id = Identity::Persisted(id);
                debug!(message_id = id, from_id = self.from_id, to_id = self.to_id, "Message inserted");
            }
            Identity::Persisted(id) => {
                let updated = conn.execute(
                    "UPDATE messages SET from_id = ?1, to_id = ?2, text = ?3, creation_date = ?4
                     WHERE id = ?5",
                    rusqlite::params![self.from_id, self.to_id, self.text, self.creation_date, id],
                )?;
                debug!(message_id = id, rows = updated, "Message updated");
            }
        }
        Ok(())
    }

    pub fn load_by_id(conn: &Connection, id: i64) -> Result<Option<Message>> {
        let message = conn
            .query_row(
                "SELECT id, from_id, to_id, text, creation_date FROM messages WHERE id = ?1",
                [id],
                message_from_row,
            )
            .optional()?;
        Ok(message)
    }

    /// Every message from every user. No ordering is applied.
    pub fn load_all(conn: &Connection) -> Result<Vec<Message>> {
        let mut stmt =
            conn.prepare("SELECT id, from_id, to_id, text, creation_date FROM messages")?;
        let messages = stmt
            .query_map([], message_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(messages)
    }
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User::from_row(row.get(0)?, row.get(1)?, row.get(2)?))
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<Message> {
    Ok(Message {
        id: Identity::Persisted(row.get(0)?),
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        text: row.get(3)?,
        creation_date: row.get(4)?,
    })
}
