use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            username         TEXT NOT NULL UNIQUE CHECK (length(username) <= 255),
            hashed_password  TEXT NOT NULL CHECK (length(hashed_password) <= 80)
        );

        CREATE TABLE IF NOT EXISTS messages (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            from_id        INTEGER NOT NULL REFERENCES users(id),
            to_id          INTEGER NOT NULL REFERENCES users(id),
            creation_date  TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            text           TEXT NOT NULL CHECK (length(text) <= 255)
        );
        ",
    )?;

    info!("Database schema ready");
    Ok(())
}
