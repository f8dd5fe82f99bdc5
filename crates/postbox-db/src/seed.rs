use rand::seq::IndexedRandom;
use rusqlite::Connection;
use tracing::info;

use crate::Result;
use crate::models::{Message, User};

/// What a call to [`seed`] inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub users: usize,
    pub messages: usize,
}

/// Fill the database with demo data: `count` users `user{i}` / `password{i}`
/// and `count` messages between randomly picked users from that batch.
pub fn seed(conn: &Connection, count: usize) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let mut ids = Vec::with_capacity(count);

    for i in 0..count {
        let mut user = User::with_random_salt(format!("user{i}"), &format!("password{i}"));
        user.save(conn)?;
        ids.extend(user.id().id());
        report.users += 1;
    }

    let mut rng = rand::rng();
    for i in 0..count {
        let (Some(&from_id), Some(&to_id)) = (ids.choose(&mut rng), ids.choose(&mut rng)) else {
            break;
        };
        Message::new(from_id, to_id, format!("message text {i}")).save(conn)?;
        report.messages += 1;
    }

    info!(users = report.users, messages = report.messages, "Demo data inserted");
    Ok(report)
}
