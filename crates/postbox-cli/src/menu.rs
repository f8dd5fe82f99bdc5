//! Interactive console menu.
//!
//! Every action opens its own connection through [`Database::with_conn`]
//! and releases it before the next prompt.

use std::io::{BufRead, Write};

use anyhow::Result;
use tracing::warn;

use postbox_db::{Database, Message, User};

/// Whether the menu loop keeps going after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// Input ran out or the user chose to exit.
    Quit,
}

pub struct Console<'a, R, W> {
    db: &'a Database,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(db: &'a Database, input: R, output: W) -> Self {
        Self { db, input, output }
    }

    /// Show the main menu until the user exits or input ends.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "1. Manage users")?;
            writeln!(self.output, "2. Manage messages")?;
            writeln!(self.output, "0. Exit")?;

            let Some(choice) = self.prompt("Choose an option: ")? else {
                return Ok(());
            };

            let flow = match choice.trim() {
                "1" => self.users_menu()?,
                "2" => self.messages_menu()?,
                "0" => Flow::Quit,
                _ => {
                    writeln!(self.output, "Invalid option!")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Quit {
                return Ok(());
            }
        }
    }

    // -- Users --

    fn users_menu(&mut self) -> Result<Flow> {
        writeln!(self.output, "1. Add user")?;
        writeln!(self.output, "2. Modify user")?;
        writeln!(self.output, "3. Delete user")?;
        writeln!(self.output, "4. List users")?;
        writeln!(self.output, "5. Check password")?;
        writeln!(self.output, "0. Back to main menu")?;

        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(Flow::Quit);
        };

        match choice.trim() {
            "1" => self.add_user(),
            "2" => self.modify_user(),
            "3" => self.delete_user(),
            "4" => self.list_users(),
            "5" => self.check_user_password(),
            "0" => Ok(Flow::Continue),
            _ => {
                writeln!(self.output, "Invalid option!")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn add_user(&mut self) -> Result<Flow> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(Flow::Quit);
        };

        let mut user = User::new(username, &password);
        match self.db.with_conn(|conn| user.save(conn)) {
            Ok(()) => writeln!(self.output, "User added with ID {}.", user.id())?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn modify_user(&mut self) -> Result<Flow> {
        let Some(raw_id) = self.prompt("ID of the user to modify: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(username) = self.prompt("New username: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(password) = self.prompt("New password: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(id) = self.parse_id(&raw_id)? else {
            return Ok(Flow::Continue);
        };

        let outcome = self.db.with_conn(|conn| {
            let Some(mut user) = User::load_by_id(conn, id)? else {
                return Ok(false);
            };
            user.username = username;
            user.set_password(&password, Some(""));
            user.save(conn)?;
            Ok(true)
        });

        match outcome {
            Ok(true) => writeln!(self.output, "User updated.")?,
            Ok(false) => writeln!(self.output, "User not found.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn delete_user(&mut self) -> Result<Flow> {
        let Some(raw_id) = self.prompt("ID of the user to delete: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(id) = self.parse_id(&raw_id)? else {
            return Ok(Flow::Continue);
        };

        let outcome = self.db.with_conn(|conn| {
            let Some(mut user) = User::load_by_id(conn, id)? else {
                return Ok(false);
            };
            user.delete(conn)?;
            Ok(true)
        });

        match outcome {
            Ok(true) => writeln!(self.output, "User deleted.")?,
            Ok(false) => writeln!(self.output, "User not found.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn list_users(&mut self) -> Result<Flow> {
        match self.db.with_conn(User::load_all) {
            Ok(users) => {
                for user in users {
                    writeln!(self.output, "ID: {}, Username: {}", user.id(), user.username)?;
                }
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn check_user_password(&mut self) -> Result<Flow> {
        let Some(username) = self.prompt("Username: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(password) = self.prompt("Password: ")? else {
            return Ok(Flow::Quit);
        };

        match self.db.with_conn(|conn| User::load_by_username(conn, &username)) {
            Ok(Some(user)) if user.verify_password(&password) => {
                writeln!(self.output, "Password correct.")?
            }
            Ok(Some(_)) => writeln!(self.output, "Password incorrect.")?,
            Ok(None) => writeln!(self.output, "User not found.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    // -- Messages --

    fn messages_menu(&mut self) -> Result<Flow> {
        writeln!(self.output, "1. Send message")?;
        writeln!(self.output, "2. List messages")?;
        writeln!(self.output, "0. Back to main menu")?;

        let Some(choice) = self.prompt("Choose an option: ")? else {
            return Ok(Flow::Quit);
        };

        match choice.trim() {
            "1" => self.send_message(),
            "2" => self.list_messages(),
            "0" => Ok(Flow::Continue),
            _ => {
                writeln!(self.output, "Invalid option!")?;
                Ok(Flow::Continue)
            }
        }
    }

    fn send_message(&mut self) -> Result<Flow> {
        let Some(raw_from) = self.prompt("Your ID: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(raw_to) = self.prompt("Recipient ID: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(text) = self.prompt("Message: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(from_id) = self.parse_id(&raw_from)? else {
            return Ok(Flow::Continue);
        };
        let Some(to_id) = self.parse_id(&raw_to)? else {
            return Ok(Flow::Continue);
        };

        let mut message = Message::new(from_id, to_id, text);
        match self.db.with_conn(|conn| message.save(conn)) {
            Ok(()) => writeln!(self.output, "Message sent.")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn list_messages(&mut self) -> Result<Flow> {
        match self.db.with_conn(Message::load_all) {
            Ok(messages) => {
                for msg in messages {
                    writeln!(
                        self.output,
                        "From: {}, To: {}, Text: {}, Date: {}",
                        msg.from_id,
                        msg.to_id,
                        msg.text,
                        msg.creation_date.format("%Y-%m-%d %H:%M:%S")
                    )?;
                }
            }
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    // -- Helpers --

    /// Print a prompt and read one line. `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim_end_matches(['\r', '\n']).len();
        line.truncate(trimmed);
        Ok(Some(line))
    }

    fn parse_id(&mut self, raw: &str) -> Result<Option<i64>> {
        match raw.trim().parse::<i64>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "Invalid number: {}", raw)?;
                Ok(None)
            }
        }
    }

    fn report(&mut self, err: &postbox_db::Error) -> Result<()> {
        warn!(error = %err, "Storage operation failed");

        if err.is_unique_violation() {
            writeln!(self.output, "That username is already taken.")?;
        } else if err.is_foreign_key_violation() {
            writeln!(
                self.output,
                "Referenced user does not exist, or the user still has messages."
            )?;
        } else {
            writeln!(self.output, "error: {}", err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postbox_db::DbConfig;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig {
            path: dir.path().join("menu.db"),
        });
        db.init().unwrap();
        (dir, db)
    }

    fn run_script(db: &Database, script: &str) -> String {
        let mut out = Vec::new();
        Console::new(db, script.as_bytes(), &mut out).run().unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn add_then_list_users() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n1\nalice\npw1\n1\n4\n0\n");

        assert!(out.contains("User added with ID 1."));
        assert!(out.contains("ID: 1, Username: alice"));
    }

    #[test]
    fn stored_password_is_hashed() {
        let (_dir, db) = setup();
        run_script(&db, "1\n1\nalice\npw1\n0\n");

        let user = db
            .with_conn(|conn| User::load_by_username(conn, "alice"))
            .unwrap()
            .unwrap();
        assert_ne!(user.hashed_password(), "pw1");
        assert!(user.hashed_password().starts_with("aaaaaaaaaaaaaaaa"));
        assert!(user.verify_password("pw1"));
    }

    #[test]
    fn duplicate_username_is_reported() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n1\nbob\na\n1\n1\nbob\nb\n0\n");
        assert!(out.contains("That username is already taken."));
    }

    #[test]
    fn modify_then_check_password() {
        let (_dir, db) = setup();
        let out = run_script(
            &db,
            "1\n1\nalice\npw1\n1\n2\n1\nalicia\npw2\n1\n5\nalicia\npw2\n1\n5\nalicia\npw1\n0\n",
        );

        assert!(out.contains("User updated."));
        let user = db
            .with_conn(|conn| User::load_by_username(conn, "alicia"))
            .unwrap()
            .unwrap();
        assert!(user.hashed_password().starts_with("aaaaaaaaaaaaaaaa"));
        assert!(out.contains("Password correct."));
        assert!(out.contains("Password incorrect."));
    }

    #[test]
    fn delete_user_and_missing_user() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n1\ncarol\npw\n1\n3\n1\n1\n3\n1\n0\n");

        assert!(out.contains("User deleted."));
        assert!(out.contains("User not found."));
        assert!(db.with_conn(User::load_all).unwrap().is_empty());
    }

    #[test]
    fn non_numeric_id_is_rejected() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n3\nabc\n0\n");
        assert!(out.contains("Invalid number: abc"));
    }

    #[test]
    fn send_and_list_messages() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n1\na\npw\n1\n1\nb\npw\n2\n1\n1\n2\nhi there\n2\n2\n0\n");

        assert!(out.contains("Message sent."));
        assert!(out.contains("From: 1, To: 2, Text: hi there, Date: "));
    }

    #[test]
    fn message_to_unknown_user_is_reported() {
        let (_dir, db) = setup();
        let out = run_script(&db, "1\n1\na\npw\n2\n1\n1\n42\nhello?\n0\n");

        assert!(out.contains("Referenced user does not exist"));
        assert!(db.with_conn(Message::load_all).unwrap().is_empty());
    }

    #[test]
    fn invalid_option_keeps_running() {
        let (_dir, db) = setup();
        let out = run_script(&db, "9\n1\n7\n0\n");
        assert_eq!(out.matches("Invalid option!").count(), 2);
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let (_dir, db) = setup();
        run_script(&db, "");
        run_script(&db, "1\n1\nhalf");
    }
}
