mod menu;

use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use postbox_db::{DEFAULT_DB_PATH, Database, DbConfig, seed};

use crate::menu::Console;

#[derive(Parser, Debug)]
#[command(name = "postbox")]
#[command(version, about = "Console messaging between local users", long_about = None)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "POSTBOX_DB_PATH", default_value = DEFAULT_DB_PATH)]
    db: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Interactive menu (the default)
    Menu,
    /// Create the users and messages tables
    Init,
    /// Insert demo users and messages
    Seed {
        #[arg(long, default_value_t = 30)]
        count: usize,
    },
}

fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Logs go to stderr so they stay out of the menu
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let db = Database::new(DbConfig { path: cli.db });
    info!("Using database {}", db.config().path.display());

    db.init()?;

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let stdin = io::stdin();
            Console::new(&db, stdin.lock(), io::stdout()).run()?;
        }
        Command::Init => {
            println!("Tables ready in {}", db.config().path.display());
        }
        Command::Seed { count } => {
            let report = db.with_conn(|conn| seed::seed(conn, count))?;
            println!(
                "Inserted {} users and {} messages.",
                report.users, report.messages
            );
        }
    }

    Ok(())
}
