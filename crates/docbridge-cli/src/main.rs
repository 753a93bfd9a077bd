//! docbridge CLI - drive the sample user model from the shell
//!
//! Usage:
//!   docbridge insert-user          Insert the sample user
//!   docbridge update-user          Replace the home phone of the first user aged 30
//!   docbridge list-users           Print every user as JSON
//!   docbridge remove-all           Delete every user
//!   docbridge ping                 Check that the server answers
//!
//! Connection settings come from --uri, --config <file.toml>, or the
//! DOCBRIDGE_MONGODB_URI / MONGODB_URI environment variables.

mod user;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docbridge_mongodb::bson::Bson;
use docbridge_mongodb::{Connection, ConnectionConfig, ConnectionRegistry};
use std::path::PathBuf;

use user::UserModel;

#[derive(Parser)]
#[command(name = "docbridge")]
#[command(about = "docbridge sample user model", long_about = None)]
#[command(version)]
struct Cli {
    /// MongoDB connection string (overrides the environment)
    #[arg(long, global = true)]
    uri: Option<String>,

    /// TOML file with connection settings
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Database to use instead of the model's default
    #[arg(long, global = true)]
    database: Option<String>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Insert the sample user
    InsertUser,
    /// Replace the second phone of the first user aged 30
    UpdateUser,
    /// Print every user as JSON
    ListUsers,
    /// Delete every user by _id
    RemoveAll,
    /// Check that the server answers
    Ping,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let connection = connect(&cli).await?;

    match cli.command {
        Commands::Ping => {
            connection.ping().await?;
            println!("ok");
        }
        Commands::InsertUser => {
            let users = UserModel::new(connection, cli.database);
            let result = users.insert_user().await?;
            println!("inserted {}", result.inserted_count);
        }
        Commands::UpdateUser => {
            let users = UserModel::new(connection, cli.database);
            let result = users.update_user().await?;
            println!("matched {} modified {}", result.matched_count, result.modified_count);
        }
        Commands::ListUsers => {
            let users = UserModel::new(connection, cli.database);
            for user in users.get_all_users().await? {
                let json = Bson::Document(user).into_relaxed_extjson();
                println!("{}", serde_json::to_string(&json)?);
            }
        }
        Commands::RemoveAll => {
            let users = UserModel::new(connection, cli.database);
            let removed = users.remove_all().await?;
            println!("removed {}", removed);
        }
    }

    Ok(())
}

/// Explicit settings get their own connection; otherwise use the shared one
async fn connect(cli: &Cli) -> Result<Connection> {
    let connection = match resolve_config(cli)? {
        Some(config) => Connection::connect(config).await?,
        None => ConnectionRegistry::get_instance().await?,
    };
    Ok(connection)
}

/// Settings from `--config` and `--uri`, validated after `--uri` is applied
fn resolve_config(cli: &Cli) -> Result<Option<ConnectionConfig>> {
    let config = match (&cli.config, &cli.uri) {
        (Some(path), uri) => {
            let mut config = ConnectionConfig::load_file(path)
                .with_context(|| format!("loading {}", path.display()))?;
            if let Some(uri) = uri {
                config.uri = uri.clone();
            }
            config
        }
        (None, Some(uri)) => ConnectionConfig::new(uri.clone()),
        (None, None) => return Ok(None),
    };
    config.validate()?;
    Ok(Some(config))
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .try_init()
        .ok(); // Ignore error if already initialized
}
