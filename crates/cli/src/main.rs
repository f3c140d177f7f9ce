//! mysite CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply schema migrations (and create the session table)
//! mysite-cli migrate
//!
//! # Create a user
//! mysite-cli user create alice --password 'correct horse' --staff
//!
//! # Grant a permission
//! mysite-cli user grant alice shop.view_order
//!
//! # Load users, products and orders from a JSON document
//! mysite-cli fixtures load fixtures.json
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` / `user grant` - Manage users
//! - `fixtures load` - Load fixture data

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "mysite-cli")]
#[command(author, version, about = "mysite CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load fixture data
    Fixtures {
        #[command(subcommand)]
        action: FixturesAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user and their profile
    Create {
        /// Login name
        username: String,

        /// Initial password (falls back to `MYSITE_USER_PASSWORD`)
        #[arg(short, long)]
        password: Option<String>,

        /// Mark the user as staff
        #[arg(long)]
        staff: bool,

        /// Mark the user as superuser
        #[arg(long)]
        superuser: bool,
    },
    /// Grant a permission codename (e.g. `shop.view_order`)
    Grant {
        username: String,
        permission: String,
    },
}

#[derive(Subcommand)]
enum FixturesAction {
    /// Load a JSON fixture document
    Load {
        /// Path to the JSON file
        file: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                password,
                staff,
                superuser,
            } => {
                commands::user::create(&username, password, staff, superuser).await?;
            }
            UserAction::Grant {
                username,
                permission,
            } => commands::user::grant(&username, &permission).await?,
        },
        Commands::Fixtures { action } => match action {
            FixturesAction::Load { file } => commands::fixtures::load(&file).await?,
        },
    }
    Ok(())
}
