//! Wayfarer CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations
//! wf-cli migrate
//!
//! # Create a user (password from WAYFARER_NEW_USER_PASSWORD or stdin)
//! wf-cli user create -e ana@example.com -n "Ana" --admin
//!
//! # Change a user's role
//! wf-cli user promote -e ana@example.com
//! wf-cli user demote -e ana@example.com
//!
//! # Load a small demo trip
//! wf-cli seed demo
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wf-cli")]
#[command(author, version, about = "Wayfarer CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Load sample data
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a user with a password
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Give the user the admin role
        #[arg(long)]
        admin: bool,
    },
    /// Give a user the admin role
    Promote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
    /// Take the admin role away
    Demote {
        /// Email address
        #[arg(short, long)]
        email: String,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Three travellers sharing one trip and one expense
    Demo,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create { email, name, admin } => {
                commands::user::create(&email, &name, admin).await?;
            }
            UserAction::Promote { email } => commands::user::promote(&email).await?,
            UserAction::Demote { email } => commands::user::demote(&email).await?,
        },
        Commands::Seed { target } => match target {
            SeedTarget::Demo => commands::seed::demo().await?,
        },
    }
    Ok(())
}
