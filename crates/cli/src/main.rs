//! GXI CLI - Database migrations and account management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! gxi-cli migrate
//!
//! # Approve a pending account (the out-of-band activation step)
//! gxi-cli user activate -e customer@example.com
//!
//! # Deactivate an account
//! gxi-cli user deactivate -e customer@example.com
//!
//! # List accounts
//! gxi-cli user list
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "gxi-cli")]
#[command(author, version, about = "GXI CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Activate a pending account
    Activate {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Deactivate an account
    Deactivate {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// List all accounts
    List,
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
            UserAction::Activate { email } => commands::user::set_active(&email, true).await?,
            UserAction::Deactivate { email } => commands::user::set_active(&email, false).await?,
            UserAction::List => commands::user::list().await?,
        },
    }
    Ok(())
}
