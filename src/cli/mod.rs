// CLI module for administrative operations requiring server access

pub mod bootstrap;
pub mod migrate;

use clap::{Parser, Subcommand};

use crate::app_data::AppData;
use crate::config::ApplicationError;

/// Brokerage backend server and administration CLI
#[derive(Parser, Debug)]
#[command(name = "brokerage-backend")]
#[command(about = "Role-scoped brokerage management backend", long_about = None)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,

    /// Insert missing permission tags and hierarchy roles
    SyncPermissions,

    /// Create the first Super Admin account
    CreateUser {
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        phone: Option<String>,
    },
}

impl Cli {
    pub fn command(&self) -> Commands {
        self.command.clone().unwrap_or(Commands::Serve)
    }
}

/// Execute an administrative command against initialized application data
///
/// `Serve` and `Migrate` are handled by main before AppData exists.
pub async fn execute_command(command: Commands, app_data: &AppData) -> Result<(), ApplicationError> {
    match command {
        Commands::Serve | Commands::Migrate => Ok(()),
        Commands::SyncPermissions => {
            bootstrap::sync_permissions(app_data).await?;
            Ok(())
        }
        Commands::CreateUser {
            name,
            email,
            password,
            phone,
        } => {
            bootstrap::create_super_admin(app_data, name, email, password, phone).await?;
            Ok(())
        }
    }
}
