use std::sync::Arc;

use clap::Parser;
use poem::{Server, listener::TcpListener};

use brokerage_backend::AppData;
use brokerage_backend::api;
use brokerage_backend::cli::{self, Cli, Commands};
use brokerage_backend::config::{
    ApplicationError, BootstrapSettings, SecretManager, init_database, init_logging,
    migrate_database,
};

#[tokio::main]
async fn main() -> Result<(), ApplicationError> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    init_logging()?;

    let cli = Cli::parse();
    let command = cli.command();
    let settings = BootstrapSettings::from_env()?;
    tracing::debug!("Bootstrap settings: {:?}", settings);

    if command == Commands::Migrate {
        return cli::migrate::run_migrations(&settings).await;
    }

    let secrets = SecretManager::from_env()?;

    let db = init_database(&settings).await?;
    migrate_database(&db).await?;
    tracing::info!("Database migrations completed");

    let app_data = Arc::new(AppData::init(db, &settings, &secrets));

    if command != Commands::Serve {
        return cli::execute_command(command, &app_data).await;
    }

    let report = app_data.rbac_store.sync_vocabulary(&app_data.db).await?;
    tracing::info!(
        "Permission vocabulary synced ({} permissions, {} roles created)",
        report.permissions_created,
        report.roles_created
    );

    let address = settings.server_address();
    let server_url = format!("http://{}/api", address);
    let app = api::routes(app_data, &server_url);

    tracing::info!("Starting server on http://{}", address);
    tracing::info!("Swagger UI available at http://{}/swagger", address);

    Server::new(TcpListener::bind(address)).run(app).await?;
    Ok(())
}
