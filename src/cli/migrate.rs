use crate::config::{ApplicationError, BootstrapSettings, init_database, migrate_database};

/// Run database migrations
///
/// Connects and migrates without building the full AppData structure, so
/// secrets are not required.
pub async fn run_migrations(settings: &BootstrapSettings) -> Result<(), ApplicationError> {
    tracing::info!("Running database migrations...");

    let db = init_database(settings).await?;
    migrate_database(&db).await?;

    tracing::info!("All migrations completed successfully");
    Ok(())
}
