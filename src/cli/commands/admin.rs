use anyhow::Context;

use crate::app::AppContext;
use crate::cli::OutputFormat;
use crate::config::{AppConfig, StorageBackend};
use crate::database::models::Role;
use crate::database::Database;

/// Create an admin in the postgres store. Roles can only be granted by an
/// existing admin over the API, so the first one comes from here or from
/// the `ADMIN_USERNAME`/`ADMIN_PASSWORD` startup bootstrap.
pub async fn handle(
    config: AppConfig,
    username: &str,
    password: &str,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    config.validate().context("invalid configuration")?;

    // An in-memory admin would vanish as soon as this command exits.
    if config.database.backend == StorageBackend::Memory {
        anyhow::bail!(
            "create-admin needs the postgres backend (set DATABASE_URL); \
             for an in-memory server set ADMIN_USERNAME and ADMIN_PASSWORD instead"
        );
    }

    let database = Database::connect(&config.database)
        .await
        .context("failed to open storage")?;
    let state = AppContext::new(config, database);

    let admin = state
        .users
        .register(Some(username), Some(password), Role::Admin)
        .await?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&admin)?),
        OutputFormat::Text => println!("Created admin {} ({})", admin.username, admin.id),
    }
    Ok(())
}
