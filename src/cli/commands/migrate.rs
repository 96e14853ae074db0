use anyhow::Context;

use crate::config::AppConfig;
use crate::database::{migrations, Database};

/// Create tables and indexes without starting the server.
pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    let pool = Database::pool(&config.database)
        .await
        .context("failed to connect to postgres")?;

    migrations::run(&pool).await.context("migration failed")?;
    println!("Database schema is up to date");
    Ok(())
}
