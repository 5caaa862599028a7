use std::{sync::Arc, time::Duration};

use migration::{Migrator, MigratorTrait};
use sea_orm::ConnectOptions;
use settings::Database;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "ledger={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::error!("no [server] section found in settings, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database, server.max_connections).await?;

    let transfer = settings.transfer.to_engine();
    tracing::info!(
        "transfers run at {:?} isolation, up to {} attempts",
        transfer.isolation_level,
        transfer.retry.max_attempts
    );
    let engine = engine::Engine::builder()
        .database(db)
        .settings(transfer)
        .build()
        .await?;

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    server::run_with_listener(Arc::new(engine), listener).await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn parse_database(
    config: &Database,
    max_connections: Option<u32>,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
        Database::Postgres(url) => url.clone(),
    };

    let mut options = ConnectOptions::new(url);
    options
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);
    match (config, max_connections) {
        // each connection to `sqlite::memory:` opens its own database
        (Database::Memory, _) => {
            options.max_connections(1);
        }
        (_, Some(max)) => {
            options.max_connections(max);
        }
        _ => {}
    }

    let database = sea_orm::Database::connect(options).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
