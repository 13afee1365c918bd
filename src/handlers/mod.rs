//! NATS message handlers

pub mod import;
pub mod ping;

use anyhow::Result;
use async_nats::Client;
use sqlx::PgPool;
use tokio::select;
use tracing::{error, info};

use crate::config::Config;

/// Start all message handlers
pub async fn start_handlers(client: Client, pool: PgPool, config: &Config) -> Result<()> {
    info!("Starting message handlers...");

    let ping_sub = client.subscribe("taskdeck.ping").await?;
    let import_tasks_sub = client.subscribe("taskdeck.import.tasks").await?;
    let import_template_sub = client.subscribe("taskdeck.import.template").await?;

    info!("Subscribed to NATS subjects");

    let client_ping = client.clone();
    let client_import_tasks = client.clone();
    let client_import_template = client.clone();

    let pool_import_tasks = pool.clone();
    let jwt_secret_import = config.jwt_secret.clone();

    let ping_handle = tokio::spawn(async move {
        ping::handle_ping(client_ping, ping_sub).await
    });

    let import_tasks_handle = tokio::spawn(async move {
        import::handle_import_tasks(
            client_import_tasks,
            import_tasks_sub,
            pool_import_tasks,
            jwt_secret_import,
        )
        .await
    });

    let import_template_handle = tokio::spawn(async move {
        import::handle_import_template(client_import_template, import_template_sub).await
    });

    info!("All handlers started, waiting for messages...");

    // Wait for any handler to finish (which means an error occurred)
    select! {
        result = ping_handle => {
            error!("Ping handler finished: {:?}", result);
        }
        result = import_tasks_handle => {
            error!("Import tasks handler finished: {:?}", result);
        }
        result = import_template_handle => {
            error!("Import template handler finished: {:?}", result);
        }
    }

    Ok(())
}
