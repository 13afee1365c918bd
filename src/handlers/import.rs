//! Task import handlers: CSV upload and template download

use anyhow::Result;
use async_nats::{Client, Subscriber};
use base64::Engine;
use futures::StreamExt;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::auth;
use crate::services::import::{self, ImportError};
use crate::services::task_store::PgTaskStore;
use crate::types::{
    EmptyPayload, ErrorResponse, ImportTasksRequest, ImportTasksResponse, Request,
    SuccessResponse,
};

/// Handle import.tasks messages
///
/// The payload carries the uploaded file's bytes base64-encoded; the
/// frontend has already checked that the upload is a CSV/text file of at
/// most 2 MiB. Each upload is processed to completion in one pass before
/// the reply is sent; independent uploads run in their own handler
/// invocations.
pub async fn handle_import_tasks(
    client: Client,
    mut subscriber: Subscriber,
    pool: PgPool,
    jwt_secret: String,
) -> Result<()> {
    let store = PgTaskStore::new(pool);

    while let Some(msg) = subscriber.next().await {
        debug!("Received import.tasks message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<ImportTasksRequest> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let auth = match auth::extract_auth(&request, &jwt_secret) {
            Ok(auth) => auth,
            Err(e) => {
                let error = ErrorResponse::new(request.id, "UNAUTHORIZED", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let content = match base64::engine::general_purpose::STANDARD
            .decode(&request.payload.content_base64)
        {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Import upload with invalid encoding: {}", e);
                let error = ErrorResponse::new(
                    request.id,
                    "MALFORMED_FILE",
                    format!("Invalid file encoding: {}", e),
                );
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        info!(
            "Importing tasks from '{}' ({} bytes) for user {}",
            request.payload.filename,
            content.len(),
            auth.user_id
        );

        match import::import_tasks(content.as_slice(), auth.user_id, &store).await {
            Ok(report) => {
                info!(
                    "CSV import of '{}' completed: {} imported, {} rejected",
                    request.payload.filename,
                    report.imported_count,
                    report.total_errors()
                );
                let response = SuccessResponse::new(request.id, ImportTasksResponse::from(report));
                let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
            }
            Err(e @ ImportError::MalformedFile(_)) => {
                warn!("Import of '{}' rejected: {}", request.payload.filename, e);
                let error = ErrorResponse::new(request.id, "MALFORMED_FILE", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
            Err(e) => {
                error!("Import of '{}' failed: {}", request.payload.filename, e);
                let error = ErrorResponse::new(request.id, "IMPORT_ERROR", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
            }
        }
    }

    Ok(())
}

/// Handle import.template messages
///
/// Pure static data; requires no authentication and reads no state.
pub async fn handle_import_template(client: Client, mut subscriber: Subscriber) -> Result<()> {
    while let Some(msg) = subscriber.next().await {
        debug!("Received import.template message");

        let reply = match msg.reply {
            Some(ref reply) => reply.clone(),
            None => {
                warn!("Message without reply subject");
                continue;
            }
        };

        let request: Request<EmptyPayload> = match serde_json::from_slice(&msg.payload) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse request: {}", e);
                let error = ErrorResponse::new(Uuid::nil(), "INVALID_REQUEST", e.to_string());
                let _ = client.publish(reply, serde_json::to_vec(&error)?.into()).await;
                continue;
            }
        };

        let response = SuccessResponse::new(request.id, import::template());
        let _ = client.publish(reply, serde_json::to_vec(&response)?.into()).await;
    }

    Ok(())
}
