//! Azure Functions custom handler: the host forwards each queue trigger
//! invocation to this HTTP server.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::error::CheckError;
use crate::generator::{CheckGenerator, GenerationReport, SinkOutcome};
use crate::message::{parse_timestamp, InboundMessage};

/// Function name, and therefore the route the host posts to.
pub const FUNCTION_NAME: &str = "CheckGeneratorFunction";
/// Name of the queue trigger binding in `function.json`.
pub const QUEUE_BINDING: &str = "message";

/// Invocation payload sent by the Functions host.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationRequest {
    /// Trigger and input binding values, keyed by binding name.
    #[serde(default)]
    pub data: HashMap<String, Value>,
    /// Trigger metadata (`Id`, `InsertionTime`, ...).
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

/// Response returned to the Functions host.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct InvocationResponse {
    /// Output binding values. This function has none.
    pub outputs: HashMap<String, Value>,
    /// Lines the host appends to the invocation log.
    pub logs: Vec<String>,
    /// Function return value.
    pub return_value: Option<Value>,
}

impl InvocationRequest {
    /// Extract the queue message from the payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue binding is absent.
    pub fn into_message(self) -> Result<InboundMessage, CheckError> {
        let body = self
            .data
            .get(QUEUE_BINDING)
            .and_then(text)
            .ok_or_else(|| CheckError::InvalidMessage(format!("missing Data.{QUEUE_BINDING}")))?;

        let meta = |key: &str| self.metadata.get(key).and_then(text);
        let timestamp = |key: &str| {
            let raw = meta(key)?;
            let parsed = parse_timestamp(&raw);
            if parsed.is_none() {
                warn!(field = key, value = %raw, "Unparseable queue timestamp");
            }
            parsed
        };

        let mut message = InboundMessage::new(meta("Id").unwrap_or_default(), body);
        message.inserted_on = timestamp("InsertionTime");
        message.expires_on = timestamp("ExpirationTime");
        message.dequeue_count = meta("DequeueCount").and_then(|c| c.trim().parse().ok());
        Ok(message)
    }
}

/// Binding values arrive either raw or as JSON-encoded strings.
fn text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => match serde_json::from_str::<Value>(s) {
            Ok(Value::String(inner)) => Some(inner),
            _ => Some(s.clone()),
        },
        other => Some(other.to_string()),
    }
}

fn summary(report: &GenerationReport) -> Vec<String> {
    let mut logs = vec![format!("Blob name: {}.", report.blob_name)];
    for (sink, outcome) in [("local", &report.local), ("remote", &report.remote)] {
        match outcome {
            SinkOutcome::Stored { location, sequence_number } => {
                logs.push(format!("Stored {sink} copy at {location}."));
                if sink == "remote" {
                    let seq = sequence_number.map_or_else(|| "none".to_string(), |n| n.to_string());
                    logs.push(format!("Blob sequence number: {seq}."));
                }
            }
            SinkOutcome::Failed { error } => logs.push(error.clone()),
            SinkOutcome::Disabled | SinkOutcome::NotAttempted => {}
        }
    }
    logs
}

/// Shared handler state.
#[derive(Clone)]
struct AppState {
    generator: Arc<CheckGenerator>,
}

/// Build the custom handler router.
pub fn router(generator: Arc<CheckGenerator>) -> Router {
    Router::new()
        .route(&format!("/{FUNCTION_NAME}"), post(invoke))
        .route("/health", get(health_check))
        .with_state(AppState { generator })
}

async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<InvocationRequest>,
) -> (StatusCode, Json<InvocationResponse>) {
    let message = match request.into_message() {
        Ok(message) => message,
        Err(e) => {
            warn!(error = %e, "Rejected invocation");
            let response = InvocationResponse { logs: vec![e.to_string()], ..Default::default() };
            return (StatusCode::BAD_REQUEST, Json(response));
        }
    };

    let report = match state.generator.handle(&message).await {
        Ok(report) => report,
        Err(e) => {
            let response = InvocationResponse { logs: vec![e.to_string()], ..Default::default() };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response));
        }
    };
    if !report.is_complete() {
        warn!(blob_name = %report.blob_name, "Check was not stored in every destination");
    }
    let response = InvocationResponse {
        outputs: HashMap::new(),
        logs: summary(&report),
        return_value: serde_json::to_value(&report).ok(),
    };
    (StatusCode::OK, Json(response))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Serve the custom handler on `127.0.0.1:port` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the port cannot be bound.
pub async fn serve(generator: Arc<CheckGenerator>, port: u16) -> Result<(), CheckError> {
    let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, function = FUNCTION_NAME, "Custom handler listening");

    axum::serve(listener, router(generator)).with_graceful_shutdown(shutdown_signal()).await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
