//! HTTP listener for Slack webhooks and liveness probes.
//!
//! One port serves both: `POST {events_path}` receives slash commands and
//! interaction payloads, and every other request gets the static liveness
//! body.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::config::GlobalConfig;
use crate::slack::events::{self, Ack, Job};
use crate::slack::payloads::InboundEvent;
use crate::slack::signature::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::state::AppState;
use crate::{AppError, Result};

/// Body returned by the liveness responder.
pub const LIVENESS_BODY: &str = "Hello! This is a Slack app.";

/// Answer any request with a fixed plain-text body.
async fn liveness() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        LIVENESS_BODY,
    )
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let events_path = state.config.server.events_path.clone();
    Router::new()
        .route(&events_path, post(handle_events).fallback(liveness))
        .fallback(liveness)
        .with_state(state)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Result<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Signature(format!("missing {name} header")))
}

fn verify_request(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<()> {
    let timestamp = header_str(headers, TIMESTAMP_HEADER)?;
    let signature = header_str(headers, SIGNATURE_HEADER)?;
    state.verifier.verify(timestamp, body, signature)
}

fn error_response(err: &AppError) -> Response {
    let status = match err {
        AppError::Signature(_) => StatusCode::UNAUTHORIZED,
        AppError::Payload(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string()).into_response()
}

impl IntoResponse for Ack {
    fn into_response(self) -> Response {
        match self.body() {
            Some(body) => Json(body).into_response(),
            None => StatusCode::OK.into_response(),
        }
    }
}

/// Verify, acknowledge, and hand the follow-up work to a background task.
async fn handle_events(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Err(err) = verify_request(&state, &headers, &body) {
        warn!(%err, "rejected unsigned or stale slack request");
        return error_response(&err);
    }

    let event = match InboundEvent::from_form_body(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!(%err, "malformed slack payload");
            return error_response(&err);
        }
    };

    let (ack, job) = events::triage(event, &state);
    if let Some(job) = job {
        spawn_job(job, state);
    }
    ack.into_response()
}

fn spawn_job(job: Job, state: AppState) {
    let span = info_span!("slack_event", event_id = %Uuid::new_v4(), kind = job.kind());
    tokio::spawn(
        async move {
            if let Err(err) = events::run(job, &state).await {
                warn!(%err, "slack event handler failed");
            }
        }
        .instrument(span),
    );
}

/// Bind the configured host and port.
///
/// # Errors
///
/// Returns `AppError::Io` if the address cannot be bound.
pub async fn bind(config: &GlobalConfig) -> Result<TcpListener> {
    let addr = config.bind_addr();
    TcpListener::bind(&addr)
        .await
        .map_err(|err| AppError::Io(format!("failed to bind {addr}: {err}")))
}

/// Serve the router on `listener` until `ct` is cancelled.
///
/// # Errors
///
/// Returns `AppError::Io` if the server fails.
pub async fn serve(listener: TcpListener, state: AppState, ct: CancellationToken) -> Result<()> {
    let addr = listener.local_addr()?;
    info!(%addr, events_path = %state.config.server.events_path, "http listener ready");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(ct.cancelled_owned())
        .await
        .map_err(|err| AppError::Io(format!("http server error: {err}")))?;

    info!("http listener shut down");
    Ok(())
}
