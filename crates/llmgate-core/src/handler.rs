use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

use llmgate_protocol::canonical::{ChatCompletionRequest, ErrorEnvelope};
use llmgate_provider_core::{Headers, UpstreamCtx};

use crate::core::CoreState;
use crate::error::GatewayError;

pub const REQUEST_ID_HEADER: &str = "x-llmgate-request-id";

pub async fn chat_completions_handler(
    State(state): State<Arc<CoreState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let started_at = Instant::now();
    let request = match serde_json::from_slice::<ChatCompletionRequest>(&body) {
        Ok(request) => request,
        Err(err) => {
            let err = GatewayError::InvalidRequest(format!("malformed request body: {err}"));
            return respond(&trace_id, "chat_completions", started_at, Err(err));
        }
    };
    info!(
        event = "downstream_received",
        trace_id = %trace_id,
        op = "chat_completions",
        model = %request.model,
        messages = request.messages.len()
    );

    let ctx = UpstreamCtx::new(trace_id.clone()).with_headers(headers_to_vec(&headers));
    // Dropping this handler (caller went away) cancels the upstream call.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = state
        .gateway
        .chat_completions(request, &ctx, &cancel)
        .await
        .map(|response| Json(response).into_response());
    respond(&trace_id, "chat_completions", started_at, result)
}

pub async fn models_handler(State(state): State<Arc<CoreState>>) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let started_at = Instant::now();
    let models = state.gateway.configured_models();
    respond(
        &trace_id,
        "models",
        started_at,
        Ok(Json(models).into_response()),
    )
}

pub async fn channel_models_handler(
    State(state): State<Arc<CoreState>>,
    Path(channel_id): Path<i64>,
    headers: HeaderMap,
) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let started_at = Instant::now();
    info!(
        event = "downstream_received",
        trace_id = %trace_id,
        op = "channel_models",
        channel_id
    );
    let ctx = UpstreamCtx::new(trace_id.clone()).with_headers(headers_to_vec(&headers));
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let result = state
        .gateway
        .channel_models(channel_id, &ctx, &cancel)
        .await
        .map(|models| Json(models).into_response());
    respond(&trace_id, "channel_models", started_at, result)
}

fn respond(
    trace_id: &str,
    op: &'static str,
    started_at: Instant,
    result: Result<Response, GatewayError>,
) -> Response {
    let mut resp = match result {
        Ok(resp) => {
            info!(
                event = "downstream_responded",
                trace_id = %trace_id,
                op,
                status = resp.status().as_u16(),
                elapsed_ms = started_at.elapsed().as_millis()
            );
            resp
        }
        Err(err) => {
            let status = err.status();
            warn!(
                event = "downstream_responded",
                trace_id = %trace_id,
                op,
                status = status.as_u16(),
                error = %err,
                elapsed_ms = started_at.elapsed().as_millis()
            );
            error_response(status, &err)
        }
    };
    if let Ok(value) = HeaderValue::from_str(trace_id) {
        resp.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    resp
}

fn error_response(status: StatusCode, err: &GatewayError) -> Response {
    (status, Json(ErrorEnvelope::from(err.to_normalized()))).into_response()
}

fn headers_to_vec(headers: &HeaderMap) -> Headers {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect()
}
