//! Collection endpoint handlers.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use uuid::Uuid;

use crate::http::response::{Ack, ApiError, StatusBody};
use crate::http::server::AppState;
use crate::observability::metrics;

/// `POST /api/metrics`: store one record as received.
pub async fn ingest_metrics(State(state): State<AppState>, body: Bytes) -> Response {
    let result = ingest(&state, &body).await;
    let status = match &result {
        Ok(_) => StatusCode::OK,
        Err(e) => e.status(),
    };
    metrics::record_ingest(status.as_u16());

    match result {
        Ok(ack) => Json(ack).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn ingest(state: &AppState, body: &[u8]) -> Result<Ack, ApiError> {
    let mut document: Value = serde_json::from_slice(body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected non-JSON metrics body");
        ApiError::BadRequest(format!("invalid JSON body: {}", e))
    })?;

    let Some(fields) = document.as_object_mut() else {
        return Err(ApiError::BadRequest("body must be a JSON object".into()));
    };

    let page_url = fields
        .get("pageUrl")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            tracing::warn!("Rejected metrics body without pageUrl");
            ApiError::BadRequest("pageUrl is required".into())
        })?;

    // An id is only ever added, never replaced.
    let id = match fields.get("id") {
        None => {
            let id = Uuid::new_v4().to_string();
            fields.insert("id".into(), Value::String(id.clone()));
            id
        }
        Some(Value::String(id)) if !id.trim().is_empty() => id.clone(),
        Some(other) => {
            tracing::warn!(id = %other, "Rejected metrics body with invalid id");
            return Err(ApiError::BadRequest("id must be a non-empty string".into()));
        }
    };

    state.store.append(&document).await.map_err(|e| {
        tracing::error!(record_id = %id, error = %e, "Failed to save metrics");
        ApiError::Internal("failed to save metrics".into())
    })?;

    let page_type = document
        .get("pageType")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let incomplete = document
        .get("incomplete")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    tracing::info!(
        record_id = %id,
        page_url = %page_url,
        page_type,
        incomplete,
        "Metrics stored"
    );
    Ok(Ack::new(id))
}

/// `GET /status`: version and stored record count.
pub async fn status(State(state): State<AppState>) -> Result<Json<StatusBody>, ApiError> {
    let records = state.store.count().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to read record store");
        ApiError::Internal("failed to read metrics".into())
    })?;

    Ok(Json(StatusBody {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "ok".to_string(),
        records,
    }))
}
