use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    ListFilter, RequestId, RequestSubmission, RequestUpdate, TimelineEntry, UpdateReceipt,
};
use super::lifecycle::TransitionError;
use super::repository::{RequestStore, StoreError};
use super::service::{DocumentRequestService, RequestServiceError};

/// Shared state for the request endpoints.
pub struct RequestApi<S> {
    service: Arc<DocumentRequestService<S>>,
    /// Token expected in `X-Admin-Token` for the timeline override; `None`
    /// disables the override entirely.
    admin_token: Option<String>,
}

impl<S> Clone for RequestApi<S> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            admin_token: self.admin_token.clone(),
        }
    }
}

/// Router builder exposing the document request endpoints.
pub fn request_router<S>(
    service: Arc<DocumentRequestService<S>>,
    admin_token: Option<String>,
) -> Router
where
    S: RequestStore + 'static,
{
    Router::new()
        .route(
            "/api/document-requests",
            get(list_handler::<S>).post(submit_handler::<S>),
        )
        .route(
            "/api/document-requests/:key",
            get(search_handler::<S>).put(update_handler::<S>),
        )
        .route(
            "/api/document-requests/:key/status",
            patch(status_handler::<S>),
        )
        .route(
            "/api/document-requests/:key/timeline",
            patch(timeline_handler::<S>),
        )
        .with_state(RequestApi {
            service,
            admin_token,
        })
}

pub(crate) async fn submit_handler<S>(
    State(api): State<RequestApi<S>>,
    Json(submission): Json<RequestSubmission>,
) -> Response
where
    S: RequestStore + 'static,
{
    match api.service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn list_handler<S>(
    State(api): State<RequestApi<S>>,
    Query(filter): Query<ListFilter>,
) -> Response
where
    S: RequestStore + 'static,
{
    match api.service.list(&filter) {
        Ok(records) => (StatusCode::OK, Json(records)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn search_handler<S>(
    State(api): State<RequestApi<S>>,
    Path(term): Path<String>,
) -> Response
where
    S: RequestStore + 'static,
{
    match api.service.search(&term) {
        Ok(found) => (StatusCode::OK, Json(found)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<S>(
    State(api): State<RequestApi<S>>,
    Path(key): Path<String>,
    Json(update): Json<RequestUpdate>,
) -> Response
where
    S: RequestStore + 'static,
{
    match api.service.update(&RequestId(key), update) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    pub(crate) status: String,
}

pub(crate) async fn status_handler<S>(
    State(api): State<RequestApi<S>>,
    Path(key): Path<String>,
    Json(change): Json<StatusChange>,
) -> Response
where
    S: RequestStore + 'static,
{
    match api.service.advance(&RequestId(key), &change.status) {
        Ok(_) => {
            let receipt = UpdateReceipt {
                matched: 1,
                modified: 1,
            };
            (StatusCode::OK, Json(receipt)).into_response()
        }
        Err(err) => error_response(err),
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TimelineOverwrite {
    pub(crate) timeline: Vec<TimelineEntry>,
}

pub(crate) async fn timeline_handler<S>(
    State(api): State<RequestApi<S>>,
    Path(key): Path<String>,
    headers: HeaderMap,
    Json(body): Json<TimelineOverwrite>,
) -> Response
where
    S: RequestStore + 'static,
{
    let Some(expected) = api.admin_token.as_deref() else {
        let payload = json!({ "error": "timeline override is disabled" });
        return (StatusCode::FORBIDDEN, Json(payload)).into_response();
    };

    let presented = headers
        .get("x-admin-token")
        .and_then(|value| value.to_str().ok());
    if presented != Some(expected) {
        let payload = json!({ "error": "administrative token required" });
        return (StatusCode::UNAUTHORIZED, Json(payload)).into_response();
    }

    match api.service.overwrite_timeline(&RequestId(key), body.timeline) {
        Ok(receipt) => (StatusCode::OK, Json(receipt)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: RequestServiceError) -> Response {
    let status = match &err {
        RequestServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        RequestServiceError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        RequestServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        RequestServiceError::Transition(TransitionError::UnknownStatus { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RequestServiceError::Transition(_) => StatusCode::CONFLICT,
    };

    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
