// HTTP request handlers
use crate::application::error::{ApiError, WorkflowError};
use crate::domain::request::ReviewDecision;
use crate::domain::validation::{
    AlertForm, AllocationForm, FieldErrorMap, ResourceForm, ResourceRequestForm, ShelterForm,
    Validate,
};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ReviewBody {
    pub decision: ReviewDecision,
    #[serde(default)]
    pub notes: Option<String>,
}

fn message(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(json!({ "message": text.into() }))).into_response()
}

fn api_error_response(err: &ApiError, fallback: &str) -> Response {
    match err {
        ApiError::Closed => message(StatusCode::SERVICE_UNAVAILABLE, "Session is shutting down"),
        _ => message(StatusCode::BAD_GATEWAY, err.user_message(fallback)),
    }
}

fn workflow_error_response(err: WorkflowError, fallback: &str) -> Response {
    match err {
        WorkflowError::Validation(errors) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response()
        }
        WorkflowError::UnresolvableType(name) => message(
            StatusCode::UNPROCESSABLE_ENTITY,
            format!("Unable to determine resource type for {}", name),
        ),
        WorkflowError::Busy(what) => message(StatusCode::CONFLICT, format!("{} is already in progress", what)),
        WorkflowError::Api(e) => api_error_response(&e, fallback),
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.dashboard.view())
}

/// Explicit refresh; the previous snapshot is kept if it fails
pub async fn refresh_dashboard(State(state): State<Arc<AppState>>) -> Response {
    match state.session.refresh().await {
        Ok(_) => Json(state.session.dashboard.view()).into_response(),
        Err(e) => api_error_response(&e, "Failed to refresh dashboard data"),
    }
}

pub async fn get_allocation_draft(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.allocations.active_form())
}

pub async fn put_allocation_draft(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AllocationForm>,
) -> impl IntoResponse {
    state.session.allocations.open_form(form);
    StatusCode::NO_CONTENT
}

pub async fn close_allocation_draft(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.session.allocations.close_form();
    StatusCode::NO_CONTENT
}

pub async fn create_allocation(
    State(state): State<Arc<AppState>>,
    Json(form): Json<AllocationForm>,
) -> Response {
    match state.session.allocations.allocate(&form).await {
        Ok(request) => Json(request).into_response(),
        Err(e) => workflow_error_response(e, "Failed to allocate resources"),
    }
}

pub async fn list_requests(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.requests.board())
}

pub async fn refresh_requests(State(state): State<Arc<AppState>>) -> Response {
    match state.session.requests.load_requests().await {
        Ok(board) => Json(board).into_response(),
        Err(e) => api_error_response(&e, "Failed to load district requests"),
    }
}

pub async fn create_request(
    State(state): State<Arc<AppState>>,
    Json(form): Json<ResourceRequestForm>,
) -> Response {
    match state.session.requests.submit(&form).await {
        Ok(()) => (StatusCode::CREATED, Json(state.session.requests.board())).into_response(),
        Err(e) => workflow_error_response(e, "Failed to submit request"),
    }
}

pub async fn review_request(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<ReviewBody>,
) -> Response {
    match state.session.requests.review(id, body.decision, body.notes).await {
        Ok(()) => Json(state.session.requests.board()).into_response(),
        Err(e) => workflow_error_response(e, "Failed to update request"),
    }
}

pub async fn list_notifications(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.session.notifier.entries())
}

pub async fn dismiss_notification(
    Path(id): Path<u64>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    if state.session.notifier.dismiss(id) {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}

fn check<F: DeserializeOwned + Validate>(body: Value) -> Result<FieldErrorMap, serde_json::Error> {
    serde_json::from_value::<F>(body).map(|form| form.validate())
}

/// Run the validation gate for one form without submitting anything
pub async fn validate_form(
    Path(form): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Response {
    let result = match form.as_str() {
        "alert" => check::<AlertForm>(body),
        "shelter" => check::<ShelterForm>(body),
        "resource" => check::<ResourceForm>(body),
        "resource-request" => check::<ResourceRequestForm>(body),
        "allocation" => serde_json::from_value::<AllocationForm>(body).map(|f| {
            f.validate_against(state.session.dashboard.snapshot().as_deref())
        }),
        other => return message(StatusCode::NOT_FOUND, format!("Unknown form: {}", other)),
    };

    match result {
        Ok(errors) if errors.is_empty() => (StatusCode::OK, Json(errors)).into_response(),
        Ok(errors) => (StatusCode::UNPROCESSABLE_ENTITY, Json(errors)).into_response(),
        Err(e) => message(StatusCode::BAD_REQUEST, e.to_string()),
    }
}
