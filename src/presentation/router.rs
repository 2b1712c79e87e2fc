// Route table for the dashboard session
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    close_allocation_draft, create_allocation, create_request, dismiss_notification,
    get_allocation_draft, get_dashboard, health_check, list_notifications, list_requests,
    put_allocation_draft, refresh_dashboard, refresh_requests, review_request, validate_form,
};
use axum::routing::{delete, get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/refresh", post(refresh_dashboard))
        .route("/allocations", post(create_allocation))
        .route(
            "/allocations/draft",
            get(get_allocation_draft)
                .put(put_allocation_draft)
                .delete(close_allocation_draft),
        )
        .route("/district-requests", get(list_requests).post(create_request))
        .route("/district-requests/refresh", post(refresh_requests))
        .route("/district-requests/:id/review", post(review_request))
        .route("/notifications", get(list_notifications))
        .route("/notifications/:id", delete(dismiss_notification))
        .route("/validate/:form", post(validate_form))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
