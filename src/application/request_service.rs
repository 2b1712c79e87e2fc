// Request service - District resource requests and provincial review
use crate::application::dashboard_service::DashboardService;
use crate::application::error::{ApiError, WorkflowError};
use crate::application::notifier::Notifier;
use crate::application::relief_api::ReliefApi;
use crate::application::single_flight::SingleFlight;
use crate::domain::request::{RequestBoard, RequestBoardView, ReviewDecision, ReviewPayload};
use crate::domain::validation::{FieldErrorMap, ResourceRequestForm};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const MAX_NOTES_LEN: usize = 500;
const REVIEW_FAILED: &str = "Failed to update request";
const SUBMIT_FAILED: &str = "Failed to submit request";

#[derive(Default)]
struct BoardState {
    board: RequestBoard,
    version: u64,
    closed: bool,
}

#[derive(Clone)]
pub struct RequestService {
    api: Arc<dyn ReliefApi>,
    dashboard: DashboardService,
    notifier: Notifier,
    flights: SingleFlight,
    state: Arc<Mutex<BoardState>>,
    tickets: Arc<AtomicU64>,
}

impl RequestService {
    pub fn new(api: Arc<dyn ReliefApi>, dashboard: DashboardService, notifier: Notifier) -> Self {
        Self {
            api,
            dashboard,
            notifier,
            flights: SingleFlight::new(),
            state: Arc::new(Mutex::new(BoardState::default())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BoardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the request board with the server's full list.
    pub async fn load_requests(&self) -> Result<RequestBoardView, ApiError> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        if self.lock().closed {
            return Err(ApiError::Closed);
        }

        let requests = self.api.fetch_district_requests().await.map_err(|e| {
            tracing::warn!("Loading district requests failed: {}", e);
            e
        })?;

        let mut state = self.lock();
        if state.closed {
            return Err(ApiError::Closed);
        }
        if ticket > state.version {
            tracing::debug!("Published request board {} with {} requests", ticket, requests.len());
            state.board = RequestBoard::new(requests);
            state.version = ticket;
        }
        Ok(state.board.view())
    }

    pub fn board(&self) -> RequestBoardView {
        self.lock().board.view()
    }

    pub fn all_requests(&self) -> RequestBoard {
        self.lock().board.clone()
    }

    /// Approve or reject one pending request, then reload the request list and
    /// the dashboard (approvals move resource balances).
    pub async fn review(
        &self,
        request_id: u64,
        decision: ReviewDecision,
        notes: Option<String>,
    ) -> Result<(), WorkflowError> {
        let key = format!("review:{}", request_id);
        let Some(_flight) = self.flights.try_acquire(&key) else {
            self.notifier
                .warning(format!("Request {} is already being reviewed", request_id));
            return Err(WorkflowError::Busy(format!("review of request {}", request_id)));
        };

        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        let errors = self.validate_review(request_id, notes.as_deref());
        if !errors.is_empty() {
            return Err(WorkflowError::Validation(errors));
        }

        let payload = ReviewPayload {
            status: decision,
            notes,
        };
        match self.api.review_district_request(request_id, &payload).await {
            Ok(()) => {
                tracing::info!("Request {} {}", request_id, decision.as_str());
                self.notifier
                    .success(format!("Request {} {}", request_id, decision.as_str()));
                if let Err(e) = self.load_requests().await {
                    self.notifier
                        .error(e.user_message("Failed to refresh requests"));
                }
                if let Err(e) = self.dashboard.load().await {
                    tracing::warn!("Dashboard reload after review failed: {}", e);
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Review of request {} failed: {}", request_id, e);
                self.notifier.error(e.user_message(REVIEW_FAILED));
                Err(WorkflowError::Api(e))
            }
        }
    }

    fn validate_review(&self, request_id: u64, notes: Option<&str>) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        match self.lock().board.get(request_id) {
            None => errors.insert("requestId", "Unknown request"),
            Some(request) if !request.status.is_pending() => {
                errors.insert("requestId", "Request has already been processed")
            }
            Some(_) => {}
        }
        if notes.map(|n| n.chars().count() > MAX_NOTES_LEN).unwrap_or(false) {
            errors.insert(
                "notes",
                format!("Notes must be at most {} characters", MAX_NOTES_LEN),
            );
        }
        errors
    }

    /// Raise a new district-to-province resource request.
    pub async fn submit(&self, form: &ResourceRequestForm) -> Result<(), WorkflowError> {
        let Some(_flight) = self.flights.try_acquire("submit") else {
            self.notifier.warning("A request is already being submitted");
            return Err(WorkflowError::Busy("request submission".to_string()));
        };

        let request = form.to_request().map_err(WorkflowError::Validation)?;
        match self.api.create_district_request(&request).await {
            Ok(()) => {
                tracing::info!(
                    "Submitted request for {} {} ({:?})",
                    request.quantity,
                    request.resource_type,
                    request.urgency
                );
                self.notifier.success("Request submitted successfully");
                if let Err(e) = self.load_requests().await {
                    self.notifier
                        .error(e.user_message("Failed to refresh requests"));
                }
                Ok(())
            }
            Err(e) => {
                tracing::error!("Submitting request failed: {}", e);
                self.notifier.error(e.user_message(SUBMIT_FAILED));
                Err(WorkflowError::Api(e))
            }
        }
    }

    pub fn close(&self) {
        self.lock().closed = true;
    }
}
