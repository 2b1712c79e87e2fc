// Dashboard session - Explicit state store owned by one view session
use crate::application::allocation_service::AllocationService;
use crate::application::dashboard_service::DashboardService;
use crate::application::error::ApiError;
use crate::application::notifier::Notifier;
use crate::application::relief_api::ReliefApi;
use crate::application::request_service::RequestService;
use crate::domain::snapshot::DashboardSnapshot;
use std::sync::Arc;
use std::time::Duration;

/// Everything a dashboard view needs, built once and shared by reference.
/// `shutdown` is the teardown: it stops snapshot publishing and cancels timers.
#[derive(Clone)]
pub struct DashboardSession {
    pub notifier: Notifier,
    pub dashboard: DashboardService,
    pub allocations: AllocationService,
    pub requests: RequestService,
}

impl DashboardSession {
    pub fn new(api: Arc<dyn ReliefApi>, default_ttl: Duration) -> Self {
        let notifier = Notifier::new(default_ttl);
        let dashboard = DashboardService::new(api.clone());
        let allocations = AllocationService::new(api.clone(), dashboard.clone(), notifier.clone());
        let requests = RequestService::new(api, dashboard.clone(), notifier.clone());

        Self {
            notifier,
            dashboard,
            allocations,
            requests,
        }
    }

    /// Initial load on mount. Failures are surfaced as notifications; the session
    /// stays usable and can be refreshed.
    pub async fn start(&self) {
        let (dashboard, requests) =
            tokio::join!(self.dashboard.load(), self.requests.load_requests());

        if let Err(e) = dashboard {
            tracing::warn!("Initial dashboard load failed: {}", e);
            self.notifier
                .error(e.user_message("Failed to load dashboard data"));
        }
        if let Err(e) = requests {
            tracing::warn!("Initial request load failed: {}", e);
            self.notifier
                .error(e.user_message("Failed to load district requests"));
        }
    }

    /// User-triggered refresh of the dashboard; a failure is shown to the user.
    pub async fn refresh(&self) -> Result<Arc<DashboardSnapshot>, ApiError> {
        let result = self.dashboard.refresh().await;
        if let Err(e) = &result {
            self.notifier
                .error(e.user_message("Failed to refresh dashboard data"));
        }
        result
    }

    pub fn shutdown(&self) {
        tracing::info!("Shutting down dashboard session");
        self.dashboard.close();
        self.requests.close();
        self.allocations.close_form();
        self.notifier.shutdown();
    }
}
