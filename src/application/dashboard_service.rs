// Dashboard service - Fan-out load of the dashboard snapshot
use crate::application::error::ApiError;
use crate::application::relief_api::ReliefApi;
use crate::domain::snapshot::DashboardSnapshot;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

const LOAD_FAILED: &str = "Failed to load dashboard data";

#[derive(Default)]
struct StoreState {
    snapshot: Option<Arc<DashboardSnapshot>>,
    error: Option<String>,
    in_flight: usize,
    closed: bool,
}

impl StoreState {
    fn published_version(&self) -> u64 {
        self.snapshot.as_ref().map(|s| s.version).unwrap_or(0)
    }
}

/// Serializable view of the store for the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub loading: bool,
    pub error: Option<String>,
    pub snapshot: Option<DashboardSnapshot>,
}

/// Sole owner of the dashboard snapshot. Other services never patch it; they ask
/// for a reload instead.
#[derive(Clone)]
pub struct DashboardService {
    api: Arc<dyn ReliefApi>,
    state: Arc<Mutex<StoreState>>,
    tickets: Arc<AtomicU64>,
}

impl DashboardService {
    pub fn new(api: Arc<dyn ReliefApi>) -> Self {
        Self {
            api,
            state: Arc::new(Mutex::new(StoreState::default())),
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch every dashboard section concurrently and publish a new snapshot only
    /// when all of them succeed. On failure the previous snapshot stays in place.
    ///
    /// Each call takes a ticket; a result whose ticket is older than the published
    /// snapshot is discarded, so a slow load cannot overwrite a newer one.
    pub async fn load(&self) -> Result<Arc<DashboardSnapshot>, ApiError> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.lock();
            if state.closed {
                return Err(ApiError::Closed);
            }
            state.in_flight += 1;
        }

        tracing::debug!("Loading dashboard (ticket {})", ticket);
        let api = &self.api;
        let result = futures::try_join!(
            api.fetch_stats(),
            api.fetch_alerts(),
            api.fetch_districts(),
            api.fetch_resources(),
            api.fetch_activity_logs(),
        );

        let mut state = self.lock();
        if state.closed {
            tracing::debug!("Discarding dashboard load {} after teardown", ticket);
            return Err(ApiError::Closed);
        }
        state.in_flight = state.in_flight.saturating_sub(1);

        match result {
            Ok((stats, alerts, districts, resources, activity_logs)) => {
                let snapshot = Arc::new(DashboardSnapshot::new(
                    ticket,
                    stats,
                    alerts,
                    districts,
                    resources,
                    activity_logs,
                ));

                if ticket <= state.published_version() {
                    tracing::debug!(
                        "Dropping stale dashboard load {} (published {})",
                        ticket,
                        state.published_version()
                    );
                    return Ok(state.snapshot.clone().unwrap_or(snapshot));
                }

                tracing::info!(
                    "Published dashboard snapshot {}: {} resources, {} districts, {} alerts",
                    ticket,
                    snapshot.resources.len(),
                    snapshot.districts.len(),
                    snapshot.alerts.len()
                );
                state.snapshot = Some(snapshot.clone());
                state.error = None;
                Ok(snapshot)
            }
            Err(e) => {
                tracing::warn!("Dashboard load {} failed: {}", ticket, e);
                if ticket > state.published_version() {
                    state.error = Some(e.user_message(LOAD_FAILED));
                }
                Err(e)
            }
        }
    }

    /// Explicit user-triggered reload. There is no automatic retry.
    pub async fn refresh(&self) -> Result<Arc<DashboardSnapshot>, ApiError> {
        tracing::info!("Dashboard refresh requested");
        self.load().await
    }

    pub fn snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.lock().snapshot.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().in_flight > 0
    }

    pub fn error(&self) -> Option<String> {
        self.lock().error.clone()
    }

    pub fn view(&self) -> DashboardView {
        let state = self.lock();
        DashboardView {
            loading: state.in_flight > 0,
            error: state.error.clone(),
            snapshot: state.snapshot.as_deref().cloned(),
        }
    }

    /// Stop publishing; in-flight loads finish but their results are ignored.
    pub fn close(&self) {
        let mut state = self.lock();
        state.closed = true;
        state.in_flight = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::fake_api::{water, Counters, FakeApi};
    use std::time::Duration;

    fn service() -> (Arc<FakeApi>, DashboardService) {
        let api = Arc::new(FakeApi::new());
        let service = DashboardService::new(api.clone());
        (api, service)
    }

    #[tokio::test]
    async fn test_load_publishes_complete_snapshot() {
        let (api, service) = service();
        assert!(service.snapshot().is_none());

        let snapshot = service.load().await.unwrap();
        assert_eq!(snapshot.version, 1);
        assert_eq!(snapshot.resources, vec![water(100, 60)]);
        assert_eq!(snapshot.stats.total_districts, 1);
        assert!(!service.is_loading());
        assert!(service.error().is_none());
        assert_eq!(Counters::get(&api.counters.resource_fetches), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_snapshot() {
        let (api, service) = service();
        let before = service.load().await.unwrap();

        *api.fail_alerts.lock().unwrap() = Some(ApiError::Status {
            status: 503,
            message: None,
        });
        assert!(service.load().await.is_err());

        let after = service.snapshot().unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(service.error().as_deref(), Some(LOAD_FAILED));
        assert!(!service.is_loading());

        // Explicit refresh recovers and clears the error
        *api.fail_alerts.lock().unwrap() = None;
        let refreshed = service.refresh().await.unwrap();
        assert_eq!(refreshed.version, 3);
        assert!(service.error().is_none());
    }

    #[tokio::test]
    async fn test_server_message_becomes_error() {
        let (api, service) = service();
        *api.fail_alerts.lock().unwrap() = Some(ApiError::Status {
            status: 401,
            message: Some("Session expired".to_string()),
        });
        assert!(service.load().await.is_err());
        assert_eq!(service.error().as_deref(), Some("Session expired"));
        assert!(service.snapshot().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_flag_covers_in_flight_load() {
        let (api, service) = service();
        api.resource_script
            .lock()
            .unwrap()
            .push_back((Duration::from_millis(100), vec![water(100, 0)]));

        let background = service.clone();
        let handle = tokio::spawn(async move { background.load().await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(service.is_loading());
        assert!(service.view().loading);

        handle.await.unwrap().unwrap();
        assert!(!service.is_loading());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_load_does_not_overwrite_newer_snapshot() {
        let (api, service) = service();
        {
            let mut script = api.resource_script.lock().unwrap();
            script.push_back((Duration::from_millis(100), vec![water(100, 0)]));
            script.push_back((Duration::ZERO, vec![water(100, 30)]));
        }

        let (slow, fast) = futures::join!(service.load(), service.load());
        let slow = slow.unwrap();
        let fast = fast.unwrap();

        assert_eq!(fast.version, 2);
        // The slow load resolves to the newer published snapshot
        assert_eq!(slow.version, 2);
        let published = service.snapshot().unwrap();
        assert_eq!(published.version, 2);
        assert_eq!(published.resources, vec![water(100, 30)]);
    }

    #[tokio::test]
    async fn test_close_stops_publishing() {
        let (_api, service) = service();
        service.close();
        assert_eq!(service.load().await.unwrap_err(), ApiError::Closed);
        assert!(service.snapshot().is_none());
    }
}
