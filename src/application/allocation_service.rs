// Allocation service - Provincial resource allocation to districts
use crate::application::dashboard_service::DashboardService;
use crate::application::error::WorkflowError;
use crate::application::notifier::Notifier;
use crate::application::relief_api::ReliefApi;
use crate::application::single_flight::SingleFlight;
use crate::domain::request::AllocationRequest;
use crate::domain::snapshot::DashboardSnapshot;
use crate::domain::validation::AllocationForm;
use std::sync::{Arc, Mutex, PoisonError};

const ALLOCATION_FAILED: &str = "Failed to allocate resources";

#[derive(Clone)]
pub struct AllocationService {
    api: Arc<dyn ReliefApi>,
    dashboard: DashboardService,
    notifier: Notifier,
    flights: SingleFlight,
    active_form: Arc<Mutex<Option<AllocationForm>>>,
}

impl AllocationService {
    pub fn new(api: Arc<dyn ReliefApi>, dashboard: DashboardService, notifier: Notifier) -> Self {
        Self {
            api,
            dashboard,
            notifier,
            flights: SingleFlight::new(),
            active_form: Arc::new(Mutex::new(None)),
        }
    }

    /// Open (or replace) the allocation form the user is editing.
    pub fn open_form(&self, form: AllocationForm) {
        *self.active_form.lock().unwrap_or_else(PoisonError::into_inner) = Some(form);
    }

    pub fn active_form(&self) -> Option<AllocationForm> {
        self.active_form
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn close_form(&self) {
        *self.active_form.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Validate, submit, notify, reload.
    ///
    /// Nothing reaches the network unless the form passes validation against the
    /// latest snapshot and the resource type is known. Only one allocation per
    /// resource may be in flight; a concurrent attempt is refused.
    pub async fn allocate(&self, form: &AllocationForm) -> Result<AllocationRequest, WorkflowError> {
        let resource_id = form.resource_id.trim();
        let Some(_flight) = self.flights.try_acquire(resource_id) else {
            tracing::warn!("Allocation for resource {} already in flight", resource_id);
            self.notifier
                .warning("An allocation for this resource is already in progress");
            return Err(WorkflowError::Busy(format!("allocation of {}", resource_id)));
        };

        let snapshot = self.dashboard.snapshot();
        let request = match prepare_request(form, snapshot.as_deref()) {
            Ok(request) => request,
            Err(WorkflowError::UnresolvableType(name)) => {
                tracing::warn!("No resource type could be resolved for {}", name);
                self.notifier
                    .error(format!("Unable to determine resource type for {}", name));
                return Err(WorkflowError::UnresolvableType(name));
            }
            Err(e) => {
                tracing::debug!("Allocation form rejected: {}", e);
                return Err(e);
            }
        };

        match self.api.allocate_resource(&request).await {
            Ok(()) => {
                tracing::info!(
                    "Allocated {} {} to district {}",
                    request.quantity,
                    request.resource_type,
                    request.district_id
                );
                self.notifier
                    .success(format!("Successfully allocated {} units", request.quantity));
                self.close_form();
                if let Err(e) = self.dashboard.load().await {
                    tracing::warn!("Reload after allocation failed: {}", e);
                    self.notifier
                        .error(e.user_message("Failed to refresh dashboard data"));
                }
                Ok(request)
            }
            Err(e) => {
                tracing::error!("Allocation to district {} failed: {}", request.district_id, e);
                self.notifier.error(e.user_message(ALLOCATION_FAILED));
                Err(WorkflowError::Api(e))
            }
        }
    }
}

/// Turn a validated form into the wire request.
fn prepare_request(
    form: &AllocationForm,
    snapshot: Option<&DashboardSnapshot>,
) -> Result<AllocationRequest, WorkflowError> {
    let errors = form.validate_against(snapshot);
    if !errors.is_empty() {
        return Err(WorkflowError::Validation(errors));
    }

    let resource = snapshot.and_then(|s| s.resource(form.resource_id.trim()));
    let (Some(resource), Some(quantity)) = (resource, form.parsed_quantity()) else {
        return Err(WorkflowError::Validation(errors));
    };
    let resource_type = resource
        .resource_type
        .ok_or_else(|| WorkflowError::UnresolvableType(resource.name.clone()))?;

    Ok(AllocationRequest {
        resource_type,
        district_id: form.district_id.trim().to_string(),
        quantity,
        purpose: form.purpose(),
    })
}
