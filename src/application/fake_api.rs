// In-memory ReliefApi used by the service tests
use crate::application::error::ApiError;
use crate::application::relief_api::ReliefApi;
use crate::domain::request::{
    AllocationRequest, DistrictRequest, NewDistrictRequest, RequestStatus, ReviewPayload,
};
use crate::domain::resource::{ResourceRecord, ResourceType};
use crate::domain::snapshot::{ActivityLog, Alert, DashboardStats, District};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct Counters {
    pub resource_fetches: AtomicUsize,
    pub allocations: AtomicUsize,
    pub request_fetches: AtomicUsize,
    pub reviews: AtomicUsize,
    pub creates: AtomicUsize,
}

impl Counters {
    pub fn get(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }
}

pub struct FakeApi {
    pub resources: Mutex<Vec<ResourceRecord>>,
    pub districts: Mutex<Vec<District>>,
    pub requests: Mutex<Vec<DistrictRequest>>,
    /// Scripted (delay, body) answers for fetch_resources, consumed in call order
    pub resource_script: Mutex<VecDeque<(Duration, Vec<ResourceRecord>)>>,
    pub allocate_delay: Mutex<Duration>,
    pub fail_alerts: Mutex<Option<ApiError>>,
    pub fail_allocate: Mutex<Option<ApiError>>,
    pub fail_review: Mutex<Option<ApiError>>,
    pub sent_allocations: Mutex<Vec<AllocationRequest>>,
    pub sent_reviews: Mutex<Vec<(u64, ReviewPayload)>>,
    pub sent_requests: Mutex<Vec<NewDistrictRequest>>,
    pub counters: Counters,
}

pub fn water(quantity: u64, allocated: u64) -> ResourceRecord {
    ResourceRecord::new(
        "r1".to_string(),
        "Drinking water".to_string(),
        quantity,
        allocated,
        "litres".to_string(),
        Some(ResourceType::Water),
    )
}

pub fn pending_request(id: u64) -> DistrictRequest {
    DistrictRequest {
        id,
        district_id: "d1".to_string(),
        district_name: Some("Colombo".to_string()),
        resource_type: "water".to_string(),
        quantity: 20,
        urgency: None,
        reason: Some("Wells contaminated".to_string()),
        status: RequestStatus::Pending,
        notes: None,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap()
            + ChronoDuration::minutes(id as i64),
        updated_at: None,
    }
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            resources: Mutex::new(vec![water(100, 60)]),
            districts: Mutex::new(vec![District {
                id: "d1".to_string(),
                name: "Colombo".to_string(),
                province: Some("Western".to_string()),
            }]),
            requests: Mutex::new(vec![pending_request(7)]),
            resource_script: Mutex::new(VecDeque::new()),
            allocate_delay: Mutex::new(Duration::ZERO),
            fail_alerts: Mutex::new(None),
            fail_allocate: Mutex::new(None),
            fail_review: Mutex::new(None),
            sent_allocations: Mutex::new(Vec::new()),
            sent_reviews: Mutex::new(Vec::new()),
            sent_requests: Mutex::new(Vec::new()),
            counters: Counters::default(),
        }
    }
}

#[async_trait]
impl ReliefApi for FakeApi {
    async fn fetch_stats(&self) -> Result<DashboardStats, ApiError> {
        Ok(DashboardStats {
            total_districts: self.districts.lock().unwrap().len() as u64,
            ..DashboardStats::default()
        })
    }

    async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError> {
        match self.fail_alerts.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(Vec::new()),
        }
    }

    async fn fetch_districts(&self) -> Result<Vec<District>, ApiError> {
        Ok(self.districts.lock().unwrap().clone())
    }

    async fn fetch_resources(&self) -> Result<Vec<ResourceRecord>, ApiError> {
        self.counters.resource_fetches.fetch_add(1, Ordering::SeqCst);
        let scripted = self.resource_script.lock().unwrap().pop_front();
        match scripted {
            Some((delay, body)) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
            None => Ok(self.resources.lock().unwrap().clone()),
        }
    }

    async fn fetch_activity_logs(&self) -> Result<Vec<ActivityLog>, ApiError> {
        Ok(Vec::new())
    }

    async fn allocate_resource(&self, request: &AllocationRequest) -> Result<(), ApiError> {
        self.counters.allocations.fetch_add(1, Ordering::SeqCst);
        let delay = *self.allocate_delay.lock().unwrap();
        tokio::time::sleep(delay).await;
        if let Some(err) = self.fail_allocate.lock().unwrap().clone() {
            return Err(err);
        }
        self.sent_allocations.lock().unwrap().push(request.clone());
        let mut resources = self.resources.lock().unwrap();
        if let Some(resource) = resources
            .iter_mut()
            .find(|r| r.resource_type == Some(request.resource_type))
        {
            resource.allocated += request.quantity;
        }
        Ok(())
    }

    async fn fetch_district_requests(&self) -> Result<Vec<DistrictRequest>, ApiError> {
        self.counters.request_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.requests.lock().unwrap().clone())
    }

    async fn create_district_request(&self, request: &NewDistrictRequest) -> Result<(), ApiError> {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        self.sent_requests.lock().unwrap().push(request.clone());
        let mut requests = self.requests.lock().unwrap();
        let id = requests.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let mut created = pending_request(id);
        created.resource_type = request.resource_type.to_string();
        created.quantity = request.quantity;
        requests.push(created);
        Ok(())
    }

    async fn review_district_request(&self, id: u64, payload: &ReviewPayload) -> Result<(), ApiError> {
        self.counters.reviews.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.fail_review.lock().unwrap().clone() {
            return Err(err);
        }
        self.sent_reviews.lock().unwrap().push((id, payload.clone()));
        let mut requests = self.requests.lock().unwrap();
        if let Some(request) = requests.iter_mut().find(|r| r.id == id) {
            request.status = match payload.status {
                crate::domain::request::ReviewDecision::Approved => RequestStatus::Approved,
                crate::domain::request::ReviewDecision::Rejected => RequestStatus::Rejected,
            };
            request.notes = payload.notes.clone();
            request.updated_at = Some(request.created_at + ChronoDuration::hours(1));
        }
        Ok(())
    }
}
