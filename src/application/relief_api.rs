// Port to the relief coordination backend
use crate::application::error::ApiError;
use crate::domain::request::{AllocationRequest, DistrictRequest, NewDistrictRequest, ReviewPayload};
use crate::domain::resource::ResourceRecord;
use crate::domain::snapshot::{ActivityLog, Alert, DashboardStats, District};
use async_trait::async_trait;

#[async_trait]
pub trait ReliefApi: Send + Sync {
    /// Aggregate counters for the dashboard header
    async fn fetch_stats(&self) -> Result<DashboardStats, ApiError>;

    async fn fetch_alerts(&self) -> Result<Vec<Alert>, ApiError>;

    async fn fetch_districts(&self) -> Result<Vec<District>, ApiError>;

    /// Inventory with resource types already resolved
    async fn fetch_resources(&self) -> Result<Vec<ResourceRecord>, ApiError>;

    async fn fetch_activity_logs(&self) -> Result<Vec<ActivityLog>, ApiError>;

    /// Hand part of a resource's balance to a district
    async fn allocate_resource(&self, request: &AllocationRequest) -> Result<(), ApiError>;

    /// Full district request list, pending and processed
    async fn fetch_district_requests(&self) -> Result<Vec<DistrictRequest>, ApiError>;

    async fn create_district_request(&self, request: &NewDistrictRequest) -> Result<(), ApiError>;

    /// Approve or reject a district request
    async fn review_district_request(&self, id: u64, payload: &ReviewPayload) -> Result<(), ApiError>;
}
