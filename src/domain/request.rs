// Allocation and district request domain models
use super::resource::ResourceType;
use super::snapshot::string_or_number;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of processed requests shown alongside the pending queue.
pub const PROCESSED_DISPLAY_LIMIT: usize = 5;

/// Payload sent to the backend when handing resources to a district.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationRequest {
    pub resource_type: ResourceType,
    pub district_id: String,
    pub quantity: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, RequestStatus::Pending)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewDecision::Approved => "approved",
            ReviewDecision::Rejected => "rejected",
        }
    }
}

/// Body of a review call: `{status, notes}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewPayload {
    pub status: ReviewDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

/// Resource request raised by a district towards its province.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistrictRequest {
    pub id: u64,
    #[serde(deserialize_with = "string_or_number")]
    pub district_id: String,
    #[serde(default)]
    pub district_name: Option<String>,
    pub resource_type: String,
    pub quantity: u64,
    #[serde(default)]
    pub urgency: Option<Urgency>,
    #[serde(default)]
    pub reason: Option<String>,
    pub status: RequestStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl DistrictRequest {
    fn last_touched(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }
}

/// Payload for a new district request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDistrictRequest {
    pub resource_type: ResourceType,
    pub quantity: u64,
    pub urgency: Urgency,
    pub reason: String,
}

/// Full request list plus the pending/processed split used for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RequestBoard {
    requests: Vec<DistrictRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestBoardView {
    pub pending: Vec<DistrictRequest>,
    pub processed: Vec<DistrictRequest>,
    pub total: usize,
}

impl RequestBoard {
    pub fn new(requests: Vec<DistrictRequest>) -> Self {
        Self { requests }
    }

    pub fn all(&self) -> &[DistrictRequest] {
        &self.requests
    }

    pub fn get(&self, id: u64) -> Option<&DistrictRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    /// Pending requests oldest first.
    pub fn pending(&self) -> Vec<DistrictRequest> {
        let mut pending: Vec<DistrictRequest> = self
            .requests
            .iter()
            .filter(|r| r.status.is_pending())
            .cloned()
            .collect();
        pending.sort_by_key(|r| r.created_at);
        pending
    }

    /// Most recently processed requests, capped for display.
    pub fn processed(&self) -> Vec<DistrictRequest> {
        let mut processed: Vec<DistrictRequest> = self
            .requests
            .iter()
            .filter(|r| !r.status.is_pending())
            .cloned()
            .collect();
        processed.sort_by(|a, b| b.last_touched().cmp(&a.last_touched()));
        processed.truncate(PROCESSED_DISPLAY_LIMIT);
        processed
    }

    pub fn view(&self) -> RequestBoardView {
        RequestBoardView {
            pending: self.pending(),
            processed: self.processed(),
            total: self.requests.len(),
        }
    }
}
