// Dashboard snapshot domain model
use super::resource::ResourceRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Backend ids arrive as strings or numbers depending on the table.
pub(crate) fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_alerts: u64,
    pub active_alerts: u64,
    pub pending_sos: u64,
    pub total_shelters: u64,
    pub shelter_occupancy: u64,
    pub total_districts: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub severity: String,
    #[serde(default)]
    pub alert_type: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct District {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub province: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityLog {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub action: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Aggregated view-state for one dashboard.
///
/// Built in one piece from a completed fan-out and never patched afterwards; a
/// refresh produces a new value with a higher `version`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub version: u64,
    pub stats: DashboardStats,
    pub alerts: Vec<Alert>,
    pub districts: Vec<District>,
    pub resources: Vec<ResourceRecord>,
    pub activity_logs: Vec<ActivityLog>,
}

impl DashboardSnapshot {
    pub fn new(
        version: u64,
        stats: DashboardStats,
        alerts: Vec<Alert>,
        districts: Vec<District>,
        resources: Vec<ResourceRecord>,
        activity_logs: Vec<ActivityLog>,
    ) -> Self {
        Self {
            version,
            stats,
            alerts,
            districts,
            resources,
            activity_logs,
        }
    }

    pub fn resource(&self, id: &str) -> Option<&ResourceRecord> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn district(&self, id: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }
}
