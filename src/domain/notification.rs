// Notification domain model
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
    Info,
    Warning,
}

/// A transient user-facing message. Removed when its ttl elapses or on dismissal;
/// an entry with a zero ttl stays until dismissed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationEntry {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
    #[serde(rename = "ttlMs", serialize_with = "serialize_ttl")]
    pub ttl: Duration,
}

impl NotificationEntry {
    pub fn new(id: u64, message: String, kind: NotificationKind, ttl: Duration) -> Self {
        Self {
            id,
            message,
            kind,
            ttl,
        }
    }

    pub fn expires(&self) -> bool {
        !self.ttl.is_zero()
    }
}

fn serialize_ttl<S: serde::Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(ttl.as_millis() as u64)
}
