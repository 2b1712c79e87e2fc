// Wire shapes of the relief backend and their mapping to domain models
use crate::domain::resource::{ResourceRecord, ResourceType};
use serde::Deserialize;

/// List and object bodies come either bare or wrapped in `{"data": ...}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    pub fn into_inner(self) -> T {
        match self {
            Envelope::Wrapped { data } => data,
            Envelope::Bare(data) => data,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

/// Error body; validation failures carry a list of messages.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    message: Option<MessageField>,
}

impl ErrorBody {
    pub fn parse(body: &[u8]) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
        let message = match parsed.message? {
            MessageField::One(message) => message,
            MessageField::Many(messages) => messages.join(", "),
        };
        let message = message.trim().to_string();
        (!message.is_empty()).then_some(message)
    }
}

/// Resource as stored by the backend. Older rows name the type differently.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    #[serde(deserialize_with = "crate::domain::snapshot::string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quantity: u64,
    #[serde(default)]
    pub allocated: u64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ResourceDto {
    /// Candidate type fields in precedence order, then the lower-cased name.
    pub fn resolve_type(&self) -> Option<ResourceType> {
        [&self.kind, &self.resource_type, &self.category]
            .into_iter()
            .flatten()
            .find_map(|value| value.parse::<ResourceType>().ok())
            .or_else(|| self.name.to_lowercase().parse::<ResourceType>().ok())
    }

    pub fn into_record(self) -> ResourceRecord {
        let resource_type = self.resolve_type();
        if resource_type.is_none() {
            tracing::debug!("Resource {} ({}) has no recognised type", self.id, self.name);
        }
        ResourceRecord::new(
            self.id,
            self.name,
            self.quantity,
            self.allocated,
            self.unit.unwrap_or_default(),
            resource_type,
        )
    }
}
