// Resource inventory domain model
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of relief supply tracked in the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Food,
    Water,
    Medical,
    Shelter,
    Clothing,
    Equipment,
}

impl ResourceType {
    pub const ALL: [ResourceType; 6] = [
        ResourceType::Food,
        ResourceType::Water,
        ResourceType::Medical,
        ResourceType::Shelter,
        ResourceType::Clothing,
        ResourceType::Equipment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Food => "food",
            ResourceType::Water => "water",
            ResourceType::Medical => "medical",
            ResourceType::Shelter => "shelter",
            ResourceType::Clothing => "clothing",
            ResourceType::Equipment => "equipment",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(ResourceType::Food),
            "water" => Ok(ResourceType::Water),
            "medical" | "medicine" | "medical_supplies" => Ok(ResourceType::Medical),
            "shelter" | "tents" => Ok(ResourceType::Shelter),
            "clothing" => Ok(ResourceType::Clothing),
            "equipment" | "rescue_equipment" => Ok(ResourceType::Equipment),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    pub name: String,
    pub quantity: u64,
    pub allocated: u64,
    pub unit: String,
    /// Resolved once when the record is ingested; `None` when no alias matched.
    pub resource_type: Option<ResourceType>,
}

impl ResourceRecord {
    pub fn new(
        id: String,
        name: String,
        quantity: u64,
        allocated: u64,
        unit: String,
        resource_type: Option<ResourceType>,
    ) -> Self {
        Self {
            id,
            name,
            quantity,
            allocated,
            unit,
            resource_type,
        }
    }

    /// Units still free to hand out.
    pub fn available(&self) -> u64 {
        self.quantity.saturating_sub(self.allocated)
    }
}
