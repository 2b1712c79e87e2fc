// Client-side form validation mirroring the backend DTO constraints
use super::request::{NewDistrictRequest, Urgency};
use super::resource::ResourceType;
use super::snapshot::DashboardSnapshot;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const SEVERITIES: &[&str] = &["low", "medium", "high", "critical"];
pub const ALERT_TYPES: &[&str] = &[
    "flood",
    "landslide",
    "cyclone",
    "tsunami",
    "drought",
    "fire",
    "other",
];
pub const SHELTER_STATUSES: &[&str] = &["open", "full", "closed"];
pub const URGENCIES: &[&str] = &["low", "medium", "high", "critical"];

const MAX_PURPOSE_LEN: usize = 500;
const MAX_QUANTITY: i64 = 1_000_000;

/// Field name -> message. Rebuilt from scratch on every validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrorMap(BTreeMap<String, String>);

impl FieldErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        // First failing rule wins for a field
        self.0.entry(field.to_string()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.remove(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keep only the errors of the given fields.
    pub fn restricted_to(mut self, fields: &BTreeSet<&'static str>) -> Self {
        self.0.retain(|k, _| fields.contains(k.as_str()));
        self
    }
}

/// Numeric inputs may be posted as JSON numbers or as the raw text of an input box.
fn form_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Option::<serde_json::Value>::deserialize(deserializer)? {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(text)) => text,
        Some(other) => other.to_string(),
    })
}

pub trait Validate {
    fn validate(&self) -> FieldErrorMap;
}

/// A form whose fields can be edited by name.
pub trait FormFields: Validate {
    const FIELDS: &'static [&'static str];

    fn set_field(&mut self, field: &str, value: String) -> bool;
}

fn required(errors: &mut FieldErrorMap, field: &str, label: &str, value: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, format!("{} is required", label));
        return false;
    }
    true
}

fn length(errors: &mut FieldErrorMap, field: &str, label: &str, value: &str, min: usize, max: usize) {
    let len = value.trim().chars().count();
    if len < min || len > max {
        errors.insert(
            field,
            format!("{} must be between {} and {} characters", label, min, max),
        );
    }
}

fn integer(
    errors: &mut FieldErrorMap,
    field: &str,
    label: &str,
    value: &str,
    min: i64,
    max: i64,
) -> Option<i64> {
    let parsed = match value.trim().parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            errors.insert(field, format!("{} must be a whole number", label));
            return None;
        }
    };
    if parsed < min || parsed > max {
        errors.insert(field, format!("{} must be between {} and {}", label, min, max));
        return None;
    }
    Some(parsed)
}

fn one_of(errors: &mut FieldErrorMap, field: &str, label: &str, value: &str, allowed: &[&str]) {
    if !allowed.contains(&value.trim().to_lowercase().as_str()) {
        errors.insert(
            field,
            format!("{} must be one of: {}", label, allowed.join(", ")),
        );
    }
}

fn resource_type(errors: &mut FieldErrorMap, field: &str, value: &str) -> Option<ResourceType> {
    if !required(errors, field, "Resource type", value) {
        return None;
    }
    match value.parse::<ResourceType>() {
        Ok(kind) => Some(kind),
        Err(_) => {
            let names: Vec<&str> = ResourceType::ALL.iter().map(|t| t.as_str()).collect();
            errors.insert(
                field,
                format!("Resource type must be one of: {}", names.join(", ")),
            );
            None
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertForm {
    pub title: String,
    pub description: String,
    pub severity: String,
    pub alert_type: String,
    pub location: String,
}

impl Validate for AlertForm {
    fn validate(&self) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        if required(&mut errors, "title", "Title", &self.title) {
            length(&mut errors, "title", "Title", &self.title, 5, 200);
        }
        if required(&mut errors, "description", "Description", &self.description) {
            length(&mut errors, "description", "Description", &self.description, 10, 2000);
        }
        if required(&mut errors, "severity", "Severity", &self.severity) {
            one_of(&mut errors, "severity", "Severity", &self.severity, SEVERITIES);
        }
        if required(&mut errors, "alertType", "Alert type", &self.alert_type) {
            one_of(&mut errors, "alertType", "Alert type", &self.alert_type, ALERT_TYPES);
        }
        required(&mut errors, "location", "Location", &self.location);
        errors
    }
}

impl FormFields for AlertForm {
    const FIELDS: &'static [&'static str] =
        &["title", "description", "severity", "alertType", "location"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "title" => self.title = value,
            "description" => self.description = value,
            "severity" => self.severity = value,
            "alertType" => self.alert_type = value,
            "location" => self.location = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShelterForm {
    pub name: String,
    pub district_id: String,
    #[serde(deserialize_with = "form_text")]
    pub capacity: String,
    #[serde(deserialize_with = "form_text")]
    pub current_occupancy: String,
    pub status: String,
}

impl Validate for ShelterForm {
    fn validate(&self) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        if required(&mut errors, "name", "Name", &self.name) {
            length(&mut errors, "name", "Name", &self.name, 3, 100);
        }
        required(&mut errors, "districtId", "District", &self.district_id);

        let capacity = if required(&mut errors, "capacity", "Capacity", &self.capacity) {
            integer(&mut errors, "capacity", "Capacity", &self.capacity, 1, 100_000)
        } else {
            None
        };
        let occupancy = if required(
            &mut errors,
            "currentOccupancy",
            "Current occupancy",
            &self.current_occupancy,
        ) {
            integer(
                &mut errors,
                "currentOccupancy",
                "Current occupancy",
                &self.current_occupancy,
                0,
                100_000,
            )
        } else {
            None
        };
        if let (Some(capacity), Some(occupancy)) = (capacity, occupancy) {
            if occupancy > capacity {
                errors.insert("currentOccupancy", "Current occupancy cannot exceed capacity");
            }
        }

        if required(&mut errors, "status", "Status", &self.status) {
            one_of(&mut errors, "status", "Status", &self.status, SHELTER_STATUSES);
        }
        errors
    }
}

impl FormFields for ShelterForm {
    const FIELDS: &'static [&'static str] =
        &["name", "districtId", "capacity", "currentOccupancy", "status"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "name" => self.name = value,
            "districtId" => self.district_id = value,
            "capacity" => self.capacity = value,
            "currentOccupancy" => self.current_occupancy = value,
            "status" => self.status = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceForm {
    pub name: String,
    pub resource_type: String,
    #[serde(deserialize_with = "form_text")]
    pub quantity: String,
    #[serde(deserialize_with = "form_text")]
    pub allocated: String,
    pub unit: String,
}

impl Validate for ResourceForm {
    fn validate(&self) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        if required(&mut errors, "name", "Name", &self.name) {
            length(&mut errors, "name", "Name", &self.name, 2, 100);
        }
        resource_type(&mut errors, "resourceType", &self.resource_type);
        let quantity = if required(&mut errors, "quantity", "Quantity", &self.quantity) {
            integer(&mut errors, "quantity", "Quantity", &self.quantity, 0, MAX_QUANTITY)
        } else {
            None
        };
        // Allocated is optional on creation
        if !self.allocated.trim().is_empty() {
            let allocated =
                integer(&mut errors, "allocated", "Allocated", &self.allocated, 0, MAX_QUANTITY);
            if let (Some(quantity), Some(allocated)) = (quantity, allocated) {
                if allocated > quantity {
                    errors.insert("allocated", "Allocated amount cannot exceed quantity");
                }
            }
        }
        required(&mut errors, "unit", "Unit", &self.unit);
        errors
    }
}

impl FormFields for ResourceForm {
    const FIELDS: &'static [&'static str] =
        &["name", "resourceType", "quantity", "allocated", "unit"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "name" => self.name = value,
            "resourceType" => self.resource_type = value,
            "quantity" => self.quantity = value,
            "allocated" => self.allocated = value,
            "unit" => self.unit = value,
            _ => return false,
        }
        true
    }
}

/// District-to-province resource request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceRequestForm {
    pub resource_type: String,
    #[serde(deserialize_with = "form_text")]
    pub quantity: String,
    pub urgency: String,
    pub reason: String,
}

impl ResourceRequestForm {
    /// Build the payload once the form is clean.
    pub fn to_request(&self) -> Result<NewDistrictRequest, FieldErrorMap> {
        let errors = self.validate();
        if !errors.is_empty() {
            return Err(errors);
        }
        let mut errors = FieldErrorMap::new();
        let resource_type = resource_type(&mut errors, "resourceType", &self.resource_type);
        let quantity = integer(&mut errors, "quantity", "Quantity", &self.quantity, 1, MAX_QUANTITY);
        let urgency = serde_json::from_value::<Urgency>(serde_json::Value::String(
            self.urgency.trim().to_lowercase(),
        ))
        .ok();
        match (resource_type, quantity, urgency) {
            (Some(resource_type), Some(quantity), Some(urgency)) => Ok(NewDistrictRequest {
                resource_type,
                quantity: quantity as u64,
                urgency,
                reason: self.reason.trim().to_string(),
            }),
            _ => {
                errors.insert("urgency", "Urgency is invalid");
                Err(errors)
            }
        }
    }
}

impl Validate for ResourceRequestForm {
    fn validate(&self) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        resource_type(&mut errors, "resourceType", &self.resource_type);
        if required(&mut errors, "quantity", "Quantity", &self.quantity) {
            integer(&mut errors, "quantity", "Quantity", &self.quantity, 1, MAX_QUANTITY);
        }
        if required(&mut errors, "urgency", "Urgency", &self.urgency) {
            one_of(&mut errors, "urgency", "Urgency", &self.urgency, URGENCIES);
        }
        if required(&mut errors, "reason", "Reason", &self.reason) {
            length(&mut errors, "reason", "Reason", &self.reason, 10, 500);
        }
        errors
    }
}

impl FormFields for ResourceRequestForm {
    const FIELDS: &'static [&'static str] = &["resourceType", "quantity", "urgency", "reason"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "resourceType" => self.resource_type = value,
            "quantity" => self.quantity = value,
            "urgency" => self.urgency = value,
            "reason" => self.reason = value,
            _ => return false,
        }
        true
    }
}

/// Provincial allocation of an inventory resource to a district.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AllocationForm {
    #[serde(deserialize_with = "form_text")]
    pub resource_id: String,
    #[serde(deserialize_with = "form_text")]
    pub district_id: String,
    #[serde(deserialize_with = "form_text")]
    pub quantity: String,
    pub purpose: String,
}

impl AllocationForm {
    /// Context-free checks plus the checks that need the current snapshot:
    /// known resource, known district, and quantity within the available balance.
    pub fn validate_against(&self, snapshot: Option<&DashboardSnapshot>) -> FieldErrorMap {
        let mut errors = self.validate();
        let Some(snapshot) = snapshot else {
            errors.insert("resourceId", "Dashboard data is not loaded yet");
            return errors;
        };

        if !errors.contains("districtId") && snapshot.district(self.district_id.trim()).is_none() {
            errors.insert("districtId", "Select a valid district");
        }

        if !errors.contains("resourceId") {
            match snapshot.resource(self.resource_id.trim()) {
                None => errors.insert("resourceId", "Select a valid resource"),
                Some(resource) => {
                    if let Ok(quantity) = self.quantity.trim().parse::<u64>() {
                        let available = resource.available();
                        if !errors.contains("quantity") && quantity > available {
                            errors.insert(
                                "quantity",
                                format!("cannot allocate more than {} available", available),
                            );
                        }
                    }
                }
            }
        }
        errors
    }

    pub fn parsed_quantity(&self) -> Option<u64> {
        self.quantity.trim().parse::<u64>().ok()
    }

    pub fn purpose(&self) -> Option<String> {
        let purpose = self.purpose.trim();
        (!purpose.is_empty()).then(|| purpose.to_string())
    }
}

impl Validate for AllocationForm {
    fn validate(&self) -> FieldErrorMap {
        let mut errors = FieldErrorMap::new();
        required(&mut errors, "resourceId", "Resource", &self.resource_id);
        required(&mut errors, "districtId", "District", &self.district_id);
        if required(&mut errors, "quantity", "Quantity", &self.quantity) {
            integer(&mut errors, "quantity", "Quantity", &self.quantity, 1, MAX_QUANTITY);
        }
        if self.purpose.trim().chars().count() > MAX_PURPOSE_LEN {
            errors.insert(
                "purpose",
                format!("Purpose must be at most {} characters", MAX_PURPOSE_LEN),
            );
        }
        errors
    }
}

impl FormFields for AllocationForm {
    const FIELDS: &'static [&'static str] = &["resourceId", "districtId", "quantity", "purpose"];

    fn set_field(&mut self, field: &str, value: String) -> bool {
        match field {
            "resourceId" => self.resource_id = value,
            "districtId" => self.district_id = value,
            "quantity" => self.quantity = value,
            "purpose" => self.purpose = value,
            _ => return false,
        }
        true
    }
}

/// Interaction state of one form: blur validates touched fields, editing clears the
/// edited field's error, submit validates everything and blocks on any error.
#[derive(Debug, Clone)]
pub struct FormState<F: FormFields> {
    form: F,
    touched: BTreeSet<&'static str>,
    errors: FieldErrorMap,
}

impl<F: FormFields> FormState<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            touched: BTreeSet::new(),
            errors: FieldErrorMap::new(),
        }
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn errors(&self) -> &FieldErrorMap {
        &self.errors
    }

    pub fn edit(&mut self, field: &str, value: impl Into<String>) -> bool {
        let changed = self.form.set_field(field, value.into());
        if changed {
            self.errors.remove(field);
        }
        changed
    }

    pub fn blur(&mut self, field: &str) {
        if let Some(name) = F::FIELDS.iter().find(|f| **f == field) {
            self.touched.insert(*name);
        }
        self.errors = self.form.validate().restricted_to(&self.touched);
    }

    pub fn submit(&mut self) -> Result<&F, &FieldErrorMap> {
        self.touched.extend(F::FIELDS.iter().copied());
        self.errors = self.form.validate();
        if self.errors.is_empty() {
            Ok(&self.form)
        } else {
            Err(&self.errors)
        }
    }
}
