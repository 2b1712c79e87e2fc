// Administrative role of the signed-in user
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    National,
    #[default]
    Provincial,
    District,
    Civilian,
}

impl Role {
    /// Path segment scoping every API call for this role.
    pub fn scope(&self) -> &'static str {
        match self {
            Role::National => "national",
            Role::Provincial => "provincial",
            Role::District => "district",
            Role::Civilian => "civilian",
        }
    }
}
