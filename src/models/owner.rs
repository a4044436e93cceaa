//! HubSpot owner (user) model.

use serde::Deserialize;

/// A HubSpot user that can own records or attend meetings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Owner {
    pub id: String,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Owner {
    /// Full name, or `Unknown` when neither part is set.
    pub fn display_name(&self) -> String {
        let name = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        );
        let name = name.trim();
        if name.is_empty() {
            "Unknown".to_string()
        } else {
            name.to_string()
        }
    }
}

/// Response of `GET /crm/v3/owners`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OwnerPage {
    #[serde(default)]
    pub results: Vec<Owner>,
}
