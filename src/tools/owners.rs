//! HubSpot user listing, used to find owner and attendee IDs for meetings.

use super::require_token;
use crate::client::AsyncHubSpotClient;
use crate::error::ToolResult;
use crate::format::format_owner;
use std::sync::Arc;

pub struct OwnerTools {
    client: Arc<dyn AsyncHubSpotClient>,
}

impl OwnerTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>) -> Self {
        Self { client }
    }

    /// One `[id] First Last <email>` line per user.
    pub async fn list_users(&self) -> ToolResult<String> {
        require_token(self.client.as_ref())?;

        let owners = self.client.list_owners().await?;
        if owners.is_empty() {
            return Ok("No users found".to_string());
        }
        Ok(owners
            .iter()
            .map(format_owner)
            .collect::<Vec<_>>()
            .join("\n"))
    }
}
