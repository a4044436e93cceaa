//! MCP tools for HubSpot CRM, Teams transcripts and related utilities.
//!
//! Tools are grouped by entity:
//! - **Contacts**, **Companies**, **Projects** (HubSpot deals): search, read, create, update
//! - **Engagements**: add notes, log calls and meetings
//! - **Activity**: search notes, calls, meetings and emails
//! - **Owners**: list HubSpot users
//! - **Transcripts**: download a Teams meeting transcript through Microsoft Graph
//!
//! Every operation returns `ToolResult<String>`; both arms are caller-facing text.

pub mod activity;
pub mod companies;
pub mod contacts;
pub mod engagements;
pub mod owners;
pub mod projects;
pub mod transcripts;

pub use activity::{
    ActivitySearchTools, SearchCallsParams, SearchEmailsParams, SearchMeetingsParams,
    SearchNotesParams,
};
pub use companies::{
    CompanyIdParams, CompanyTools, CreateCompanyParams, SearchCompaniesParams,
    UpdateCompanyParams,
};
pub use contacts::{
    ContactIdParams, ContactTools, CreateContactParams, SearchContactsParams, UpdateContactParams,
};
pub use engagements::{AddNoteParams, EngagementTools, LogCallParams, LogMeetingParams};
pub use owners::OwnerTools;
pub use projects::{
    CreateProjectParams, ProjectIdParams, ProjectTools, SearchProjectsParams, UpdateProjectParams,
};
pub use transcripts::{FetchTranscriptParams, TranscriptTools};

use crate::client::AsyncHubSpotClient;
use crate::domain::{ObjectType, ValidationError};
use crate::error::{ToolError, ToolResult};
use crate::models::{CrmObject, PropertyMap, UpdateObjectRequest};

/// Default page size for searches.
pub(crate) fn default_limit() -> usize {
    10
}

/// Fail fast when no HubSpot token is configured.
pub(crate) fn require_token(client: &dyn AsyncHubSpotClient) -> ToolResult<()> {
    if client.has_access_token() {
        Ok(())
    } else {
        Err(ToolError::MissingToken)
    }
}

/// Trimmed value of a required field.
pub(crate) fn require_field<'a>(value: &'a str, field: &'static str) -> ToolResult<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::EmptyField(field).into());
    }
    Ok(value)
}

/// A value only if present and not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Partial update followed by a full re-read.
///
/// The PATCH response only carries changed properties, so the record is
/// fetched again; if that read fails the PATCH response is formatted instead.
pub(crate) async fn update_and_reread(
    client: &dyn AsyncHubSpotClient,
    object_type: ObjectType,
    id: &str,
    properties: PropertyMap,
    read_properties: &'static [&'static str],
    entity: &'static str,
    formatter: fn(&CrmObject) -> String,
) -> ToolResult<String> {
    if properties.is_empty() {
        return Err(ToolError::NoProperties);
    }

    let patched = client
        .update_object(object_type, id, UpdateObjectRequest { properties })
        .await
        .map_err(|e| ToolError::for_entity(entity, e))?;

    match client.get_object(object_type, id, read_properties, None).await {
        Ok(full) => Ok(formatter(&full)),
        Err(e) => {
            tracing::warn!("Re-read of {} {} failed: {}", object_type, id, e);
            Ok(formatter(&patched))
        }
    }
}
