//! Engagement logging tools: notes, calls and meetings.
//!
//! Every engagement must be linked to at least one contact, company or deal.
//! Call and meeting times are given as local wall-clock times and converted
//! to UTC using the caller's zone, or the configured default zone.

use super::{non_blank, require_field, require_token};
use crate::client::AsyncHubSpotClient;
use crate::domain::time::{format_millis, format_seconds, local_to_utc, parse_timezone};
use crate::domain::{
    build_associations, AssociationTargets, CallDirection, CallOutcome, EngagementType, Labeled,
    MeetingOutcome,
};
use crate::error::ToolResult;
use crate::models::{CreateObjectRequest, PropertyMap};
use chrono::Utc;
use chrono_tz::Tz;
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for `hubspot_add_note`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct AddNoteParams {
    /// Note text (required)
    pub body: String,
    /// Associate with this contact
    #[serde(default)]
    pub contact_id: Option<String>,
    /// Associate with this company
    #[serde(default)]
    pub company_id: Option<String>,
    /// Associate with this project/deal
    #[serde(default)]
    pub deal_id: Option<String>,
}

/// Parameters for `hubspot_log_call`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LogCallParams {
    /// Call title (required)
    pub title: String,
    /// Call notes
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<u32>,
    /// One of: Connected, Busy, No answer, Left voicemail, Left live message, Wrong number
    #[serde(default)]
    pub outcome: Option<String>,
    /// INBOUND or OUTBOUND
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    /// When the call happened, in LOCAL time (YYYY-MM-DDTHH:MM:SS). Defaults to now.
    #[serde(default)]
    pub call_time: Option<String>,
    /// IANA timezone for call_time (default: the server's configured zone)
    #[serde(default)]
    pub tz: Option<String>,
}

/// Parameters for `hubspot_log_meeting`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct LogMeetingParams {
    /// Meeting title (required)
    pub title: String,
    /// Meeting notes
    #[serde(default)]
    pub body: Option<String>,
    /// Start in LOCAL time (YYYY-MM-DDTHH:MM:SS). Defaults to now.
    #[serde(default)]
    pub start_time: Option<String>,
    /// End in LOCAL time (YYYY-MM-DDTHH:MM:SS)
    #[serde(default)]
    pub end_time: Option<String>,
    /// Room, video link or address
    #[serde(default)]
    pub location: Option<String>,
    /// One of: SCHEDULED, COMPLETED, RESCHEDULED, NO_SHOW, CANCELLED
    #[serde(default)]
    pub outcome: Option<String>,
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    /// IANA timezone for the given times (default: the server's configured zone)
    #[serde(default)]
    pub tz: Option<String>,
    /// HubSpot user ID of the organizer (see hubspot_list_users)
    #[serde(default)]
    pub owner_id: Option<String>,
    /// HubSpot user IDs of internal attendees
    #[serde(default)]
    pub attendee_ids: Option<Vec<String>>,
}

/// Creates notes, calls and meetings linked to CRM records.
pub struct EngagementTools {
    client: Arc<dyn AsyncHubSpotClient>,
    default_timezone: Tz,
}

impl EngagementTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>, default_timezone: Tz) -> Self {
        Self {
            client,
            default_timezone,
        }
    }

    fn timezone(&self, tz: &Option<String>) -> ToolResult<Tz> {
        match non_blank(tz) {
            Some(name) => Ok(parse_timezone(name)?),
            None => Ok(self.default_timezone),
        }
    }

    /// POST the engagement and return its new ID.
    async fn create(
        &self,
        engagement: EngagementType,
        properties: PropertyMap,
        targets: &AssociationTargets,
    ) -> ToolResult<String> {
        let request = CreateObjectRequest::new(properties)
            .with_associations(build_associations(engagement, targets));
        let created = self
            .client
            .create_object(engagement.object_type(), request)
            .await?;
        tracing::info!("Created {} {}", engagement.object_type(), created.id);
        Ok(created.id)
    }

    pub async fn add_note(&self, params: AddNoteParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(params.contact_id, params.company_id, params.deal_id);
        targets.require_any()?;
        let body = require_field(&params.body, "body")?;

        let mut properties = PropertyMap::new();
        properties.insert("hs_timestamp", format_millis(&Utc::now()));
        properties.insert("hs_note_body", body);

        let id = self.create(EngagementType::Note, properties, &targets).await?;
        Ok(format!("Note added successfully [ID: {}]", id))
    }

    pub async fn log_call(&self, params: LogCallParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(
            params.contact_id.clone(),
            params.company_id.clone(),
            params.deal_id.clone(),
        );
        targets.require_any()?;
        let title = require_field(&params.title, "title")?;
        let outcome = non_blank(&params.outcome)
            .map(CallOutcome::parse_label)
            .transpose()?;
        let direction = non_blank(&params.direction)
            .map(CallDirection::parse_label)
            .transpose()?;

        let timestamp = match non_blank(&params.call_time) {
            Some(local) => local_to_utc(local, self.timezone(&params.tz)?)?,
            None => Utc::now(),
        };

        let mut properties = PropertyMap::new();
        properties.insert("hs_timestamp", format_millis(&timestamp));
        properties.insert("hs_call_title", title);
        properties.insert("hs_call_status", "COMPLETED");
        properties.insert_opt("hs_call_body", non_blank(&params.body));
        properties.insert_opt(
            "hs_call_duration",
            params
                .duration_minutes
                .map(|minutes| (u64::from(minutes) * 60_000).to_string()),
        );
        properties.insert_opt("hs_call_disposition", outcome.map(|o| o.internal()));
        properties.insert_opt("hs_call_direction", direction.map(|d| d.internal()));

        let id = self.create(EngagementType::Call, properties, &targets).await?;
        Ok(format!("Call logged successfully [ID: {}]", id))
    }

    pub async fn log_meeting(&self, params: LogMeetingParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(
            params.contact_id.clone(),
            params.company_id.clone(),
            params.deal_id.clone(),
        );
        targets.require_any()?;
        let title = require_field(&params.title, "title")?;
        let outcome = non_blank(&params.outcome)
            .map(MeetingOutcome::parse_label)
            .transpose()?;
        let tz = self.timezone(&params.tz)?;

        let start = non_blank(&params.start_time)
            .map(|local| local_to_utc(local, tz))
            .transpose()?;
        let end = non_blank(&params.end_time)
            .map(|local| local_to_utc(local, tz))
            .transpose()?;
        let timestamp = format_seconds(&start.unwrap_or_else(Utc::now));

        let mut properties = PropertyMap::new();
        properties.insert("hs_meeting_title", title);
        properties.insert_opt("hs_meeting_body", non_blank(&params.body));
        if start.is_some() {
            properties.insert("hs_meeting_start_time", timestamp.clone());
        }
        properties.insert("hs_timestamp", timestamp);
        properties.insert_opt("hs_meeting_end_time", end.as_ref().map(format_seconds));
        properties.insert_opt("hs_meeting_location", non_blank(&params.location));
        properties.insert_opt("hs_meeting_outcome", outcome.map(|o| o.internal()));
        properties.insert_opt("hubspot_owner_id", non_blank(&params.owner_id));
        let attendees = params
            .attendee_ids
            .as_ref()
            .map(|ids| {
                ids.iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .collect::<Vec<_>>()
                    .join(";")
            });
        properties.insert_opt("hs_attendee_owner_ids", attendees);

        let id = self
            .create(EngagementType::Meeting, properties, &targets)
            .await?;
        Ok(format!("Meeting logged successfully [ID: {}]", id))
    }
}
