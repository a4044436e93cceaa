//! Activity search tools: notes, calls, meetings and emails.
//!
//! Two strategies, chosen by the filters given:
//! - **By association**: when a contact, company or deal ID is present, the
//!   linked IDs are listed (first page only), batch read, filtered
//!   client-side, sorted newest first and truncated.
//! - **By search**: otherwise the search endpoint is queried with date-range
//!   (and kind-specific) filters, sorted newest first.

use super::{default_limit, non_blank, require_token};
use crate::client::AsyncHubSpotClient;
use crate::domain::{AssociationTargets, Labeled, MeetingOutcome, ObjectType, ValidationError};
use crate::error::ToolResult;
use crate::format::{format_all, format_call, format_email, format_meeting, format_note};
use crate::models::properties::{
    CALL_PROPERTIES, EMAIL_PROPERTIES, MEETING_PROPERTIES, NOTE_PROPERTIES,
};
use crate::models::{BatchReadRequest, CrmObject, Filter, FilterOperator, SearchRequest};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for `hubspot_search_notes`. At least one filter is required.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchNotesParams {
    /// Notes linked to this contact
    #[serde(default)]
    pub contact_id: Option<String>,
    /// Notes linked to this company
    #[serde(default)]
    pub company_id: Option<String>,
    /// Notes linked to this project/deal
    #[serde(default)]
    pub deal_id: Option<String>,
    /// Only notes on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub after_date: Option<String>,
    /// Only notes on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub before_date: Option<String>,
    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Parameters for `hubspot_search_calls`. At least one filter is required.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchCallsParams {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    /// Only calls on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub after_date: Option<String>,
    /// Only calls on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub before_date: Option<String>,
    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Parameters for `hubspot_search_meetings`. At least one filter is required.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchMeetingsParams {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    #[serde(default)]
    pub deal_id: Option<String>,
    /// One of: SCHEDULED, COMPLETED, RESCHEDULED, NO_SHOW, CANCELLED
    #[serde(default)]
    pub outcome: Option<String>,
    /// Only meetings on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub after_date: Option<String>,
    /// Only meetings on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub before_date: Option<String>,
    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Parameters for `hubspot_search_emails`. At least one filter is required.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchEmailsParams {
    #[serde(default)]
    pub contact_id: Option<String>,
    #[serde(default)]
    pub company_id: Option<String>,
    /// Partial, case-insensitive subject match
    #[serde(default)]
    pub subject: Option<String>,
    /// Only emails on or after this date (YYYY-MM-DD)
    #[serde(default)]
    pub after_date: Option<String>,
    /// Only emails on or before this date (YYYY-MM-DD)
    #[serde(default)]
    pub before_date: Option<String>,
    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

/// Static description of one searchable engagement type.
struct ActivityKind {
    object_type: ObjectType,
    properties: &'static [&'static str],
    format: fn(&CrmObject) -> String,
    /// Association-path batch size as a multiple of the limit
    batch_factor: usize,
    not_found: &'static str,
    missing_filter: &'static str,
}

const NOTES: ActivityKind = ActivityKind {
    object_type: ObjectType::Notes,
    properties: NOTE_PROPERTIES,
    format: format_note,
    batch_factor: 2,
    not_found: "No notes found",
    missing_filter: "at least one filter (contact_id, company_id, deal_id, or date range)",
};

const CALLS: ActivityKind = ActivityKind {
    object_type: ObjectType::Calls,
    properties: CALL_PROPERTIES,
    format: format_call,
    batch_factor: 2,
    not_found: "No calls found",
    missing_filter: "at least one filter (contact_id, company_id, deal_id, or date range)",
};

const MEETINGS: ActivityKind = ActivityKind {
    object_type: ObjectType::Meetings,
    properties: MEETING_PROPERTIES,
    format: format_meeting,
    batch_factor: 2,
    not_found: "No meetings found",
    missing_filter:
        "at least one filter (contact_id, company_id, deal_id, outcome, or date range)",
};

const EMAILS: ActivityKind = ActivityKind {
    object_type: ObjectType::Emails,
    properties: EMAIL_PROPERTIES,
    format: format_email,
    batch_factor: 3,
    not_found: "No emails found",
    missing_filter: "at least one filter (contact_id, company_id, subject, or date range)",
};

/// Inclusive `YYYY-MM-DD` bounds on `hs_timestamp`.
#[derive(Debug, Clone, Default)]
struct DateRange {
    after: Option<String>,
    before: Option<String>,
}

impl DateRange {
    fn new(after: &Option<String>, before: &Option<String>) -> Self {
        Self {
            after: non_blank(after).map(str::to_string),
            before: non_blank(before).map(str::to_string),
        }
    }

    fn search_filters(&self) -> Vec<Filter> {
        let mut filters = Vec::new();
        if let Some(after) = &self.after {
            filters.push(Filter::new(
                "hs_timestamp",
                FilterOperator::Gte,
                format!("{}T00:00:00Z", after),
            ));
        }
        if let Some(before) = &self.before {
            filters.push(Filter::new(
                "hs_timestamp",
                FilterOperator::Lte,
                format!("{}T23:59:59Z", before),
            ));
        }
        filters
    }

    /// Lexical comparison on ISO timestamps; a missing timestamp sorts as empty.
    fn contains(&self, record: &CrmObject) -> bool {
        let ts = timestamp(record);
        if let Some(after) = &self.after {
            if ts < after.as_str() {
                return false;
            }
        }
        if let Some(before) = &self.before {
            if ts > format!("{}T23:59:59Z", before).as_str() {
                return false;
            }
        }
        true
    }
}

fn timestamp(record: &CrmObject) -> &str {
    record.properties.get_or("hs_timestamp", "")
}

/// Searches engagements by association or by property filters.
pub struct ActivitySearchTools {
    client: Arc<dyn AsyncHubSpotClient>,
}

impl ActivitySearchTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>) -> Self {
        Self { client }
    }

    pub async fn search_notes(&self, params: SearchNotesParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(params.contact_id, params.company_id, params.deal_id);
        let dates = DateRange::new(&params.after_date, &params.before_date);

        match targets.primary() {
            Some((target, id)) => {
                self.by_association(&NOTES, target.object_type(), id, params.limit, |r| {
                    dates.contains(r)
                })
                .await
            }
            None => self.by_search(&NOTES, dates.search_filters(), params.limit).await,
        }
    }

    pub async fn search_calls(&self, params: SearchCallsParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(params.contact_id, params.company_id, params.deal_id);
        let dates = DateRange::new(&params.after_date, &params.before_date);

        match targets.primary() {
            Some((target, id)) => {
                self.by_association(&CALLS, target.object_type(), id, params.limit, |r| {
                    dates.contains(r)
                })
                .await
            }
            None => self.by_search(&CALLS, dates.search_filters(), params.limit).await,
        }
    }

    pub async fn search_meetings(&self, params: SearchMeetingsParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let outcome = non_blank(&params.outcome)
            .map(MeetingOutcome::parse_label)
            .transpose()?;
        let targets = AssociationTargets::new(params.contact_id, params.company_id, params.deal_id);
        let dates = DateRange::new(&params.after_date, &params.before_date);

        match targets.primary() {
            Some((target, id)) => {
                self.by_association(&MEETINGS, target.object_type(), id, params.limit, |r| {
                    outcome.map_or(true, |o| {
                        r.properties.get("hs_meeting_outcome") == Some(o.internal())
                    }) && dates.contains(r)
                })
                .await
            }
            None => {
                let mut filters = Vec::new();
                if let Some(outcome) = outcome {
                    filters.push(Filter::new(
                        "hs_meeting_outcome",
                        FilterOperator::Eq,
                        outcome.internal(),
                    ));
                }
                filters.extend(dates.search_filters());
                self.by_search(&MEETINGS, filters, params.limit).await
            }
        }
    }

    pub async fn search_emails(&self, params: SearchEmailsParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let targets = AssociationTargets::new(params.contact_id, params.company_id, None);
        let dates = DateRange::new(&params.after_date, &params.before_date);
        let subject = non_blank(&params.subject);

        match targets.primary() {
            Some((target, id)) => {
                let needle = subject.map(str::to_lowercase);
                self.by_association(&EMAILS, target.object_type(), id, params.limit, |r| {
                    needle.as_deref().map_or(true, |needle| {
                        r.properties
                            .get_or("hs_email_subject", "")
                            .to_lowercase()
                            .contains(needle)
                    }) && dates.contains(r)
                })
                .await
            }
            None => {
                let mut filters = Vec::new();
                if let Some(subject) = subject {
                    filters.push(Filter::new(
                        "hs_email_subject",
                        FilterOperator::ContainsToken,
                        subject,
                    ));
                }
                filters.extend(dates.search_filters());
                self.by_search(&EMAILS, filters, params.limit).await
            }
        }
    }

    async fn by_association<F>(
        &self,
        kind: &ActivityKind,
        from: ObjectType,
        id: &str,
        limit: usize,
        keep: F,
    ) -> ToolResult<String>
    where
        F: Fn(&CrmObject) -> bool + Send + Sync,
    {
        let mut ids = self
            .client
            .associated_ids(from, id, kind.object_type)
            .await?;
        if ids.is_empty() {
            return Ok(kind.not_found.to_string());
        }
        ids.truncate(limit.saturating_mul(kind.batch_factor));

        let mut records = self
            .client
            .batch_read(kind.object_type, BatchReadRequest::new(kind.properties, &ids))
            .await?;
        records.retain(|r| keep(r));
        records.sort_by(|a, b| timestamp(b).cmp(timestamp(a)));
        records.truncate(limit);

        if records.is_empty() {
            return Ok(kind.not_found.to_string());
        }
        Ok(format_all(&records, kind.format, "\n\n"))
    }

    async fn by_search(
        &self,
        kind: &ActivityKind,
        filters: Vec<Filter>,
        limit: usize,
    ) -> ToolResult<String> {
        if filters.is_empty() {
            return Err(ValidationError::MissingFilter(kind.missing_filter).into());
        }

        let request = SearchRequest::new(kind.properties, limit)
            .all_of(filters)
            .sort_descending("hs_timestamp");
        let records = self.client.search_objects(kind.object_type, request).await?;
        if records.is_empty() {
            return Ok(kind.not_found.to_string());
        }
        Ok(format_all(&records, kind.format, "\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Properties;

    fn at(ts: &str) -> CrmObject {
        CrmObject::new("1", [("hs_timestamp", ts)].into_iter().collect::<Properties>())
    }

    #[test]
    fn test_date_range_bounds_are_inclusive() {
        let range = DateRange::new(&Some("2024-01-10".to_string()), &Some("2024-01-20".to_string()));
        assert!(range.contains(&at("2024-01-10T00:00:00Z")));
        assert!(range.contains(&at("2024-01-20T23:59:59Z")));
        assert!(!range.contains(&at("2024-01-09T23:59:59Z")));
        assert!(!range.contains(&at("2024-01-21T00:00:00Z")));
    }

    #[test]
    fn test_date_range_search_filters() {
        let range = DateRange::new(&Some("2024-01-10".to_string()), &None);
        let filters = range.search_filters();
        assert_eq!(filters.len(), 1);
        assert_eq!(filters[0].operator, FilterOperator::Gte);
        assert_eq!(filters[0].value, "2024-01-10T00:00:00Z");
        assert!(DateRange::default().search_filters().is_empty());
    }

    #[test]
    fn test_missing_timestamp_fails_lower_bound() {
        let range = DateRange::new(&Some("2024-01-10".to_string()), &None);
        let record = CrmObject::new("2", Properties::default());
        assert!(!range.contains(&record));
    }
}
