//! Display formatting for CRM records.
//!
//! Each formatter turns one [`CrmObject`] into the multi-line text returned
//! to the MCP caller. Optional lines are indented by two spaces and only
//! emitted when the property is set. Internal values are reverse mapped to
//! labels where a label table exists.

use crate::domain::{CallOutcome, DealStage, IcpTier, Labeled};
use crate::models::{CrmObject, Owner};

/// First `max` characters of `text`.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// `2024-01-15T17:30:00.000Z` -> `2024-01-15 17:30`.
pub fn short_timestamp(ts: &str) -> String {
    truncate_chars(ts, 16).replace('T', " ")
}

/// `HH:MM` part of an ISO timestamp.
fn clock_time(ts: &str) -> String {
    ts.chars().skip(11).take(5).collect()
}

pub fn format_contact(contact: &CrmObject) -> String {
    let props = &contact.properties;
    let name = format!(
        "{} {}",
        props.get_or("firstname", ""),
        props.get_or("lastname", "")
    );
    format!(
        "[{}] {} | {} | {}",
        contact.id,
        name.trim(),
        props.get_or("email", ""),
        props.get_or("jobtitle", "")
    )
}

pub fn format_company(company: &CrmObject) -> String {
    let props = &company.properties;
    let mut lines = vec![format!("[{}] {}", company.id, props.get_or("name", "Unnamed"))];

    if let Some(domain) = props.get("domain") {
        lines.push(format!("  Website: {}", domain));
    }
    if props.get("city").is_some() || props.get("state").is_some() {
        let location = format!(
            "Location: {} {}",
            props.get_or("city", ""),
            props.get_or("state", "")
        );
        lines.push(format!("  {}", location.trim()));
    }
    if let Some(status) = props.get("hs_lead_status") {
        lines.push(format!("  Lead Status: {}", status));
    }
    if let Some(tier) = props.get("hs_ideal_customer_profile") {
        lines.push(format!("  ICP Tier: {}", IcpTier::display_internal(tier)));
    }
    if let Some(units) = props.get("annual_unit_volume") {
        lines.push(format!("  Annual Units: {}", units));
    }
    if let Some(types) = props.get("product_types") {
        lines.push(format!("  Product Types: {}", types));
    }
    lines.join("\n")
}

pub fn format_project(deal: &CrmObject) -> String {
    let props = &deal.properties;
    let mut lines = vec![format!(
        "[{}] {}",
        deal.id,
        props.get_or("dealname", "Unnamed Project")
    )];

    if let Some(stage) = props.get("dealstage") {
        lines.push(format!("  Stage: {}", DealStage::display_internal(stage)));
    }
    let optional = [
        ("City", "city"),
        ("Units", "number_of_units"),
        ("Product Type", "product_type"),
        ("Launch Date", "launch_date"),
        ("Map", "google_maps_link"),
    ];
    for (label, key) in optional {
        if let Some(value) = props.get(key) {
            lines.push(format!("  {}: {}", label, value));
        }
    }
    lines.join("\n")
}

pub fn format_note(note: &CrmObject) -> String {
    let props = &note.properties;
    let mut header = format!("[{}]", note.id);
    if let Some(ts) = props.get("hs_timestamp") {
        header.push(' ');
        header.push_str(&short_timestamp(ts));
    }

    match props.get("hs_note_body") {
        Some(body) => format!("{}\n  {}", header, truncate_chars(body, 300)),
        None => header,
    }
}

pub fn format_call(call: &CrmObject) -> String {
    let props = &call.properties;
    let mut lines = vec![format!(
        "[{}] {}",
        call.id,
        props.get_or("hs_call_title", "Untitled")
    )];

    if let Some(ts) = props.get("hs_timestamp") {
        lines.push(format!("  Date: {}", short_timestamp(ts)));
    }
    if let Some(direction) = props.get("hs_call_direction") {
        lines.push(format!("  Direction: {}", direction));
    }
    if let Some(Ok(ms)) = props.get("hs_call_duration").map(|d| d.trim().parse::<i64>()) {
        lines.push(format!("  Duration: {} min", ms / 60_000));
    }
    if let Some(disposition) = props.get("hs_call_disposition") {
        lines.push(format!(
            "  Outcome: {}",
            CallOutcome::display_internal(disposition)
        ));
    }
    if let Some(body) = props.get("hs_call_body") {
        lines.push(format!("  Notes: {}", truncate_chars(body, 200)));
    }
    lines.join("\n")
}

pub fn format_meeting(meeting: &CrmObject) -> String {
    let props = &meeting.properties;
    let mut lines = vec![format!(
        "[{}] {}",
        meeting.id,
        props.get_or("hs_meeting_title", "Untitled")
    )];

    if let Some(start) = props.get("hs_meeting_start_time") {
        let end = props
            .get("hs_meeting_end_time")
            .map(|end| format!(" - {}", clock_time(end)))
            .unwrap_or_default();
        lines.push(format!("  Time: {}{}", short_timestamp(start), end));
    } else if let Some(ts) = props.get("hs_timestamp") {
        lines.push(format!("  Date: {}", short_timestamp(ts)));
    }
    if let Some(location) = props.get("hs_meeting_location") {
        lines.push(format!("  Location: {}", location));
    }
    if let Some(outcome) = props.get("hs_meeting_outcome") {
        lines.push(format!("  Outcome: {}", outcome));
    }
    if let Some(body) = props.get("hs_meeting_body") {
        lines.push(format!("  Notes: {}", truncate_chars(body, 200)));
    }
    lines.join("\n")
}

pub fn format_email(email: &CrmObject) -> String {
    let props = &email.properties;
    let mut lines = vec![format!(
        "[{}] {}",
        email.id,
        props.get_or("hs_email_subject", "No Subject")
    )];

    if let Some(ts) = props.get("hs_timestamp") {
        lines.push(format!("  Date: {}", short_timestamp(ts)));
    }
    let sender = props.get("hs_email_sender_email");
    let to = props.get("hs_email_to_email");
    if props.get("hs_email_direction") == Some("INCOMING_EMAIL") {
        lines.push(format!("  From: {}", sender.unwrap_or("")));
    } else if sender.is_some() || to.is_some() {
        lines.push(format!(
            "  From: {} → To: {}",
            sender.unwrap_or(""),
            to.unwrap_or("")
        ));
    }
    if let Some(status) = props.get("hs_email_status") {
        lines.push(format!("  Status: {}", status));
    }
    if let Some(body) = props.get("hs_email_text") {
        lines.push(format!("  Body: {}", truncate_chars(body, 2000)));
    }
    lines.join("\n")
}

/// `[id] First Last <email>`.
pub fn format_owner(owner: &Owner) -> String {
    format!(
        "[{}] {} <{}>",
        owner.id,
        owner.display_name(),
        owner.email.as_deref().unwrap_or("")
    )
}

/// Format each record and join with `separator`.
pub fn format_all(records: &[CrmObject], formatter: fn(&CrmObject) -> String, separator: &str) -> String {
    records
        .iter()
        .map(formatter)
        .collect::<Vec<_>>()
        .join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Properties;

    fn record(id: &str, props: &[(&str, &str)]) -> CrmObject {
        CrmObject::new(id, props.iter().copied().collect::<Properties>())
    }

    #[test]
    fn test_format_contact() {
        let contact = record(
            "101",
            &[
                ("firstname", "Ana"),
                ("lastname", "Lopez"),
                ("email", "ana@example.com"),
                ("jobtitle", "VP Sales"),
            ],
        );
        assert_eq!(
            format_contact(&contact),
            "[101] Ana Lopez | ana@example.com | VP Sales"
        );

        let sparse = record("102", &[("lastname", "Kim")]);
        assert_eq!(format_contact(&sparse), "[102] Kim |  | ");
    }

    #[test]
    fn test_format_company_reverse_maps_icp_tier() {
        let company = record(
            "5",
            &[
                ("name", "Acme Homes"),
                ("domain", "acme.com"),
                ("city", "Calgary"),
                ("hs_lead_status", "Prospect"),
                ("hs_ideal_customer_profile", "tier_2"),
                ("product_types", "Single Family;Multi-Family"),
            ],
        );
        assert_eq!(
            format_company(&company),
            "[5] Acme Homes\n  Website: acme.com\n  Location: Calgary\n  Lead Status: Prospect\n  ICP Tier: Tier 2\n  Product Types: Single Family;Multi-Family"
        );
        assert_eq!(format_company(&record("6", &[])), "[6] Unnamed");
    }

    #[test]
    fn test_format_project_unknown_stage_shows_raw_value() {
        let deal = record(
            "77",
            &[
                ("dealname", "Riverside Towers"),
                ("dealstage", "customstage42"),
                ("number_of_units", "120"),
            ],
        );
        assert_eq!(
            format_project(&deal),
            "[77] Riverside Towers\n  Stage: customstage42\n  Units: 120"
        );

        let known = record("78", &[("dealstage", "contractsent")]);
        assert_eq!(
            format_project(&known),
            "[78] Unnamed Project\n  Stage: Active on Pluto"
        );
    }

    #[test]
    fn test_format_note_truncates_body() {
        let body = "é".repeat(350);
        let note = record(
            "9",
            &[("hs_timestamp", "2024-03-01T15:04:05.000Z"), ("hs_note_body", body.as_str())],
        );
        let text = format_note(&note);
        assert!(text.starts_with("[9] 2024-03-01 15:04\n  "));
        assert_eq!(text.lines().nth(1).unwrap().trim().chars().count(), 300);
    }

    #[test]
    fn test_format_call() {
        let call = record(
            "3",
            &[
                ("hs_call_title", "Intro"),
                ("hs_timestamp", "2024-01-15T17:30:00.000Z"),
                ("hs_call_direction", "OUTBOUND"),
                ("hs_call_duration", "900000"),
                ("hs_call_disposition", "f240bbac-87c9-4f6e-bf70-924b57d47db7"),
            ],
        );
        assert_eq!(
            format_call(&call),
            "[3] Intro\n  Date: 2024-01-15 17:30\n  Direction: OUTBOUND\n  Duration: 15 min\n  Outcome: Connected"
        );

        let odd = record("4", &[("hs_call_duration", "n/a")]);
        assert_eq!(format_call(&odd), "[4] Untitled");
    }

    #[test]
    fn test_format_meeting_time_range() {
        let meeting = record(
            "8",
            &[
                ("hs_meeting_title", "Site visit"),
                ("hs_meeting_start_time", "2024-01-15T17:30:00Z"),
                ("hs_meeting_end_time", "2024-01-15T18:15:00Z"),
                ("hs_meeting_outcome", "COMPLETED"),
            ],
        );
        assert_eq!(
            format_meeting(&meeting),
            "[8] Site visit\n  Time: 2024-01-15 17:30 - 18:15\n  Outcome: COMPLETED"
        );

        let dated = record("10", &[("hs_timestamp", "2024-02-01T09:00:00Z")]);
        assert_eq!(format_meeting(&dated), "[10] Untitled\n  Date: 2024-02-01 09:00");
    }

    #[test]
    fn test_format_email_direction() {
        let incoming = record(
            "20",
            &[
                ("hs_email_direction", "INCOMING_EMAIL"),
                ("hs_email_sender_email", "a@x.com"),
                ("hs_email_to_email", "b@y.com"),
            ],
        );
        assert_eq!(format_email(&incoming), "[20] No Subject\n  From: a@x.com");

        let outgoing = record(
            "21",
            &[
                ("hs_email_subject", "Pricing"),
                ("hs_email_direction", "EMAIL"),
                ("hs_email_sender_email", "b@y.com"),
                ("hs_email_to_email", "a@x.com"),
                ("hs_email_status", "SENT"),
            ],
        );
        assert_eq!(
            format_email(&outgoing),
            "[21] Pricing\n  From: b@y.com → To: a@x.com\n  Status: SENT"
        );
    }

    #[test]
    fn test_format_owner() {
        let owner = Owner {
            id: "42".to_string(),
            email: Some("sam@example.com".to_string()),
            first_name: None,
            last_name: None,
        };
        assert_eq!(format_owner(&owner), "[42] Unknown <sam@example.com>");
    }

    #[test]
    fn test_truncate_chars_short_input() {
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abcdef", 3), "abc");
    }
}
