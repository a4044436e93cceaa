//! Property names requested for each object type.

pub const CONTACT_PROPERTIES: &[&str] = &["firstname", "lastname", "email", "phone", "jobtitle"];

pub const COMPANY_PROPERTIES: &[&str] = &[
    "name",
    "domain",
    "phone",
    "city",
    "state",
    "annual_unit_volume",
    "hs_lead_status",
    "hs_ideal_customer_profile",
    "product_types",
    "hubspot_owner_id",
];

pub const DEAL_PROPERTIES: &[&str] = &[
    "dealname",
    "dealstage",
    "launch_date",
    "number_of_units",
    "product_type",
    "city",
    "google_maps_link",
];

pub const NOTE_PROPERTIES: &[&str] = &["hs_note_body", "hs_timestamp", "hubspot_owner_id"];

pub const CALL_PROPERTIES: &[&str] = &[
    "hs_call_title",
    "hs_call_body",
    "hs_call_duration",
    "hs_call_direction",
    "hs_call_disposition",
    "hs_call_status",
    "hs_timestamp",
];

pub const MEETING_PROPERTIES: &[&str] = &[
    "hs_meeting_title",
    "hs_meeting_body",
    "hs_meeting_start_time",
    "hs_meeting_end_time",
    "hs_meeting_location",
    "hs_meeting_outcome",
    "hs_timestamp",
    "hubspot_owner_id",
];

pub const EMAIL_PROPERTIES: &[&str] = &[
    "hs_email_subject",
    "hs_email_text",
    "hs_email_direction",
    "hs_email_status",
    "hs_email_sender_email",
    "hs_email_to_email",
    "hs_timestamp",
];

pub const ENGAGEMENT_PREVIEW_PROPERTIES: &[&str] =
    &["hs_engagement_type", "hs_timestamp", "hs_body_preview"];
