//! Outlook `.msg` email parsing.
//!
//! Produces a flat record of sender, recipients, subject, a whitespace-normalised
//! body and base64 attachments. A file that is not a readable compound file
//! still yields a record, with a placeholder subject and the failure in the body,
//! so one corrupt message does not stop a batch.

pub mod msg;

use crate::error::EmailParseError;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use msg::{RawMessage, RawRecipient};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;

/// URLs longer than this many bytes are replaced by `[LINK]`.
pub const MAX_LINK_BYTES: usize = 100;

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

static UNSAFE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\n\r`]").unwrap());
static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*[\r\n]+\s*").unwrap());
static SPACE_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").unwrap());
static URLS: Lazy<Regex> = Lazy::new(|| Regex::new(r"https?://\S+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub name: String,
    /// Text after the last dot of `name`, empty when there is none
    pub extension: String,
    pub size: usize,
    pub mime_type: String,
    /// Base64 (standard alphabet) of the attachment bytes
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedEmail {
    /// Unix epoch milliseconds
    pub sent_on: i64,
    pub from: String,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub bcc: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl ParsedEmail {
    /// Stand-in record for a file that could not be read.
    pub fn placeholder(reason: impl std::fmt::Display) -> Self {
        Self {
            sent_on: Utc::now().timestamp_millis(),
            from: String::new(),
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            subject: "(parsing error)".to_string(),
            body: format!("Failed to parse .msg file: {}", reason),
            attachments: Vec::new(),
        }
    }
}

/// Replace tabs, line breaks and backticks with spaces, then trim.
pub fn sanitize(value: Option<&str>) -> String {
    value
        .map(|v| UNSAFE_CHARS.replace_all(v, " ").trim().to_string())
        .unwrap_or_default()
}

/// `Name <address>`, or whichever part exists when they are equal or one is missing.
pub fn format_address(name: Option<&str>, address: Option<&str>) -> String {
    let name = sanitize(name);
    let address = sanitize(address);
    if !name.is_empty() && !address.is_empty() && name != address {
        format!("{} <{}>", name, address)
    } else if !address.is_empty() {
        address
    } else {
        name
    }
}

/// Collapse line-break runs to one blank line and space runs to one space,
/// and hide overlong URLs.
pub fn clean_body(body: &str) -> String {
    let body = LINE_BREAKS.replace_all(body.trim(), "\n\n");
    let body = SPACE_RUNS.replace_all(&body, " ");
    URLS.replace_all(&body, |caps: &regex::Captures| {
        let url = &caps[0];
        if url.len() > MAX_LINK_BYTES {
            "[LINK]".to_string()
        } else {
            url.to_string()
        }
    })
    .into_owned()
}

fn split_addresses(field: Option<&str>) -> Vec<String> {
    field
        .unwrap_or_default()
        .split(';')
        .filter(|addr| !addr.trim().is_empty())
        .map(|addr| sanitize(Some(addr)))
        .collect()
}

/// Recipients of one kind (1 = To, 2 = Cc, 3 = Bcc), falling back to the
/// display string when no recipient storage has that kind.
fn recipients_of(recipients: &[RawRecipient], kind: u32, display: Option<&str>) -> Vec<String> {
    let listed: Vec<String> = recipients
        .iter()
        .filter(|r| r.kind == kind)
        .map(|r| format_address(r.name.as_deref(), r.address.as_deref()))
        .filter(|addr| !addr.is_empty())
        .collect();
    if listed.is_empty() {
        split_addresses(display)
    } else {
        listed
    }
}

fn attachments(raw: &RawMessage) -> Vec<Attachment> {
    raw.attachments
        .iter()
        .filter(|a| !a.hidden)
        .filter_map(|a| {
            let name = a.name()?.to_string();
            let extension = name
                .rsplit_once('.')
                .map(|(_, ext)| ext.to_string())
                .unwrap_or_default();
            let mime_type = a
                .mime_type
                .as_deref()
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .unwrap_or(DEFAULT_MIME_TYPE)
                .to_string();
            Some(Attachment {
                name,
                extension,
                size: a.data.len(),
                mime_type,
                content: STANDARD.encode(&a.data),
            })
        })
        .collect()
}

impl From<RawMessage> for ParsedEmail {
    fn from(raw: RawMessage) -> Self {
        let sender_address = raw
            .sender_smtp
            .clone()
            .or_else(|| raw.header_from())
            .or_else(|| raw.sender_email.clone())
            .or_else(|| raw.sender_name.clone());

        Self {
            sent_on: raw
                .submit_time
                .or(raw.delivery_time)
                .unwrap_or_else(|| Utc::now().timestamp_millis()),
            from: format_address(raw.sender_name.as_deref(), sender_address.as_deref()),
            to: recipients_of(&raw.recipients, 1, raw.display_to.as_deref()),
            cc: recipients_of(&raw.recipients, 2, raw.display_cc.as_deref()),
            bcc: recipients_of(&raw.recipients, 3, raw.display_bcc.as_deref()),
            subject: sanitize(raw.subject.as_deref()),
            body: clean_body(raw.body.as_deref().unwrap_or_default()),
            attachments: attachments(&raw),
        }
    }
}

/// Parse an Outlook `.msg` file.
///
/// Only the `.msg` extension is accepted. Files that fail to open as a
/// compound document produce [`ParsedEmail::placeholder`] instead of an error.
pub fn parse_email(path: impl AsRef<Path>) -> Result<ParsedEmail, EmailParseError> {
    let path = path.as_ref();
    let is_msg = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("msg"));
    if !is_msg {
        return Err(EmailParseError::UnsupportedFormat);
    }

    match msg::read_message(path) {
        Ok(raw) => Ok(ParsedEmail::from(raw)),
        Err(e) => {
            tracing::warn!("Failed to parse {}: {}", path.display(), e);
            Ok(ParsedEmail::placeholder(e))
        }
    }
}
