//! Print an Outlook `.msg` file as JSON.
//!
//! Usage: `parse-msg <MSG_FILE_PATH>`. Attachment contents are left out of the
//! output; names, sizes and MIME types are kept.

use anyhow::{Context, Result};
use hubspot_mcp_server::email::parse_email;
use serde_json::Value;

fn main() -> Result<()> {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("Usage: parse-msg <MSG_FILE_PATH>");
        std::process::exit(1);
    };

    let email = parse_email(&path)?;
    let mut display = serde_json::to_value(&email).context("serializing parsed email")?;
    if let Some(Value::Array(attachments)) = display.get_mut("attachments") {
        for attachment in attachments {
            if let Value::Object(fields) = attachment {
                fields.remove("content");
            }
        }
    }

    println!("{}", serde_json::to_string_pretty(&display)?);
    Ok(())
}
