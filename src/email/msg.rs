//! MAPI property access for Outlook `.msg` compound files.
//!
//! Variable-length properties live in `__substg1.0_<ID><TYPE>` streams;
//! fixed-size ones (integers, booleans, times) in the storage's
//! `__properties_version1.0` stream as 16-byte entries after a header.

use cfb::CompoundFile;
use std::collections::HashMap;
use std::io::{Read, Seek};
use std::path::Path;

pub const PT_LONG: u16 = 0x0003;
pub const PT_BOOLEAN: u16 = 0x000B;
pub const PT_STRING8: u16 = 0x001E;
pub const PT_UNICODE: u16 = 0x001F;
pub const PT_SYSTIME: u16 = 0x0040;
pub const PT_BINARY: u16 = 0x0102;

pub const PR_SUBJECT: u16 = 0x0037;
pub const PR_CLIENT_SUBMIT_TIME: u16 = 0x0039;
pub const PR_TRANSPORT_MESSAGE_HEADERS: u16 = 0x007D;
pub const PR_SENDER_NAME: u16 = 0x0C1A;
pub const PR_SENDER_EMAIL_ADDRESS: u16 = 0x0C1F;
pub const PR_RECIPIENT_TYPE: u16 = 0x0C15;
pub const PR_DISPLAY_BCC: u16 = 0x0E02;
pub const PR_DISPLAY_CC: u16 = 0x0E03;
pub const PR_DISPLAY_TO: u16 = 0x0E04;
pub const PR_MESSAGE_DELIVERY_TIME: u16 = 0x0E06;
pub const PR_BODY: u16 = 0x1000;
pub const PR_DISPLAY_NAME: u16 = 0x3001;
pub const PR_EMAIL_ADDRESS: u16 = 0x3003;
pub const PR_ATTACH_DATA_BIN: u16 = 0x3701;
pub const PR_ATTACH_FILENAME: u16 = 0x3704;
pub const PR_ATTACH_LONG_FILENAME: u16 = 0x3707;
pub const PR_ATTACH_MIME_TAG: u16 = 0x370E;
pub const PR_SMTP_ADDRESS: u16 = 0x39FE;
pub const PR_SENDER_SMTP_ADDRESS: u16 = 0x5D01;
pub const PR_ATTACHMENT_HIDDEN: u16 = 0x7FFE;

pub const PROPERTIES_STREAM: &str = "__properties_version1.0";
pub const RECIPIENT_PREFIX: &str = "__recip_version1.0_";
pub const ATTACHMENT_PREFIX: &str = "__attach_version1.0_";

/// Header length of the top-level message's property stream.
pub const MESSAGE_HEADER_LEN: usize = 32;
/// Header length of recipient and attachment property streams.
pub const CHILD_HEADER_LEN: usize = 8;

const PROPERTY_ENTRY_LEN: usize = 16;

/// Milliseconds between 1601-01-01 (FILETIME epoch) and 1970-01-01.
const FILETIME_UNIX_OFFSET_MS: i64 = 11_644_473_600_000;

/// Stream name for a variable-length property.
pub fn property_stream_name(id: u16, kind: u16) -> String {
    format!("__substg1.0_{:04X}{:04X}", id, kind)
}

/// FILETIME (100 ns ticks since 1601) to Unix milliseconds.
pub fn filetime_to_unix_ms(ticks: u64) -> Option<i64> {
    if ticks == 0 {
        return None;
    }
    i64::try_from(ticks / 10_000)
        .ok()
        .map(|ms| ms - FILETIME_UNIX_OFFSET_MS)
}

fn decode_utf16(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16_lossy(&units)
        .trim_end_matches('\0')
        .to_string()
}

/// Fixed-size property values of one storage, keyed by property ID.
#[derive(Debug, Default)]
pub struct FixedProperties {
    values: HashMap<u16, (u16, [u8; 8])>,
}

impl FixedProperties {
    pub fn parse(stream: &[u8], header_len: usize) -> Self {
        let values = stream
            .get(header_len..)
            .unwrap_or_default()
            .chunks_exact(PROPERTY_ENTRY_LEN)
            .map(|entry| {
                let tag = u32::from_le_bytes([entry[0], entry[1], entry[2], entry[3]]);
                let mut value = [0u8; 8];
                value.copy_from_slice(&entry[8..16]);
                ((tag >> 16) as u16, ((tag & 0xFFFF) as u16, value))
            })
            .collect();
        Self { values }
    }

    fn raw(&self, id: u16, kind: u16) -> Option<[u8; 8]> {
        self.values
            .get(&id)
            .filter(|(stored, _)| *stored == kind)
            .map(|(_, value)| *value)
    }

    pub fn long(&self, id: u16) -> Option<u32> {
        self.raw(id, PT_LONG)
            .map(|v| u32::from_le_bytes([v[0], v[1], v[2], v[3]]))
    }

    pub fn boolean(&self, id: u16) -> bool {
        self.raw(id, PT_BOOLEAN).map_or(false, |v| v[0] != 0)
    }

    pub fn time_ms(&self, id: u16) -> Option<i64> {
        self.raw(id, PT_SYSTIME)
            .and_then(|v| filetime_to_unix_ms(u64::from_le_bytes(v)))
    }
}

/// A recipient storage's addressing properties.
#[derive(Debug, Clone, Default)]
pub struct RawRecipient {
    pub kind: u32,
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RawAttachment {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub mime_type: Option<String>,
    pub hidden: bool,
    pub data: Vec<u8>,
}

impl RawAttachment {
    pub fn name(&self) -> Option<&str> {
        self.long_name
            .as_deref()
            .or(self.short_name.as_deref())
            .filter(|name| !name.trim().is_empty())
    }
}

/// The properties of a message the parser cares about, before cleanup.
#[derive(Debug, Clone, Default)]
pub struct RawMessage {
    pub subject: Option<String>,
    pub body: Option<String>,
    pub sender_name: Option<String>,
    pub sender_smtp: Option<String>,
    pub sender_email: Option<String>,
    pub headers: Option<String>,
    pub display_to: Option<String>,
    pub display_cc: Option<String>,
    pub display_bcc: Option<String>,
    pub submit_time: Option<i64>,
    pub delivery_time: Option<i64>,
    pub recipients: Vec<RawRecipient>,
    pub attachments: Vec<RawAttachment>,
}

impl RawMessage {
    /// Value of the `From:` line in the transport headers.
    pub fn header_from(&self) -> Option<String> {
        self.headers.as_deref()?.lines().find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("from")
                .then(|| value.trim().to_string())
        })
    }
}

struct MsgReader<F> {
    file: CompoundFile<F>,
}

impl<F: Read + Seek> MsgReader<F> {
    fn stream(&mut self, storage: &str, name: &str) -> Option<Vec<u8>> {
        let path = format!("{}/{}", storage, name);
        let mut stream = self.file.open_stream(&path).ok()?;
        let mut bytes = Vec::new();
        stream.read_to_end(&mut bytes).ok()?;
        Some(bytes)
    }

    fn string(&mut self, storage: &str, id: u16) -> Option<String> {
        if let Some(bytes) = self.stream(storage, &property_stream_name(id, PT_UNICODE)) {
            return Some(decode_utf16(&bytes));
        }
        self.stream(storage, &property_stream_name(id, PT_STRING8))
            .map(|bytes| {
                String::from_utf8_lossy(&bytes)
                    .trim_end_matches('\0')
                    .to_string()
            })
    }

    fn binary(&mut self, storage: &str, id: u16) -> Option<Vec<u8>> {
        self.stream(storage, &property_stream_name(id, PT_BINARY))
    }

    fn fixed(&mut self, storage: &str, header_len: usize) -> FixedProperties {
        self.stream(storage, PROPERTIES_STREAM)
            .map(|bytes| FixedProperties::parse(&bytes, header_len))
            .unwrap_or_default()
    }

    /// Paths of the root storages whose names start with `prefix`, in order.
    fn children(&self, prefix: &str) -> Vec<String> {
        let mut paths: Vec<String> = match self.file.read_storage("/") {
            Ok(entries) => entries
                .filter(|entry| entry.is_storage() && entry.name().starts_with(prefix))
                .map(|entry| format!("/{}", entry.name()))
                .collect(),
            Err(_) => Vec::new(),
        };
        paths.sort();
        paths
    }

    fn recipient(&mut self, storage: &str) -> RawRecipient {
        let fixed = self.fixed(storage, CHILD_HEADER_LEN);
        RawRecipient {
            kind: fixed.long(PR_RECIPIENT_TYPE).unwrap_or(1),
            name: self.string(storage, PR_DISPLAY_NAME),
            address: self
                .string(storage, PR_SMTP_ADDRESS)
                .or_else(|| self.string(storage, PR_EMAIL_ADDRESS)),
        }
    }

    fn attachment(&mut self, storage: &str) -> RawAttachment {
        let fixed = self.fixed(storage, CHILD_HEADER_LEN);
        RawAttachment {
            long_name: self.string(storage, PR_ATTACH_LONG_FILENAME),
            short_name: self.string(storage, PR_ATTACH_FILENAME),
            mime_type: self.string(storage, PR_ATTACH_MIME_TAG),
            hidden: fixed.boolean(PR_ATTACHMENT_HIDDEN),
            data: self.binary(storage, PR_ATTACH_DATA_BIN).unwrap_or_default(),
        }
    }

    fn message(&mut self) -> RawMessage {
        let root = "";
        let fixed = self.fixed(root, MESSAGE_HEADER_LEN);

        let recipients = self
            .children(RECIPIENT_PREFIX)
            .iter()
            .map(|storage| self.recipient(storage))
            .collect();
        let attachments = self
            .children(ATTACHMENT_PREFIX)
            .iter()
            .map(|storage| self.attachment(storage))
            .collect();

        RawMessage {
            subject: self.string(root, PR_SUBJECT),
            body: self.string(root, PR_BODY),
            sender_name: self.string(root, PR_SENDER_NAME),
            sender_smtp: self.string(root, PR_SENDER_SMTP_ADDRESS),
            sender_email: self.string(root, PR_SENDER_EMAIL_ADDRESS),
            headers: self.string(root, PR_TRANSPORT_MESSAGE_HEADERS),
            display_to: self.string(root, PR_DISPLAY_TO),
            display_cc: self.string(root, PR_DISPLAY_CC),
            display_bcc: self.string(root, PR_DISPLAY_BCC),
            submit_time: fixed.time_ms(PR_CLIENT_SUBMIT_TIME),
            delivery_time: fixed.time_ms(PR_MESSAGE_DELIVERY_TIME),
            recipients,
            attachments,
        }
    }
}

/// Open `path` as a compound file and read its message properties.
pub fn read_message(path: &Path) -> std::io::Result<RawMessage> {
    let file = cfb::open(path)?;
    Ok(MsgReader { file }.message())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_stream_name() {
        assert_eq!(property_stream_name(PR_SUBJECT, PT_UNICODE), "__substg1.0_0037001F");
        assert_eq!(
            property_stream_name(PR_ATTACH_DATA_BIN, PT_BINARY),
            "__substg1.0_37010102"
        );
    }

    #[test]
    fn test_filetime_conversion() {
        // 2024-01-01T00:00:00Z
        assert_eq!(filetime_to_unix_ms(133_485_408_000_000_000), Some(1_704_067_200_000));
        assert_eq!(filetime_to_unix_ms(0), None);
    }

    #[test]
    fn test_fixed_properties_parse_entries_after_header() {
        let mut stream = vec![0u8; CHILD_HEADER_LEN];
        let tag = (u32::from(PR_RECIPIENT_TYPE) << 16) | u32::from(PT_LONG);
        stream.extend_from_slice(&tag.to_le_bytes());
        stream.extend_from_slice(&[0u8; 4]);
        stream.extend_from_slice(&2u64.to_le_bytes());

        let fixed = FixedProperties::parse(&stream, CHILD_HEADER_LEN);
        assert_eq!(fixed.long(PR_RECIPIENT_TYPE), Some(2));
        assert!(!fixed.boolean(PR_ATTACHMENT_HIDDEN));
    }

    #[test]
    fn test_header_from() {
        let message = RawMessage {
            headers: Some("Received: by mx\r\nFrom: Ada <ada@example.com>\r\nTo: x@y.z".to_string()),
            ..Default::default()
        };
        assert_eq!(message.header_from().as_deref(), Some("Ada <ada@example.com>"));
    }
}
