//! HubSpot CRM object types addressed by this server.

use std::fmt;

/// A CRM object type as it appears in REST paths (`/crm/v3/objects/{type}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Contacts,
    Companies,
    Deals,
    Notes,
    Calls,
    Meetings,
    Emails,
    Engagements,
}

impl ObjectType {
    /// Path segment for this object type.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectType::Contacts => "contacts",
            ObjectType::Companies => "companies",
            ObjectType::Deals => "deals",
            ObjectType::Notes => "notes",
            ObjectType::Calls => "calls",
            ObjectType::Meetings => "meetings",
            ObjectType::Emails => "emails",
            ObjectType::Engagements => "engagements",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
