//! Domain validation errors.

use std::fmt;

/// Errors that can occur while validating tool input, before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required identifier or text field is empty.
    EmptyField(&'static str),

    /// A label outside its fixed set.
    InvalidLabel {
        field: &'static str,
        allowed: String,
    },

    /// One or more labels of a multi-valued field are outside the fixed set.
    InvalidLabels {
        field: &'static str,
        invalid: Vec<String>,
        allowed: String,
    },

    /// An engagement was given no contact, company or deal to attach to.
    MissingAssociation,

    /// A search was given nothing to filter on.
    MissingFilter(&'static str),

    /// The timezone name is not a known IANA zone.
    InvalidTimezone(String),

    /// A local date-time could not be parsed or does not exist in the zone.
    InvalidDateTime(String),
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyField(field) => write!(f, "{} cannot be empty", field),
            Self::InvalidLabel { field, allowed } => {
                write!(f, "Invalid {}. Must be one of: {}", field, allowed)
            }
            Self::InvalidLabels {
                field,
                invalid,
                allowed,
            } => write!(
                f,
                "Invalid {}: [{}]. Must be from: {}",
                field,
                invalid.join(", "),
                allowed
            ),
            Self::MissingAssociation => write!(
                f,
                "Must provide at least one of contact_id, company_id, or deal_id"
            ),
            Self::MissingFilter(what) => write!(f, "Provide {}", what),
            Self::InvalidTimezone(tz) => write!(f, "Invalid timezone '{}'", tz),
            Self::InvalidDateTime(value) => write!(
                f,
                "Invalid time '{}'. Expected YYYY-MM-DDTHH:MM:SS",
                value
            ),
        }
    }
}

impl std::error::Error for ValidationError {}
