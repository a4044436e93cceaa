//! Closed label sets for HubSpot enumeration properties.
//!
//! Users speak in labels ("Active on Pluto"); the portal stores internal
//! values ("contractsent"). Each property is a small enum implementing
//! [`Labeled`], which gives validation on the way in and reverse lookup on
//! the way out. Reverse lookups never fail: an unknown internal value is
//! displayed as-is.

use super::errors::ValidationError;

/// A fixed, bidirectional label/internal-value table.
pub trait Labeled: Sized + Copy + 'static {
    /// Field name used in validation messages.
    const FIELD: &'static str;

    /// Every member, in display order.
    const ALL: &'static [Self];

    /// User-facing label.
    fn label(self) -> &'static str;

    /// Value stored by HubSpot.
    fn internal(self) -> &'static str;

    /// Look up a member by its exact label.
    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.label() == label)
    }

    /// Look up a member by its stored value.
    fn from_internal(value: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|v| v.internal() == value)
    }

    /// Comma-separated list of all labels.
    fn allowed_labels() -> String {
        Self::ALL
            .iter()
            .map(|v| v.label())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Validate a label, producing an error that lists the full allowed set.
    fn parse_label(label: &str) -> Result<Self, ValidationError> {
        Self::from_label(label).ok_or_else(|| ValidationError::InvalidLabel {
            field: Self::FIELD,
            allowed: Self::allowed_labels(),
        })
    }

    /// Label for a stored value, falling back to the raw value.
    fn display_internal(value: &str) -> &str {
        Self::from_internal(value).map_or(value, |v| v.label())
    }
}

/// Company lead status (`hs_lead_status`). The portal stores the labels verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LeadStatus {
    Prospect,
    InDiscovery,
    InProposal,
    ContractSent,
    ActiveCustomer,
    Revisit,
    Uninterested,
}

impl Labeled for LeadStatus {
    const FIELD: &'static str = "lead status";
    const ALL: &'static [Self] = &[
        Self::Prospect,
        Self::InDiscovery,
        Self::InProposal,
        Self::ContractSent,
        Self::ActiveCustomer,
        Self::Revisit,
        Self::Uninterested,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Prospect => "Prospect",
            Self::InDiscovery => "In Discovery",
            Self::InProposal => "In Proposal",
            Self::ContractSent => "Contract Sent",
            Self::ActiveCustomer => "Active Customer",
            Self::Revisit => "Revisit",
            Self::Uninterested => "Uninterested",
        }
    }

    fn internal(self) -> &'static str {
        self.label()
    }
}

/// Product type built by a developer or planned for a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductType {
    SingleFamily,
    MultiFamily,
    CondoLowRise,
    CondoHighRise,
}

impl Labeled for ProductType {
    const FIELD: &'static str = "product type";
    const ALL: &'static [Self] = &[
        Self::SingleFamily,
        Self::MultiFamily,
        Self::CondoLowRise,
        Self::CondoHighRise,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::SingleFamily => "Single Family",
            Self::MultiFamily => "Multi-Family",
            Self::CondoLowRise => "Condo (low-rise)",
            Self::CondoHighRise => "Condo (high-rise)",
        }
    }

    fn internal(self) -> &'static str {
        self.label()
    }
}

impl ProductType {
    /// Validate a multi-valued product type list, reporting every bad entry at once.
    pub fn parse_many(labels: &[String]) -> Result<Vec<Self>, ValidationError> {
        let mut parsed = Vec::with_capacity(labels.len());
        let mut invalid = Vec::new();
        for label in labels {
            match Self::from_label(label) {
                Some(value) => parsed.push(value),
                None => invalid.push(label.clone()),
            }
        }

        if !invalid.is_empty() {
            return Err(ValidationError::InvalidLabels {
                field: "product types",
                invalid,
                allowed: Self::allowed_labels(),
            });
        }
        Ok(parsed)
    }

    /// Encode as HubSpot's `;`-separated multi-checkbox value.
    pub fn join_internal(values: &[Self]) -> String {
        values
            .iter()
            .map(|v| v.internal())
            .collect::<Vec<_>>()
            .join(";")
    }
}

/// Deal pipeline stage, relabelled for real-estate projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DealStage {
    Rumored,
    Confirmed,
    Pursuing,
    Quoted,
    ActiveOnPluto,
    ClosedLost,
    Cancelled,
}

impl Labeled for DealStage {
    const FIELD: &'static str = "stage";
    const ALL: &'static [Self] = &[
        Self::Rumored,
        Self::Confirmed,
        Self::Pursuing,
        Self::Quoted,
        Self::ActiveOnPluto,
        Self::ClosedLost,
        Self::Cancelled,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Rumored => "Rumored",
            Self::Confirmed => "Confirmed",
            Self::Pursuing => "Pursuing",
            Self::Quoted => "Quoted",
            Self::ActiveOnPluto => "Active on Pluto",
            Self::ClosedLost => "Closed Lost",
            Self::Cancelled => "Cancelled",
        }
    }

    fn internal(self) -> &'static str {
        match self {
            Self::Rumored => "appointmentscheduled",
            Self::Confirmed => "qualifiedtobuy",
            Self::Pursuing => "presentationscheduled",
            Self::Quoted => "decisionmakerboughtin",
            Self::ActiveOnPluto => "contractsent",
            Self::ClosedLost => "closedlost",
            Self::Cancelled => "1295465318",
        }
    }
}

/// Ideal customer profile tier (`hs_ideal_customer_profile`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IcpTier {
    Tier1,
    Tier2,
    Tier3,
}

impl Labeled for IcpTier {
    const FIELD: &'static str = "ICP tier";
    const ALL: &'static [Self] = &[Self::Tier1, Self::Tier2, Self::Tier3];

    fn label(self) -> &'static str {
        match self {
            Self::Tier1 => "Tier 1",
            Self::Tier2 => "Tier 2",
            Self::Tier3 => "Tier 3",
        }
    }

    fn internal(self) -> &'static str {
        match self {
            Self::Tier1 => "tier_1",
            Self::Tier2 => "tier_2",
            Self::Tier3 => "tier_3",
        }
    }
}

/// Call disposition. Internal values are portal-specific disposition UUIDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallOutcome {
    Connected,
    Busy,
    NoAnswer,
    LeftVoicemail,
    LeftLiveMessage,
    WrongNumber,
}

impl Labeled for CallOutcome {
    const FIELD: &'static str = "outcome";
    const ALL: &'static [Self] = &[
        Self::Connected,
        Self::Busy,
        Self::NoAnswer,
        Self::LeftVoicemail,
        Self::LeftLiveMessage,
        Self::WrongNumber,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Connected => "Connected",
            Self::Busy => "Busy",
            Self::NoAnswer => "No answer",
            Self::LeftVoicemail => "Left voicemail",
            Self::LeftLiveMessage => "Left live message",
            Self::WrongNumber => "Wrong number",
        }
    }

    fn internal(self) -> &'static str {
        match self {
            Self::Connected => "f240bbac-87c9-4f6e-bf70-924b57d47db7",
            Self::Busy => "9d9162e7-6cf3-4944-bf63-4dff82258764",
            Self::NoAnswer => "73a0d17f-1163-4015-bdd5-ec830791da20",
            Self::LeftVoicemail => "b2cf5968-551e-4856-9783-c0ac3b8c2e9c",
            Self::LeftLiveMessage => "a4c4c377-d246-4b32-a13b-75a56a4cd0ff",
            Self::WrongNumber => "17b47fee-58de-441e-a44c-c6300d46f273",
        }
    }
}

/// Meeting outcome (`hs_meeting_outcome`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeetingOutcome {
    Scheduled,
    Completed,
    Rescheduled,
    NoShow,
    Cancelled,
}

impl Labeled for MeetingOutcome {
    const FIELD: &'static str = "outcome";
    const ALL: &'static [Self] = &[
        Self::Scheduled,
        Self::Completed,
        Self::Rescheduled,
        Self::NoShow,
        Self::Cancelled,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Scheduled => "SCHEDULED",
            Self::Completed => "COMPLETED",
            Self::Rescheduled => "RESCHEDULED",
            Self::NoShow => "NO_SHOW",
            Self::Cancelled => "CANCELLED",
        }
    }

    fn internal(self) -> &'static str {
        self.label()
    }
}

/// Direction of a logged call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallDirection {
    Inbound,
    Outbound,
}

impl Labeled for CallDirection {
    const FIELD: &'static str = "direction";
    const ALL: &'static [Self] = &[Self::Inbound, Self::Outbound];

    fn label(self) -> &'static str {
        match self {
            Self::Inbound => "INBOUND",
            Self::Outbound => "OUTBOUND",
        }
    }

    fn internal(self) -> &'static str {
        self.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_rejects_with_full_set<T: Labeled + std::fmt::Debug>(expected_allowed: &str) {
        let err = T::parse_label("definitely not a label").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidLabel {
                field: T::FIELD,
                allowed: expected_allowed.to_string(),
            }
        );
        assert!(err.to_string().ends_with(expected_allowed));
    }

    #[test]
    fn test_invalid_labels_list_allowed_set() {
        assert_rejects_with_full_set::<LeadStatus>(
            "Prospect, In Discovery, In Proposal, Contract Sent, Active Customer, Revisit, Uninterested",
        );
        assert_rejects_with_full_set::<DealStage>(
            "Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled",
        );
        assert_rejects_with_full_set::<ProductType>(
            "Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)",
        );
        assert_rejects_with_full_set::<IcpTier>("Tier 1, Tier 2, Tier 3");
        assert_rejects_with_full_set::<CallOutcome>(
            "Connected, Busy, No answer, Left voicemail, Left live message, Wrong number",
        );
        assert_rejects_with_full_set::<MeetingOutcome>(
            "SCHEDULED, COMPLETED, RESCHEDULED, NO_SHOW, CANCELLED",
        );
    }

    #[test]
    fn test_labels_are_case_sensitive() {
        assert!(DealStage::parse_label("rumored").is_err());
        assert_eq!(DealStage::parse_label("Rumored"), Ok(DealStage::Rumored));
    }

    #[test]
    fn test_deal_stage_round_trip_through_internal() {
        for stage in DealStage::ALL {
            assert_eq!(DealStage::from_internal(stage.internal()), Some(*stage));
        }
        assert_eq!(
            DealStage::parse_label("Active on Pluto").unwrap().internal(),
            "contractsent"
        );
    }

    #[test]
    fn test_display_internal_falls_back_to_raw() {
        assert_eq!(DealStage::display_internal("closedlost"), "Closed Lost");
        assert_eq!(DealStage::display_internal("customstage42"), "customstage42");
        assert_eq!(IcpTier::display_internal("tier_2"), "Tier 2");
        assert_eq!(
            CallOutcome::display_internal("73a0d17f-1163-4015-bdd5-ec830791da20"),
            "No answer"
        );
    }

    #[test]
    fn test_product_types_report_every_invalid_entry() {
        let input = vec![
            "Single Family".to_string(),
            "Castle".to_string(),
            "Igloo".to_string(),
        ];
        let err = ProductType::parse_many(&input).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid product types: [Castle, Igloo]. Must be from: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)"
        );
    }

    #[test]
    fn test_product_types_join_with_semicolons() {
        let input = vec!["Multi-Family".to_string(), "Condo (high-rise)".to_string()];
        let parsed = ProductType::parse_many(&input).unwrap();
        assert_eq!(
            ProductType::join_internal(&parsed),
            "Multi-Family;Condo (high-rise)"
        );
    }
}
