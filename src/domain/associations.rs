//! Association descriptors for records created with links to other records.
//!
//! Engagements (notes, calls, meetings) must be linked to at least one of a
//! contact, company or deal. Each (source type, target type) pair has a fixed
//! HubSpot-defined association type ID.

use super::errors::ValidationError;
use super::object_type::ObjectType;
use serde::Serialize;

/// Association type ID for contact -> company.
pub const CONTACT_TO_COMPANY: u32 = 279;

/// Association type ID for deal -> company.
pub const DEAL_TO_COMPANY: u32 = 341;

/// Engagement kinds that can be created with associations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngagementType {
    Note,
    Call,
    Meeting,
}

/// Record kinds an engagement can be attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssociationTarget {
    Contact,
    Company,
    Deal,
}

impl AssociationTarget {
    /// Object type of the target record.
    pub fn object_type(self) -> ObjectType {
        match self {
            AssociationTarget::Contact => ObjectType::Contacts,
            AssociationTarget::Company => ObjectType::Companies,
            AssociationTarget::Deal => ObjectType::Deals,
        }
    }
}

impl EngagementType {
    /// Object type used to create and search this engagement.
    pub fn object_type(self) -> ObjectType {
        match self {
            EngagementType::Note => ObjectType::Notes,
            EngagementType::Call => ObjectType::Calls,
            EngagementType::Meeting => ObjectType::Meetings,
        }
    }

    /// HubSpot-defined association type ID from this engagement to `target`.
    pub fn association_type_id(self, target: AssociationTarget) -> u32 {
        use AssociationTarget::*;
        match (self, target) {
            (EngagementType::Note, Contact) => 202,
            (EngagementType::Note, Company) => 190,
            (EngagementType::Note, Deal) => 214,
            (EngagementType::Call, Contact) => 194,
            (EngagementType::Call, Company) => 182,
            (EngagementType::Call, Deal) => 206,
            (EngagementType::Meeting, Contact) => 200,
            (EngagementType::Meeting, Company) => 188,
            (EngagementType::Meeting, Deal) => 212,
        }
    }
}

/// Optional link targets supplied by a caller. Blank IDs count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssociationTargets {
    pub contact_id: Option<String>,
    pub company_id: Option<String>,
    pub deal_id: Option<String>,
}

fn non_blank(id: Option<String>) -> Option<String> {
    id.filter(|s| !s.trim().is_empty())
}

impl AssociationTargets {
    pub fn new(
        contact_id: Option<String>,
        company_id: Option<String>,
        deal_id: Option<String>,
    ) -> Self {
        Self {
            contact_id: non_blank(contact_id),
            company_id: non_blank(company_id),
            deal_id: non_blank(deal_id),
        }
    }

    /// Present targets in contact, company, deal order.
    pub fn iter(&self) -> impl Iterator<Item = (AssociationTarget, &str)> {
        [
            (AssociationTarget::Contact, self.contact_id.as_deref()),
            (AssociationTarget::Company, self.company_id.as_deref()),
            (AssociationTarget::Deal, self.deal_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(target, id)| id.map(|id| (target, id)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Fail unless at least one target is present.
    pub fn require_any(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::MissingAssociation);
        }
        Ok(())
    }

    /// The target that drives association-based searches (contact, then company, then deal).
    pub fn primary(&self) -> Option<(AssociationTarget, &str)> {
        self.iter().next()
    }
}

/// One entry of the `associations` array in a create payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Association {
    pub to: AssociationTo,
    pub types: Vec<AssociationSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssociationTo {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationSpec {
    pub association_category: &'static str,
    pub association_type_id: u32,
}

impl Association {
    /// A HubSpot-defined association to record `id`.
    pub fn hubspot_defined(id: impl Into<String>, association_type_id: u32) -> Self {
        Self {
            to: AssociationTo { id: id.into() },
            types: vec![AssociationSpec {
                association_category: "HUBSPOT_DEFINED",
                association_type_id,
            }],
        }
    }
}

/// Build the association list for a new engagement, omitting absent targets.
pub fn build_associations(
    engagement: EngagementType,
    targets: &AssociationTargets,
) -> Vec<Association> {
    targets
        .iter()
        .map(|(target, id)| {
            Association::hubspot_defined(id, engagement.association_type_id(target))
        })
        .collect()
}
