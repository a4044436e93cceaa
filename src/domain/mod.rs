//! Domain value objects and types.
//!
//! This module contains the closed label sets HubSpot enumerations are
//! validated against, the association builder used when creating
//! engagements, and the object types addressed in REST paths.

pub mod associations;
pub mod errors;
pub mod labels;
pub mod object_type;
pub mod time;

pub use associations::{
    build_associations, Association, AssociationTarget, AssociationTargets, EngagementType,
};
pub use errors::ValidationError;
pub use labels::{
    CallDirection, CallOutcome, DealStage, IcpTier, Labeled, LeadStatus, MeetingOutcome,
    ProductType,
};
pub use object_type::ObjectType;
