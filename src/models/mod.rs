//! Data models for HubSpot CRM objects and request payloads.

pub mod object;
pub mod owner;
pub mod properties;
pub mod requests;

pub use object::{
    AssociatedId, AssociationPage, AssociationPageV4, CrmObject, ObjectPage, Properties,
};
pub use owner::{Owner, OwnerPage};
pub use requests::{
    BatchReadRequest, CreateObjectRequest, Filter, FilterGroup, FilterOperator, PropertyMap,
    SearchRequest, Sort, UpdateObjectRequest,
};
