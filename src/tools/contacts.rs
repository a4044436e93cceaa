//! Contact tools.
//!
//! Search, read, create and update HubSpot contacts. Reading a contact also
//! resolves its first associated company and most recent engagement.

use super::{default_limit, non_blank, require_field, require_token, update_and_reread};
use crate::client::AsyncHubSpotClient;
use crate::domain::associations::CONTACT_TO_COMPANY;
use crate::domain::{Association, ObjectType};
use crate::error::{ToolError, ToolResult};
use crate::format::{format_all, format_contact, truncate_chars};
use crate::models::properties::{CONTACT_PROPERTIES, ENGAGEMENT_PREVIEW_PROPERTIES};
use crate::models::{CreateObjectRequest, Filter, FilterOperator, PropertyMap, SearchRequest};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for `hubspot_search_contacts`.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct SearchContactsParams {
    /// Text matched against email, first name and last name
    pub query: String,

    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ContactIdParams {
    /// HubSpot contact ID
    pub contact_id: String,
}

/// Parameters for `hubspot_create_contact`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateContactParams {
    /// Email address (required)
    pub email: String,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub jobtitle: Option<String>,
    /// Company to link the new contact to
    #[serde(default)]
    pub company_id: Option<String>,
}

/// Parameters for `hubspot_update_contact`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateContactParams {
    /// HubSpot contact ID (required)
    pub contact_id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub jobtitle: Option<String>,
}

/// Contact operations over the HubSpot objects API.
pub struct ContactTools {
    client: Arc<dyn AsyncHubSpotClient>,
}

impl ContactTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>) -> Self {
        Self { client }
    }

    /// Contacts whose email, first name or last name contains `query`, one per line.
    pub async fn search_contacts(&self, params: SearchContactsParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let query = require_field(&params.query, "query")?;

        let request = ["email", "firstname", "lastname"].into_iter().fold(
            SearchRequest::new(CONTACT_PROPERTIES, params.limit),
            |request, property| {
                request.or_filter(Filter::new(property, FilterOperator::ContainsToken, query))
            },
        );

        let contacts = self
            .client
            .search_objects(ObjectType::Contacts, request)
            .await?;
        if contacts.is_empty() {
            return Ok("No contacts found".to_string());
        }
        Ok(format_all(&contacts, format_contact, "\n"))
    }

    /// One contact, followed by its company name and latest activity when resolvable.
    pub async fn get_contact(&self, contact_id: &str) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let contact_id = require_field(contact_id, "contact_id")?;

        let contact = self
            .client
            .get_object(
                ObjectType::Contacts,
                contact_id,
                CONTACT_PROPERTIES,
                Some(ObjectType::Companies),
            )
            .await
            .map_err(|e| ToolError::for_entity("Contact", e))?;

        let mut output = vec![format_contact(&contact)];
        if let Some(company_id) = contact.first_associated(ObjectType::Companies) {
            if let Some(name) = company_name(self.client.as_ref(), company_id).await {
                output.push(format!("Company: {}", name));
            }
        }
        if let Some(activity) = self.recent_engagement(contact_id).await {
            output.push(format!("Recent: {}", activity));
        }
        Ok(output.join("\n"))
    }

    /// `type: preview` of the first engagement linked to the contact.
    async fn recent_engagement(&self, contact_id: &str) -> Option<String> {
        let linked = self
            .client
            .list_associations(ObjectType::Contacts, contact_id, ObjectType::Engagements)
            .await
            .ok()?;
        let first = linked.first()?;

        let engagement = self
            .client
            .get_object(
                ObjectType::Engagements,
                &first.id,
                ENGAGEMENT_PREVIEW_PROPERTIES,
                None,
            )
            .await
            .ok()?;

        let props = &engagement.properties;
        let kind = props.get_or("hs_engagement_type", "Activity");
        let preview = truncate_chars(props.get_or("hs_body_preview", ""), 100);
        if preview.is_empty() {
            Some(kind.to_string())
        } else {
            Some(format!("{}: {}", kind, preview))
        }
    }

    pub async fn create_contact(&self, params: CreateContactParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let email = require_field(&params.email, "email")?;

        let mut properties = PropertyMap::new();
        properties.insert("email", email);
        properties.insert_opt("firstname", non_blank(&params.firstname));
        properties.insert_opt("lastname", non_blank(&params.lastname));
        properties.insert_opt("phone", non_blank(&params.phone));
        properties.insert_opt("jobtitle", non_blank(&params.jobtitle));

        let mut request = CreateObjectRequest::new(properties);
        if let Some(company_id) = non_blank(&params.company_id) {
            request = request.with_associations(vec![Association::hubspot_defined(
                company_id,
                CONTACT_TO_COMPANY,
            )]);
        }

        let created = self
            .client
            .create_object(ObjectType::Contacts, request)
            .await
            .map_err(|e| match e.status() {
                Some(409) => ToolError::AlreadyExists,
                _ => ToolError::from(e),
            })?;
        tracing::info!("Created contact {}", created.id);
        Ok(format_contact(&created))
    }

    pub async fn update_contact(&self, params: UpdateContactParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let contact_id = require_field(&params.contact_id, "contact_id")?;

        let mut properties = PropertyMap::new();
        properties.insert_opt("email", non_blank(&params.email));
        properties.insert_opt("firstname", non_blank(&params.firstname));
        properties.insert_opt("lastname", non_blank(&params.lastname));
        properties.insert_opt("phone", non_blank(&params.phone));
        properties.insert_opt("jobtitle", non_blank(&params.jobtitle));

        update_and_reread(
            self.client.as_ref(),
            ObjectType::Contacts,
            contact_id,
            properties,
            CONTACT_PROPERTIES,
            "Contact",
            format_contact,
        )
        .await
    }
}

/// Name of a company, or `None` if it cannot be read.
pub(crate) async fn company_name(
    client: &dyn AsyncHubSpotClient,
    company_id: &str,
) -> Option<String> {
    client
        .get_object(ObjectType::Companies, company_id, &["name"], None)
        .await
        .ok()?
        .properties
        .get("name")
        .map(str::to_string)
}
