//! Project tools.
//!
//! Projects are HubSpot deals. Stages are entered as labels ("Active on Pluto")
//! and stored as pipeline stage IDs ("contractsent").

use super::contacts::company_name;
use super::{default_limit, non_blank, require_field, require_token, update_and_reread};
use crate::client::AsyncHubSpotClient;
use crate::domain::associations::DEAL_TO_COMPANY;
use crate::domain::{Association, DealStage, Labeled, ObjectType, ProductType, ValidationError};
use crate::error::{ToolError, ToolResult};
use crate::format::{format_all, format_project};
use crate::models::properties::DEAL_PROPERTIES;
use crate::models::{CreateObjectRequest, Filter, FilterOperator, PropertyMap, SearchRequest};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for `hubspot_search_projects`. Provide a query, a stage, or both.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchProjectsParams {
    /// Text matched against the project name
    #[serde(default)]
    pub query: Option<String>,

    /// One of: Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled
    #[serde(default)]
    pub stage: Option<String>,

    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ProjectIdParams {
    /// HubSpot deal/project ID
    pub deal_id: String,
}

/// Parameters for `hubspot_create_project`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateProjectParams {
    /// Project name (required)
    pub name: String,
    /// Company the project belongs to (required)
    pub company_id: String,
    /// One of: Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub number_of_units: Option<u32>,
    /// One of: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)
    #[serde(default)]
    pub product_type: Option<String>,
    /// Public sales launch date (YYYY-MM-DD), not the construction start
    #[serde(default)]
    pub launch_date: Option<String>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
}

/// Parameters for `hubspot_update_project`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateProjectParams {
    /// HubSpot deal/project ID (required)
    pub deal_id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// One of: Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub number_of_units: Option<u32>,
    /// One of: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)
    #[serde(default)]
    pub product_type: Option<String>,
    /// Public sales launch date (YYYY-MM-DD)
    #[serde(default)]
    pub launch_date: Option<String>,
    #[serde(default)]
    pub google_maps_link: Option<String>,
}

/// Properties common to create and update, after label validation.
#[allow(clippy::too_many_arguments)]
fn project_properties(
    name: Option<&str>,
    stage: &Option<String>,
    city: &Option<String>,
    number_of_units: Option<u32>,
    product_type: &Option<String>,
    launch_date: &Option<String>,
    google_maps_link: &Option<String>,
) -> Result<PropertyMap, ValidationError> {
    let stage = non_blank(stage).map(DealStage::parse_label).transpose()?;
    let product_type = non_blank(product_type)
        .map(ProductType::parse_label)
        .transpose()?;

    let mut properties = PropertyMap::new();
    properties.insert_opt("dealname", name);
    properties.insert_opt("dealstage", stage.map(|s| s.internal()));
    properties.insert_opt("city", non_blank(city));
    properties.insert_opt("number_of_units", number_of_units.map(|n| n.to_string()));
    properties.insert_opt("product_type", product_type.map(|p| p.internal()));
    properties.insert_opt("launch_date", non_blank(launch_date));
    properties.insert_opt("google_maps_link", non_blank(google_maps_link));
    Ok(properties)
}

/// Project operations over the HubSpot deals API.
pub struct ProjectTools {
    client: Arc<dyn AsyncHubSpotClient>,
}

impl ProjectTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>) -> Self {
        Self { client }
    }

    pub async fn search_projects(&self, params: SearchProjectsParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;

        let mut request = SearchRequest::new(DEAL_PROPERTIES, params.limit);
        if let Some(query) = non_blank(&params.query) {
            request = request.or_filter(Filter::new(
                "dealname",
                FilterOperator::ContainsToken,
                query,
            ));
        }
        if let Some(label) = non_blank(&params.stage) {
            let stage = DealStage::parse_label(label)?;
            request = request.or_filter(Filter::new(
                "dealstage",
                FilterOperator::Eq,
                stage.internal(),
            ));
        }
        if !request.has_filters() {
            return Err(ValidationError::MissingFilter("either query or stage").into());
        }

        let deals = self.client.search_objects(ObjectType::Deals, request).await?;
        if deals.is_empty() {
            return Ok("No projects found".to_string());
        }
        Ok(format_all(&deals, format_project, "\n\n"))
    }

    /// One project, followed by the name of its first linked company.
    pub async fn get_project(&self, deal_id: &str) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let deal_id = require_field(deal_id, "deal_id")?;

        let deal = self
            .client
            .get_object(
                ObjectType::Deals,
                deal_id,
                DEAL_PROPERTIES,
                Some(ObjectType::Companies),
            )
            .await
            .map_err(|e| ToolError::for_entity("Project", e))?;

        let mut output = vec![format_project(&deal)];
        if let Some(company_id) = deal.first_associated(ObjectType::Companies) {
            if let Some(name) = company_name(self.client.as_ref(), company_id).await {
                output.push(format!("  Company: {}", name));
            }
        }
        Ok(output.join("\n"))
    }

    pub async fn create_project(&self, params: CreateProjectParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let name = require_field(&params.name, "name")?;
        let company_id = require_field(&params.company_id, "company_id")?;

        let properties = project_properties(
            Some(name),
            &params.stage,
            &params.city,
            params.number_of_units,
            &params.product_type,
            &params.launch_date,
            &params.google_maps_link,
        )?;
        let request = CreateObjectRequest::new(properties).with_associations(vec![
            Association::hubspot_defined(company_id, DEAL_TO_COMPANY),
        ]);

        let created = self
            .client
            .create_object(ObjectType::Deals, request)
            .await?;
        tracing::info!("Created project {} for company {}", created.id, company_id);
        Ok(format_project(&created))
    }

    pub async fn update_project(&self, params: UpdateProjectParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let deal_id = require_field(&params.deal_id, "deal_id")?;

        let properties = project_properties(
            non_blank(&params.name),
            &params.stage,
            &params.city,
            params.number_of_units,
            &params.product_type,
            &params.launch_date,
            &params.google_maps_link,
        )?;

        update_and_reread(
            self.client.as_ref(),
            ObjectType::Deals,
            deal_id,
            properties,
            DEAL_PROPERTIES,
            "Project",
            format_project,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_properties_map_stage_label() {
        let properties = project_properties(
            Some("Riverside"),
            &Some("Pursuing".to_string()),
            &None,
            Some(48),
            &Some("Condo (low-rise)".to_string()),
            &Some("2025-04-01".to_string()),
            &Some("   ".to_string()),
        )
        .unwrap();

        assert_eq!(properties.get("dealstage"), Some("presentationscheduled"));
        assert_eq!(properties.get("number_of_units"), Some("48"));
        assert_eq!(properties.get("product_type"), Some("Condo (low-rise)"));
        assert_eq!(properties.get("google_maps_link"), None);
        assert_eq!(properties.len(), 5);
    }

    #[test]
    fn test_project_properties_reject_unknown_stage() {
        let err = project_properties(None, &Some("Won".to_string()), &None, None, &None, &None, &None)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid stage. Must be one of: Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled"
        );
    }
}
