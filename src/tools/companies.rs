//! Company tools.
//!
//! Lead status, product types and ICP tier are validated against their
//! label sets before any request is made.

use super::{default_limit, non_blank, require_field, require_token, update_and_reread};
use crate::client::AsyncHubSpotClient;
use crate::domain::{IcpTier, Labeled, LeadStatus, ObjectType, ProductType, ValidationError};
use crate::error::{ToolError, ToolResult};
use crate::format::{format_all, format_company, format_project};
use crate::models::properties::{COMPANY_PROPERTIES, DEAL_PROPERTIES};
use crate::models::{
    BatchReadRequest, CreateObjectRequest, Filter, FilterOperator, PropertyMap, SearchRequest,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

/// Parameters for `hubspot_search_companies`. Provide a query, a lead status, or both.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchCompaniesParams {
    /// Text matched against company name or domain
    #[serde(default)]
    pub query: Option<String>,

    /// One of: Prospect, In Discovery, In Proposal, Contract Sent, Active Customer, Revisit, Uninterested
    #[serde(default)]
    pub lead_status: Option<String>,

    /// Maximum results to return (default 10)
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CompanyIdParams {
    /// HubSpot company ID
    pub company_id: String,
}

/// Parameters for `hubspot_create_company`.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct CreateCompanyParams {
    /// Company name (required)
    pub name: String,
    /// Website domain, e.g. "acme.com"
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    /// Number of units this developer builds per year
    #[serde(default)]
    pub annual_unit_volume: Option<u32>,
    /// One of: Prospect, In Discovery, In Proposal, Contract Sent, Active Customer, Revisit, Uninterested
    #[serde(default)]
    pub lead_status: Option<String>,
    /// Each from: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)
    #[serde(default)]
    pub product_types: Option<Vec<String>>,
    /// One of: Tier 1, Tier 2, Tier 3
    #[serde(default)]
    pub icp_tier: Option<String>,
}

/// Parameters for `hubspot_update_company`. Only provided fields change.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct UpdateCompanyParams {
    /// HubSpot company ID (required)
    pub company_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub annual_unit_volume: Option<u32>,
    /// One of: Prospect, In Discovery, In Proposal, Contract Sent, Active Customer, Revisit, Uninterested
    #[serde(default)]
    pub lead_status: Option<String>,
    /// Each from: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise)
    #[serde(default)]
    pub product_types: Option<Vec<String>>,
    /// One of: Tier 1, Tier 2, Tier 3
    #[serde(default)]
    pub icp_tier: Option<String>,
}

/// Validated enumeration fields shared by create and update.
struct CompanyLabels {
    lead_status: Option<LeadStatus>,
    product_types: Option<Vec<ProductType>>,
    icp_tier: Option<IcpTier>,
}

impl CompanyLabels {
    fn parse(
        lead_status: &Option<String>,
        product_types: &Option<Vec<String>>,
        icp_tier: &Option<String>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            lead_status: non_blank(lead_status)
                .map(LeadStatus::parse_label)
                .transpose()?,
            product_types: product_types
                .as_ref()
                .filter(|types| !types.is_empty())
                .map(|types| ProductType::parse_many(types))
                .transpose()?,
            icp_tier: non_blank(icp_tier).map(IcpTier::parse_label).transpose()?,
        })
    }

    fn write_into(&self, properties: &mut PropertyMap) {
        properties.insert_opt("hs_lead_status", self.lead_status.map(|s| s.internal()));
        properties.insert_opt(
            "product_types",
            self.product_types
                .as_deref()
                .map(ProductType::join_internal),
        );
        properties.insert_opt(
            "hs_ideal_customer_profile",
            self.icp_tier.map(|t| t.internal()),
        );
    }
}

/// Company operations over the HubSpot objects API.
pub struct CompanyTools {
    client: Arc<dyn AsyncHubSpotClient>,
}

impl CompanyTools {
    pub fn new(client: Arc<dyn AsyncHubSpotClient>) -> Self {
        Self { client }
    }

    pub async fn search_companies(&self, params: SearchCompaniesParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;

        let mut request = SearchRequest::new(COMPANY_PROPERTIES, params.limit);
        if let Some(query) = non_blank(&params.query) {
            request = request
                .or_filter(Filter::new("name", FilterOperator::ContainsToken, query))
                .or_filter(Filter::new("domain", FilterOperator::ContainsToken, query));
        }
        if let Some(label) = non_blank(&params.lead_status) {
            let status = LeadStatus::parse_label(label)?;
            request = request.or_filter(Filter::new(
                "hs_lead_status",
                FilterOperator::Eq,
                status.internal(),
            ));
        }
        if !request.has_filters() {
            return Err(ValidationError::MissingFilter("either query or lead_status").into());
        }

        let companies = self
            .client
            .search_objects(ObjectType::Companies, request)
            .await?;
        if companies.is_empty() {
            return Ok("No companies found".to_string());
        }
        Ok(format_all(&companies, format_company, "\n\n"))
    }

    pub async fn get_company(&self, company_id: &str) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let company_id = require_field(company_id, "company_id")?;

        let company = self
            .client
            .get_object(ObjectType::Companies, company_id, COMPANY_PROPERTIES, None)
            .await
            .map_err(|e| ToolError::for_entity("Company", e))?;
        Ok(format_company(&company))
    }

    pub async fn create_company(&self, params: CreateCompanyParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let name = require_field(&params.name, "name")?;
        let labels = CompanyLabels::parse(
            &params.lead_status,
            &params.product_types,
            &params.icp_tier,
        )?;

        let mut properties = PropertyMap::new();
        properties.insert("name", name);
        properties.insert_opt("domain", non_blank(&params.domain));
        properties.insert_opt("phone", non_blank(&params.phone));
        properties.insert_opt("city", non_blank(&params.city));
        properties.insert_opt("state", non_blank(&params.state));
        properties.insert_opt(
            "annual_unit_volume",
            params.annual_unit_volume.map(|v| v.to_string()),
        );
        labels.write_into(&mut properties);

        let created = self
            .client
            .create_object(ObjectType::Companies, CreateObjectRequest::new(properties))
            .await?;
        tracing::info!("Created company {}", created.id);
        Ok(format_company(&created))
    }

    pub async fn update_company(&self, params: UpdateCompanyParams) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let company_id = require_field(&params.company_id, "company_id")?;
        let labels = CompanyLabels::parse(
            &params.lead_status,
            &params.product_types,
            &params.icp_tier,
        )?;

        let mut properties = PropertyMap::new();
        properties.insert_opt("name", non_blank(&params.name));
        properties.insert_opt("domain", non_blank(&params.domain));
        properties.insert_opt("phone", non_blank(&params.phone));
        properties.insert_opt("city", non_blank(&params.city));
        properties.insert_opt("state", non_blank(&params.state));
        properties.insert_opt(
            "annual_unit_volume",
            params.annual_unit_volume.map(|v| v.to_string()),
        );
        labels.write_into(&mut properties);

        update_and_reread(
            self.client.as_ref(),
            ObjectType::Companies,
            company_id,
            properties,
            COMPANY_PROPERTIES,
            "Company",
            format_company,
        )
        .await
    }

    /// Every project (deal) linked to a company.
    pub async fn get_company_projects(&self, company_id: &str) -> ToolResult<String> {
        require_token(self.client.as_ref())?;
        let company_id = require_field(company_id, "company_id")?;

        let linked = self
            .client
            .list_associations(ObjectType::Companies, company_id, ObjectType::Deals)
            .await
            .map_err(|e| ToolError::for_entity("Company", e))?;
        if linked.is_empty() {
            return Ok("No projects found for this company".to_string());
        }

        let ids: Vec<String> = linked.into_iter().map(|a| a.id).collect();
        let deals = self
            .client
            .batch_read(ObjectType::Deals, BatchReadRequest::new(DEAL_PROPERTIES, &ids))
            .await
            .map_err(|e| match e.status() {
                Some(status) => ToolError::FetchFailed {
                    what: "project details",
                    status,
                },
                None => ToolError::from(e),
            })?;
        if deals.is_empty() {
            return Ok("No project details found".to_string());
        }
        Ok(format_all(&deals, format_project, "\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_labels_write_internal_values() {
        let labels = CompanyLabels::parse(
            &Some("Active Customer".to_string()),
            &Some(vec!["Single Family".to_string(), "Multi-Family".to_string()]),
            &Some("Tier 1".to_string()),
        )
        .unwrap();

        let mut properties = PropertyMap::new();
        labels.write_into(&mut properties);
        assert_eq!(properties.get("hs_lead_status"), Some("Active Customer"));
        assert_eq!(
            properties.get("product_types"),
            Some("Single Family;Multi-Family")
        );
        assert_eq!(properties.get("hs_ideal_customer_profile"), Some("tier_1"));
    }

    #[test]
    fn test_company_labels_reject_bad_product_type() {
        let err = CompanyLabels::parse(
            &None,
            &Some(vec!["Castle".to_string(), "Single Family".to_string()]),
            &None,
        )
        .err()
        .unwrap();
        assert!(err.to_string().starts_with("Invalid product types: [Castle]"));
    }
}
