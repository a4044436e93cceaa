//! Company and project tool tests against the recording mock client.

mod mocks;

use hubspot_mcp_server::client::AsyncHubSpotClient;
use hubspot_mcp_server::domain::ObjectType;
use hubspot_mcp_server::tools::{
    CompanyTools, CreateCompanyParams, CreateProjectParams, ProjectTools, SearchCompaniesParams,
    SearchProjectsParams, UpdateCompanyParams, UpdateProjectParams,
};
use mocks::MockHubSpotClient;
use std::sync::Arc;

fn client(mock: &MockHubSpotClient) -> Arc<dyn AsyncHubSpotClient> {
    Arc::new(mock.clone())
}

#[tokio::test]
async fn test_create_company_stores_internal_values() {
    let mock = MockHubSpotClient::new();
    let tools = CompanyTools::new(client(&mock));

    let result = tools
        .create_company(CreateCompanyParams {
            name: "Riverside Builders".to_string(),
            domain: Some("riverside.example".to_string()),
            city: Some("Calgary".to_string()),
            state: Some("AB".to_string()),
            annual_unit_volume: Some(120),
            lead_status: Some("Prospect".to_string()),
            product_types: Some(vec!["Single Family".to_string(), "Multi-Family".to_string()]),
            icp_tier: Some("Tier 1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let props = mock.calls_to("create_object")[0].body["properties"].clone();
    assert_eq!(props["hs_lead_status"], "Prospect");
    assert_eq!(props["product_types"], "Single Family;Multi-Family");
    assert_eq!(props["hs_ideal_customer_profile"], "tier_1");
    assert_eq!(props["annual_unit_volume"], "120");
    assert!(props.get("phone").is_none());

    assert_eq!(
        result,
        "[1001] Riverside Builders\n  \
         Website: riverside.example\n  \
         Location: Calgary AB\n  \
         Lead Status: Prospect\n  \
         ICP Tier: Tier 1\n  \
         Annual Units: 120\n  \
         Product Types: Single Family;Multi-Family"
    );
}

#[tokio::test]
async fn test_search_companies_by_query_and_status() {
    let mock = MockHubSpotClient::new();
    let tools = CompanyTools::new(client(&mock));

    let result = tools
        .search_companies(SearchCompaniesParams {
            query: Some("river".to_string()),
            lead_status: Some("Active Customer".to_string()),
            limit: 3,
        })
        .await
        .unwrap();
    assert_eq!(result, "No companies found");

    let body = mock.calls_to("search_objects")[0].body.clone();
    let groups = body["filterGroups"].as_array().unwrap();
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0]["filters"][0]["propertyName"], "name");
    assert_eq!(groups[1]["filters"][0]["propertyName"], "domain");
    assert_eq!(groups[2]["filters"][0]["operator"], "EQ");
    assert_eq!(groups[2]["filters"][0]["value"], "Active Customer");
    assert_eq!(body["limit"], 3);
}

#[tokio::test]
async fn test_update_company_rereads() {
    let mock = MockHubSpotClient::new();
    mock.add_object(
        ObjectType::Companies,
        "22",
        &[("name", "Acme Homes"), ("hs_ideal_customer_profile", "tier_2")],
    );
    let tools = CompanyTools::new(client(&mock));

    let result = tools
        .update_company(UpdateCompanyParams {
            company_id: "22".to_string(),
            icp_tier: Some("Tier 2".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(result, "[22] Acme Homes\n  ICP Tier: Tier 2");
    let methods: Vec<&str> = mock.calls().iter().map(|c| c.method).collect();
    assert_eq!(methods, vec!["update_object", "get_object"]);
}

#[tokio::test]
async fn test_get_company_not_found() {
    let mock = MockHubSpotClient::new();
    let tools = CompanyTools::new(client(&mock));

    let err = tools.get_company("404").await.unwrap_err();
    assert_eq!(err.to_string(), "Error: Company not found");
}

#[tokio::test]
async fn test_get_company_projects() {
    let mock = MockHubSpotClient::new();
    mock.associate(ObjectType::Companies, "22", ObjectType::Deals, &["301", "302"]);
    mock.add_object(
        ObjectType::Deals,
        "301",
        &[("dealname", "Riverside Phase 1"), ("dealstage", "contractsent")],
    );
    mock.add_object(
        ObjectType::Deals,
        "302",
        &[("dealname", "Riverside Phase 2"), ("number_of_units", "64")],
    );
    let tools = CompanyTools::new(client(&mock));

    let result = tools.get_company_projects("22").await.unwrap();

    assert_eq!(
        result,
        "[301] Riverside Phase 1\n  Stage: Active on Pluto\n\n[302] Riverside Phase 2\n  Units: 64"
    );
}

#[tokio::test]
async fn test_company_without_projects() {
    let mock = MockHubSpotClient::new();
    let tools = CompanyTools::new(client(&mock));

    let result = tools.get_company_projects("22").await.unwrap();

    assert_eq!(result, "No projects found for this company");
    assert!(mock.calls_to("batch_read").is_empty());
}

#[tokio::test]
async fn test_create_project_links_company() {
    let mock = MockHubSpotClient::new();
    let tools = ProjectTools::new(client(&mock));

    let result = tools
        .create_project(CreateProjectParams {
            name: "Riverside Phase 3".to_string(),
            company_id: "22".to_string(),
            stage: Some("Quoted".to_string()),
            number_of_units: Some(80),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(result, "[1001] Riverside Phase 3\n  Stage: Quoted\n  Units: 80");
    let body = mock.calls_to("create_object")[0].body.clone();
    assert_eq!(body["properties"]["dealstage"], "decisionmakerboughtin");
    assert_eq!(body["associations"][0]["to"]["id"], "22");
    assert_eq!(body["associations"][0]["types"][0]["associationTypeId"], 341);
}

#[tokio::test]
async fn test_get_project_without_embedded_company() {
    let mock = MockHubSpotClient::new();
    mock.add_object(ObjectType::Deals, "301", &[("dealname", "Riverside Phase 1")]);
    mock.add_object(ObjectType::Companies, "22", &[("name", "Acme Homes")]);
    let tools = ProjectTools::new(client(&mock));

    // No embedded association, so no company line.
    let result = tools.get_project("301").await.unwrap();
    assert_eq!(result, "[301] Riverside Phase 1");
}

#[tokio::test]
async fn test_search_projects_by_stage() {
    let mock = MockHubSpotClient::new();
    let tools = ProjectTools::new(client(&mock));

    tools
        .search_projects(SearchProjectsParams {
            stage: Some("Cancelled".to_string()),
            limit: 10,
            ..Default::default()
        })
        .await
        .unwrap();

    let filter = mock.calls_to("search_objects")[0].body["filterGroups"][0]["filters"][0].clone();
    assert_eq!(filter["propertyName"], "dealstage");
    assert_eq!(filter["value"], "1295465318");
}

#[tokio::test]
async fn test_update_project_not_found() {
    let mock = MockHubSpotClient::new();
    let tools = ProjectTools::new(client(&mock));

    let err = tools
        .update_project(UpdateProjectParams {
            deal_id: "999".to_string(),
            city: Some("Red Deer".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Error: Project not found");
}
