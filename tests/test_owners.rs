//! User listing tests.

mod mocks;

use hubspot_mcp_server::client::AsyncHubSpotClient;
use hubspot_mcp_server::models::Owner;
use hubspot_mcp_server::tools::OwnerTools;
use mocks::MockHubSpotClient;
use std::sync::Arc;

#[tokio::test]
async fn test_list_users_formats_each_owner() {
    let mock = MockHubSpotClient::new();
    mock.set_owners(vec![
        Owner {
            id: "900".to_string(),
            email: Some("sam@example.com".to_string()),
            first_name: Some("Sam".to_string()),
            last_name: Some("Rivera".to_string()),
        },
        Owner {
            id: "901".to_string(),
            email: Some("ops@example.com".to_string()),
            ..Default::default()
        },
    ]);
    let tools = OwnerTools::new(Arc::new(mock.clone()) as Arc<dyn AsyncHubSpotClient>);

    let result = tools.list_users().await.unwrap();

    assert_eq!(
        result,
        "[900] Sam Rivera <sam@example.com>\n[901] Unknown <ops@example.com>"
    );
}

#[tokio::test]
async fn test_list_users_empty() {
    let mock = MockHubSpotClient::new();
    let tools = OwnerTools::new(Arc::new(mock) as Arc<dyn AsyncHubSpotClient>);

    assert_eq!(tools.list_users().await.unwrap(), "No users found");
}
