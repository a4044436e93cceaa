//! HubSpot MCP Server - Main entry point
//!
//! This is the main executable for the HubSpot MCP Server, which provides a Model
//! Context Protocol (MCP) interface to HubSpot CRM and Teams meeting transcripts.

use anyhow::Result;
use hubspot_mcp_server::client::{AsyncHubSpotClient, AsyncHubSpotClientImpl};
use hubspot_mcp_server::domain::time::parse_timezone;
use hubspot_mcp_server::{Config, HubSpotClient, HubSpotMcpServer, TranscriptTools};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // .env may set LOG_LEVEL, so load it before the subscriber
    let _ = dotenvy::dotenv();

    // Initialize logging (stderr only to avoid polluting stdout/MCP communication)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(std::env::var("LOG_LEVEL").unwrap_or_else(|_| "error".to_string()))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    info!(
        "Starting HubSpot MCP Server with API URL: {}",
        config.hubspot_base_url
    );
    if config.hubspot_access_token.is_none() {
        warn!("HUBSPOT_ACCESS_TOKEN not set; HubSpot tools will report an error");
    }
    if config.ms_client_id.is_none() {
        warn!("MS_CLIENT_ID not set; fetch_transcript will report an error");
    }

    let default_timezone = parse_timezone(&config.default_timezone)?;

    // Initialize HubSpot client
    let sync_client = HubSpotClient::new(&config);
    let client = Arc::new(AsyncHubSpotClientImpl::new(sync_client)) as Arc<dyn AsyncHubSpotClient>;

    let transcripts = TranscriptTools::from_config(&config);

    // Create the MCP server (tools are constructed internally)
    let server = HubSpotMcpServer::new(client, transcripts, default_timezone);

    info!("HubSpot MCP Server initialized");

    // Run the server (this will block until the server exits)
    info!("Starting MCP server with stdio transport");
    hubspot_mcp_server::server::run_server(server).await?;

    info!("HubSpot MCP Server shutdown complete");
    Ok(())
}
