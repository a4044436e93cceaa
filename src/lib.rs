//! HubSpot MCP Server - a Model Context Protocol server for HubSpot CRM.
//!
//! The server lets AI assistants search and edit HubSpot contacts, companies
//! and projects (deals), log notes, calls and meetings, search past activity,
//! and download Microsoft Teams meeting transcripts. A standalone `.msg`
//! parser ships alongside as the `parse-msg` binary.
//!
//! # Architecture
//!
//! - **config**: Configuration management from environment variables
//! - **error**: Custom error types and the caller-facing error text
//! - **domain**: Label mappings, association rules, time conversion
//! - **models**: HubSpot request and response payloads
//! - **format**: Display text for each CRM object type
//! - **client**: HTTP client for the HubSpot API, with an async wrapper
//! - **tools**: One method per MCP tool
//! - **graph**: Microsoft Graph client and sign-in
//! - **email**: Outlook `.msg` parser
//! - **server**: MCP protocol server

pub mod client;
pub mod config;
pub mod domain;
pub mod email;
pub mod error;
pub mod format;
pub mod graph;
pub mod metrics;
pub mod models;
pub mod server;
pub mod tools;

// Re-export commonly used types
pub use client::{AsyncHubSpotClient, AsyncHubSpotClientImpl, HubSpotClient};
pub use config::Config;
pub use email::{parse_email, ParsedEmail};
pub use error::{ConfigError, EmailParseError, GraphError, HubSpotApiError, ToolError};
pub use graph::GraphClient;
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use server::HubSpotMcpServer;
pub use tools::TranscriptTools;
