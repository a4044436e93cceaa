//! MCP tool handlers for the HubSpot server.
//!
//! This module registers every tool with the rmcp SDK's tool_router pattern.
//! Handlers are thin: they log, delegate to the tool groups and render the
//! outcome as text.

use crate::client::AsyncHubSpotClient;
use crate::error::ToolResult;
use crate::tools::{
    ActivitySearchTools, AddNoteParams, CompanyIdParams, CompanyTools, ContactIdParams,
    ContactTools, CreateCompanyParams, CreateContactParams, CreateProjectParams,
    EngagementTools, FetchTranscriptParams, LogCallParams, LogMeetingParams, OwnerTools,
    ProjectIdParams, ProjectTools, SearchCallsParams, SearchCompaniesParams,
    SearchContactsParams, SearchEmailsParams, SearchMeetingsParams, SearchNotesParams,
    SearchProjectsParams, TranscriptTools, UpdateCompanyParams, UpdateContactParams,
    UpdateProjectParams,
};
use chrono_tz::Tz;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use std::sync::Arc;

/// The MCP server exposing HubSpot CRM and Teams transcript tools.
#[derive(Clone)]
pub struct HubSpotMcpServer {
    contacts: Arc<ContactTools>,
    companies: Arc<CompanyTools>,
    projects: Arc<ProjectTools>,
    engagements: Arc<EngagementTools>,
    activity: Arc<ActivitySearchTools>,
    owners: Arc<OwnerTools>,
    transcripts: Arc<TranscriptTools>,
    tool_router: ToolRouter<Self>,
}

// Implement ServerHandler using the tool_handler macro
#[tool_handler]
impl ServerHandler for HubSpotMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "hubspot-mcp-server".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some("MCP server for HubSpot CRM - search, create and update contacts, companies and projects, log notes, calls and meetings, search activity, and download Teams meeting transcripts.".into()),
        }
    }
}

/// Every tool outcome is text; failures are flagged as tool errors rather
/// than protocol errors.
fn render(tool: &str, result: ToolResult<String>) -> Result<CallToolResult, McpError> {
    Ok(match result {
        Ok(text) => CallToolResult::success(vec![Content::text(text)]),
        Err(e) => {
            tracing::warn!("{} failed: {}", tool, e);
            CallToolResult::error(vec![Content::text(e.to_string())])
        }
    })
}

// Tool router implementation
#[tool_router]
impl HubSpotMcpServer {
    /// Create a new server over a HubSpot client and a transcript downloader.
    pub fn new(
        client: Arc<dyn AsyncHubSpotClient>,
        transcripts: TranscriptTools,
        default_timezone: Tz,
    ) -> Self {
        Self {
            contacts: Arc::new(ContactTools::new(client.clone())),
            companies: Arc::new(CompanyTools::new(client.clone())),
            projects: Arc::new(ProjectTools::new(client.clone())),
            engagements: Arc::new(EngagementTools::new(client.clone(), default_timezone)),
            activity: Arc::new(ActivitySearchTools::new(client.clone())),
            owners: Arc::new(OwnerTools::new(client)),
            transcripts: Arc::new(transcripts),
            tool_router: Self::tool_router(),
        }
    }

    // ---- Contacts ----

    #[tool(
        description = "Search HubSpot contacts by name or email. Returns one line per contact: [id] name | email | job title."
    )]
    async fn hubspot_search_contacts(
        &self,
        params: Parameters<SearchContactsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_search_contacts query={}", params.query);
        render(
            "hubspot_search_contacts",
            self.contacts.search_contacts(params).await,
        )
    }

    #[tool(
        description = "Get a HubSpot contact by ID, including their company and most recent activity."
    )]
    async fn hubspot_get_contact(
        &self,
        params: Parameters<ContactIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_get_contact id={}", params.contact_id);
        render(
            "hubspot_get_contact",
            self.contacts.get_contact(&params.contact_id).await,
        )
    }

    #[tool(
        description = "Create a HubSpot contact, optionally linked to a company. Email is required."
    )]
    async fn hubspot_create_contact(
        &self,
        params: Parameters<CreateContactParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_create_contact");
        render(
            "hubspot_create_contact",
            self.contacts.create_contact(params.0).await,
        )
    }

    #[tool(description = "Update a HubSpot contact. Only the provided fields change.")]
    async fn hubspot_update_contact(
        &self,
        params: Parameters<UpdateContactParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_update_contact id={}", params.contact_id);
        render(
            "hubspot_update_contact",
            self.contacts.update_contact(params).await,
        )
    }

    // ---- Companies ----

    #[tool(
        description = "Search HubSpot companies by name/domain and/or lead status. Lead status: Prospect, In Discovery, In Proposal, Contract Sent, Active Customer, Revisit, Uninterested."
    )]
    async fn hubspot_search_companies(
        &self,
        params: Parameters<SearchCompaniesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_companies");
        render(
            "hubspot_search_companies",
            self.companies.search_companies(params.0).await,
        )
    }

    #[tool(description = "Get a HubSpot company by ID.")]
    async fn hubspot_get_company(
        &self,
        params: Parameters<CompanyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_get_company id={}", params.company_id);
        render(
            "hubspot_get_company",
            self.companies.get_company(&params.company_id).await,
        )
    }

    #[tool(
        description = "Create a HubSpot company. Product types: Single Family, Multi-Family, Condo (low-rise), Condo (high-rise). ICP tier: Tier 1, Tier 2, Tier 3."
    )]
    async fn hubspot_create_company(
        &self,
        params: Parameters<CreateCompanyParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_create_company");
        render(
            "hubspot_create_company",
            self.companies.create_company(params.0).await,
        )
    }

    #[tool(description = "Update a HubSpot company. Only the provided fields change.")]
    async fn hubspot_update_company(
        &self,
        params: Parameters<UpdateCompanyParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_update_company id={}", params.company_id);
        render(
            "hubspot_update_company",
            self.companies.update_company(params).await,
        )
    }

    #[tool(description = "List the projects (deals) linked to a HubSpot company.")]
    async fn hubspot_get_company_projects(
        &self,
        params: Parameters<CompanyIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!(
            "MCP Handler: hubspot_get_company_projects id={}",
            params.company_id
        );
        render(
            "hubspot_get_company_projects",
            self.companies.get_company_projects(&params.company_id).await,
        )
    }

    // ---- Projects ----

    #[tool(
        description = "Search projects (HubSpot deals) by name and/or stage. Stages: Rumored, Confirmed, Pursuing, Quoted, Active on Pluto, Closed Lost, Cancelled."
    )]
    async fn hubspot_search_projects(
        &self,
        params: Parameters<SearchProjectsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_projects");
        render(
            "hubspot_search_projects",
            self.projects.search_projects(params.0).await,
        )
    }

    #[tool(description = "Get a project (HubSpot deal) by ID, including its company.")]
    async fn hubspot_get_project(
        &self,
        params: Parameters<ProjectIdParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_get_project id={}", params.deal_id);
        render(
            "hubspot_get_project",
            self.projects.get_project(&params.deal_id).await,
        )
    }

    #[tool(
        description = "Create a project (HubSpot deal) for a company. launch_date is the public sales launch (YYYY-MM-DD)."
    )]
    async fn hubspot_create_project(
        &self,
        params: Parameters<CreateProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_create_project");
        render(
            "hubspot_create_project",
            self.projects.create_project(params.0).await,
        )
    }

    #[tool(description = "Update a project (HubSpot deal). Only the provided fields change.")]
    async fn hubspot_update_project(
        &self,
        params: Parameters<UpdateProjectParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: hubspot_update_project id={}", params.deal_id);
        render(
            "hubspot_update_project",
            self.projects.update_project(params).await,
        )
    }

    // ---- Engagements ----

    #[tool(
        description = "Add a note to a contact, company and/or project. At least one ID is required."
    )]
    async fn hubspot_add_note(
        &self,
        params: Parameters<AddNoteParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_add_note");
        render("hubspot_add_note", self.engagements.add_note(params.0).await)
    }

    #[tool(
        description = "Log a completed call against a contact, company and/or project. call_time is local time (YYYY-MM-DDTHH:MM:SS) in tz."
    )]
    async fn hubspot_log_call(
        &self,
        params: Parameters<LogCallParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_log_call");
        render("hubspot_log_call", self.engagements.log_call(params.0).await)
    }

    #[tool(
        description = "Log a meeting against a contact, company and/or project. Times are local (YYYY-MM-DDTHH:MM:SS) in tz. Use hubspot_list_users for owner and attendee IDs."
    )]
    async fn hubspot_log_meeting(
        &self,
        params: Parameters<LogMeetingParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_log_meeting");
        render(
            "hubspot_log_meeting",
            self.engagements.log_meeting(params.0).await,
        )
    }

    // ---- Activity search ----

    #[tool(
        description = "Search notes by contact, company or project, and/or a date range (YYYY-MM-DD). Newest first."
    )]
    async fn hubspot_search_notes(
        &self,
        params: Parameters<SearchNotesParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_notes");
        render(
            "hubspot_search_notes",
            self.activity.search_notes(params.0).await,
        )
    }

    #[tool(
        description = "Search calls by contact, company or project, and/or a date range (YYYY-MM-DD). Newest first."
    )]
    async fn hubspot_search_calls(
        &self,
        params: Parameters<SearchCallsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_calls");
        render(
            "hubspot_search_calls",
            self.activity.search_calls(params.0).await,
        )
    }

    #[tool(
        description = "Search meetings by contact, company or project, outcome, and/or a date range (YYYY-MM-DD). Newest first."
    )]
    async fn hubspot_search_meetings(
        &self,
        params: Parameters<SearchMeetingsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_meetings");
        render(
            "hubspot_search_meetings",
            self.activity.search_meetings(params.0).await,
        )
    }

    #[tool(
        description = "Search logged emails by contact, company, subject, and/or a date range (YYYY-MM-DD). Newest first."
    )]
    async fn hubspot_search_emails(
        &self,
        params: Parameters<SearchEmailsParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_search_emails");
        render(
            "hubspot_search_emails",
            self.activity.search_emails(params.0).await,
        )
    }

    // ---- Users ----

    #[tool(description = "List HubSpot users with their IDs, for meeting owners and attendees.")]
    async fn hubspot_list_users(&self) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: hubspot_list_users");
        render("hubspot_list_users", self.owners.list_users().await)
    }

    // ---- Transcripts ----

    #[tool(
        description = "Download a Microsoft Teams meeting transcript and save it as plain text with speaker names. Requires MS_CLIENT_ID; the first run opens a browser sign-in and later runs reuse the cached credentials. output_path parent directories are created if needed."
    )]
    async fn fetch_transcript(
        &self,
        params: Parameters<FetchTranscriptParams>,
    ) -> Result<CallToolResult, McpError> {
        tracing::info!("MCP Handler: fetch_transcript");
        render(
            "fetch_transcript",
            self.transcripts.fetch_transcript(params.0).await,
        )
    }
}
