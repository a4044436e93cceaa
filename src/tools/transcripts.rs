//! Teams transcript download.
//!
//! Resolves a meeting from its join link, downloads the first transcript as
//! WebVTT, strips the caption markup and writes `Speaker: text` lines to disk.

use super::require_field;
use crate::config::Config;
use crate::error::{GraphError, ToolError, ToolResult};
use crate::graph::{
    clean_vtt, FileCredentialStore, GraphClient, LoopbackSignIn, OAuthSettings, TokenProvider,
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FetchTranscriptParams {
    /// Teams meeting join link
    pub join_url: String,
    /// File to write the plain-text transcript to
    pub output_path: String,
}

pub struct TranscriptTools {
    /// `None` when no Microsoft client ID is configured
    tokens: Option<Arc<TokenProvider>>,
    graph: Arc<GraphClient>,
}

impl TranscriptTools {
    pub fn new(tokens: Option<TokenProvider>, graph: GraphClient) -> Self {
        Self {
            tokens: tokens.map(Arc::new),
            graph: Arc::new(graph),
        }
    }

    /// Browser sign-in with the auth record cached at `AUTH_RECORD_PATH`.
    pub fn from_config(config: &Config) -> Self {
        let tokens = config.ms_client_id.as_deref().map(|client_id| {
            TokenProvider::new(
                OAuthSettings::from_config(config, client_id),
                Arc::new(FileCredentialStore::new(config.auth_record_path.clone())),
                Arc::new(LoopbackSignIn::default()),
                Duration::from_secs(config.request_timeout),
            )
        });
        Self::new(tokens, GraphClient::new(config))
    }

    pub async fn fetch_transcript(&self, params: FetchTranscriptParams) -> ToolResult<String> {
        let tokens = self.tokens.clone().ok_or(ToolError::MissingClientId)?;
        let join_url = require_field(&params.join_url, "join_url")?.to_string();
        let output_path = PathBuf::from(require_field(&params.output_path, "output_path")?);
        let graph = Arc::clone(&self.graph);

        tokio::task::spawn_blocking(move || download(&tokens, &graph, &join_url, &output_path))
            .await
            .map_err(|e| ToolError::Request(format!("Task join error: {}", e)))?
    }
}

/// Body text of a Graph error response, or the error itself.
fn error_detail(err: GraphError) -> String {
    match err {
        GraphError::ApiError { message, .. } => message,
        other => other.to_string(),
    }
}

fn download(
    tokens: &TokenProvider,
    graph: &GraphClient,
    join_url: &str,
    output_path: &Path,
) -> ToolResult<String> {
    let token = tokens
        .access_token()
        .map_err(|e| ToolError::Transcript(format!("Error: {}", e)))?;

    let meeting = match graph.find_meeting(&token, join_url) {
        Ok(Some(meeting)) => meeting,
        Ok(None) => return Ok("No meeting found for this Join URL.".to_string()),
        Err(e) => {
            return Err(ToolError::Transcript(format!(
                "Error finding meeting: {}",
                error_detail(e)
            )))
        }
    };
    tracing::info!(
        "Resolved meeting {} ({})",
        meeting.id,
        meeting.subject.as_deref().unwrap_or("Unknown Meeting")
    );

    let transcripts = graph
        .list_transcripts(&token, &meeting.id)
        .unwrap_or_else(|e| {
            tracing::warn!("Listing transcripts failed: {}", e);
            Vec::new()
        });
    let Some(transcript) = transcripts.first() else {
        return Ok("No transcripts available.".to_string());
    };

    let vtt = graph
        .download_transcript(&token, &meeting.id, &transcript.id)
        .map_err(|e| {
            ToolError::Transcript(format!("Error downloading transcript: {}", error_detail(e)))
        })?;

    write_transcript(output_path, &clean_vtt(&vtt))
        .map_err(|e| ToolError::Transcript(format!("Error writing transcript: {}", e)))?;
    tracing::info!("Saved transcript to {}", output_path.display());

    Ok(format!(
        "Successfully saved transcript to: {}",
        output_path.display()
    ))
}

fn write_transcript(path: &Path, text: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_client_id_is_reported_first() {
        let tools = TranscriptTools::new(
            None,
            GraphClient::with_base_url("http://127.0.0.1:9".to_string(), Duration::from_secs(1)),
        );
        let err = tools
            .fetch_transcript(FetchTranscriptParams {
                join_url: String::new(),
                output_path: String::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Error: MS_CLIENT_ID not set");
    }

    #[test]
    fn test_error_detail_prefers_response_body() {
        let err = GraphError::ApiError {
            status: 400,
            message: "{\"error\":\"bad filter\"}".to_string(),
        };
        assert_eq!(error_detail(err), "{\"error\":\"bad filter\"}");
        assert_eq!(
            error_detail(GraphError::HttpError("refused".to_string())),
            "HTTP request failed: refused"
        );
    }
}
