//! Microsoft Graph access for Teams meeting transcripts.
//!
//! Like the HubSpot client this is a blocking `ureq` client; callers run it
//! on `tokio::task::spawn_blocking`. Authentication lives in [`auth`], token
//! persistence in [`credential_store`] and caption cleanup in [`vtt`].

pub mod auth;
pub mod credential_store;
pub mod vtt;

pub use auth::{
    AuthorizationGrant, InteractiveSignIn, LoopbackSignIn, OAuthSettings, TokenProvider,
    GRAPH_SCOPES,
};
pub use credential_store::{
    AuthRecord, CredentialStore, FileCredentialStore, MemoryCredentialStore,
};
pub use vtt::clean_vtt;

use crate::config::Config;
use crate::error::{GraphError, GraphResult};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use urlencoding::encode;

/// A Teams meeting as returned by `/me/onlineMeetings`.
#[derive(Debug, Clone, Deserialize)]
pub struct OnlineMeeting {
    pub id: String,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Transcript metadata for a meeting.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptInfo {
    pub id: String,
    #[serde(default)]
    pub created_date_time: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Collection<T> {
    #[serde(default = "Vec::new")]
    value: Vec<T>,
}

/// Blocking Microsoft Graph client scoped to the signed-in user's meetings.
#[derive(Clone)]
pub struct GraphClient {
    base_url: String,
    agent: ureq::Agent,
}

impl GraphClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            config.graph_base_url.clone(),
            Duration::from_secs(config.request_timeout),
        )
    }

    #[doc(hidden)]
    pub fn with_base_url(base_url: String, timeout: Duration) -> Self {
        Self {
            base_url,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }

    fn get(&self, token: &str, url: &str, accept: &str) -> GraphResult<String> {
        tracing::debug!("GET {}", url);
        let result = self
            .agent
            .get(url)
            .set("Authorization", &format!("Bearer {}", token))
            .set("Accept", accept)
            .call();

        match result {
            Ok(response) => Ok(response.into_string()?),
            Err(ureq::Error::Status(status, response)) => {
                let message = response.into_string().unwrap_or_default();
                tracing::error!("Graph returned {} for {}", status, url);
                Err(GraphError::ApiError { status, message })
            }
            Err(e) => {
                tracing::error!("Graph request failed: {}", e);
                Err(GraphError::HttpError(e.to_string()))
            }
        }
    }

    fn get_json<T: DeserializeOwned>(&self, token: &str, url: &str) -> GraphResult<T> {
        let body = self.get(token, url, "application/json")?;
        Ok(serde_json::from_str(&body)?)
    }

    /// The meeting whose join link equals `join_url`, if any.
    pub fn find_meeting(&self, token: &str, join_url: &str) -> GraphResult<Option<OnlineMeeting>> {
        let url = format!(
            "{}/me/onlineMeetings?$filter=JoinWebUrl%20eq%20'{}'",
            self.base_url,
            encode(join_url)
        );
        let page: Collection<OnlineMeeting> = self.get_json(token, &url)?;
        Ok(page.value.into_iter().next())
    }

    pub fn list_transcripts(&self, token: &str, meeting_id: &str) -> GraphResult<Vec<TranscriptInfo>> {
        let url = format!("{}/me/onlineMeetings/{}/transcripts", self.base_url, meeting_id);
        let page: Collection<TranscriptInfo> = self.get_json(token, &url)?;
        Ok(page.value)
    }

    /// Raw WebVTT content of one transcript.
    pub fn download_transcript(
        &self,
        token: &str,
        meeting_id: &str,
        transcript_id: &str,
    ) -> GraphResult<String> {
        let url = format!(
            "{}/me/onlineMeetings/{}/transcripts/{}/content",
            self.base_url, meeting_id, transcript_id
        );
        self.get(token, &url, "text/vtt")
    }
}
