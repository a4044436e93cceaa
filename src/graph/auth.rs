//! Microsoft identity platform sign-in for Graph calls.
//!
//! Tokens are resolved in order: a cached access token that is still valid,
//! a refresh-token redemption, and finally an interactive authorization-code
//! flow with PKCE over a loopback redirect. Every newly issued token is written
//! back to the credential store.

use super::credential_store::{AuthRecord, CredentialStore};
use crate::config::Config;
use crate::error::{GraphError, GraphResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::net::{TcpListener, TcpStream};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use urlencoding::encode;

/// Delegated Graph scopes needed to look up meetings and read transcripts.
pub const GRAPH_SCOPES: [&str; 2] = [
    "https://graph.microsoft.com/OnlineMeetings.Read",
    "https://graph.microsoft.com/OnlineMeetingTranscript.Read.All",
];

/// How long the loopback listener waits for the browser redirect.
pub const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(300);

const VERIFIER_LEN: usize = 64;
const STATE_LEN: usize = 32;

const SIGN_IN_PAGE: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nConnection: close\r\n\r\n\
<html><body>Sign-in complete. You can close this tab now.</body></html>";

/// Identity platform endpoints and client registration.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub tenant_id: String,
    pub authority_url: String,
}

impl OAuthSettings {
    pub fn from_config(config: &Config, client_id: &str) -> Self {
        Self {
            client_id: client_id.to_string(),
            tenant_id: config.ms_tenant_id.clone(),
            authority_url: config.ms_authority_url.clone(),
        }
    }

    pub fn authorize_endpoint(&self) -> String {
        format!(
            "{}/{}/oauth2/v2.0/authorize",
            self.authority_url, self.tenant_id
        )
    }

    pub fn token_endpoint(&self) -> String {
        format!("{}/{}/oauth2/v2.0/token", self.authority_url, self.tenant_id)
    }

    /// Space-separated scope string, including `offline_access` so a
    /// refresh token is issued.
    pub fn scope(&self) -> String {
        let mut scopes = GRAPH_SCOPES.to_vec();
        scopes.push("offline_access");
        scopes.join(" ")
    }

    /// Browser URL for the authorization-code request.
    pub fn authorization_url(&self, redirect_uri: &str, code_challenge: &str, state: &str) -> String {
        format!(
            "{}?client_id={}&response_type=code&redirect_uri={}&response_mode=query&scope={}&state={}&code_challenge={}&code_challenge_method=S256",
            self.authorize_endpoint(),
            encode(&self.client_id),
            encode(redirect_uri),
            encode(&self.scope()),
            state,
            code_challenge
        )
    }
}

/// Authorization code returned by an interactive sign-in, with the values
/// needed to redeem it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationGrant {
    pub code: String,
    pub code_verifier: String,
    pub redirect_uri: String,
}

/// Interactive step of the sign-in, swapped out in tests.
pub trait InteractiveSignIn: Send + Sync {
    fn sign_in(&self, settings: &OAuthSettings) -> GraphResult<AuthorizationGrant>;
}

/// Random alphanumeric string for PKCE verifiers and state values.
pub fn random_token(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// S256 code challenge for a PKCE verifier.
pub fn pkce_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Browser sign-in that receives the redirect on an ephemeral localhost port.
#[derive(Debug, Clone)]
pub struct LoopbackSignIn {
    timeout: Duration,
}

impl Default for LoopbackSignIn {
    fn default() -> Self {
        Self {
            timeout: SIGN_IN_TIMEOUT,
        }
    }
}

impl LoopbackSignIn {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl InteractiveSignIn for LoopbackSignIn {
    fn sign_in(&self, settings: &OAuthSettings) -> GraphResult<AuthorizationGrant> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let redirect_uri = format!("http://localhost:{}", port);

        let code_verifier = random_token(VERIFIER_LEN);
        let state = random_token(STATE_LEN);
        let url = settings.authorization_url(&redirect_uri, &pkce_challenge(&code_verifier), &state);

        tracing::warn!("Microsoft sign-in required: {}", url);
        eprintln!("Open this URL in your browser to sign in to Microsoft:\n\n{}\n", url);
        open_browser(&url);

        let params = wait_for_redirect(&listener, self.timeout)?;
        if let Some(error) = params.get("error") {
            let description = params
                .get("error_description")
                .map(String::as_str)
                .unwrap_or("");
            return Err(GraphError::Auth(format!("{} {}", error, description).trim().to_string()));
        }
        if params.get("state").map(String::as_str) != Some(state.as_str()) {
            return Err(GraphError::Auth("state mismatch in sign-in redirect".to_string()));
        }
        let code = params
            .get("code")
            .cloned()
            .ok_or_else(|| GraphError::Auth("no authorization code in redirect".to_string()))?;

        Ok(AuthorizationGrant {
            code,
            code_verifier,
            redirect_uri,
        })
    }
}

/// Best-effort launch of the system browser. Output is discarded so nothing
/// reaches the MCP stdout channel.
fn open_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };

    let launched = command
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = launched {
        tracing::debug!("Could not open a browser: {}", e);
    }
}

/// Accept connections until one carries a query string, or the timeout passes.
fn wait_for_redirect(
    listener: &TcpListener,
    timeout: Duration,
) -> GraphResult<HashMap<String, String>> {
    listener.set_nonblocking(true)?;
    let started = Instant::now();

    loop {
        match listener.accept() {
            Ok((stream, _)) => {
                stream.set_nonblocking(false)?;
                if let Some(params) = handle_redirect(stream)? {
                    return Ok(params);
                }
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                if started.elapsed() >= timeout {
                    return Err(GraphError::Auth(
                        "timed out waiting for browser sign-in".to_string(),
                    ));
                }
                std::thread::sleep(Duration::from_millis(200));
            }
            Err(e) => return Err(e.into()),
        }
    }
}

/// Read one request; `None` for requests without a query (favicon and the like).
fn handle_redirect(mut stream: TcpStream) -> GraphResult<Option<HashMap<String, String>>> {
    let mut request_line = String::new();
    BufReader::new(&stream).read_line(&mut request_line)?;

    let query = request_line
        .split_whitespace()
        .nth(1)
        .and_then(|target| target.split_once('?'))
        .map(|(_, query)| query.to_string());

    match query {
        Some(query) => {
            stream.write_all(SIGN_IN_PAGE.as_bytes())?;
            Ok(Some(parse_query(&query)))
        }
        None => {
            let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n");
            Ok(None)
        }
    }
}

/// Decode an `application/x-www-form-urlencoded` query string.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => spaced,
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Resolves Graph access tokens, signing in only when nothing cached works.
pub struct TokenProvider {
    settings: OAuthSettings,
    agent: ureq::Agent,
    store: Arc<dyn CredentialStore>,
    sign_in: Arc<dyn InteractiveSignIn>,
}

impl TokenProvider {
    pub fn new(
        settings: OAuthSettings,
        store: Arc<dyn CredentialStore>,
        sign_in: Arc<dyn InteractiveSignIn>,
        timeout: Duration,
    ) -> Self {
        Self {
            settings,
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            store,
            sign_in,
        }
    }

    pub fn settings(&self) -> &OAuthSettings {
        &self.settings
    }

    /// A bearer token for Graph, blocking on the browser if needed.
    pub fn access_token(&self) -> GraphResult<String> {
        let record = self
            .store
            .load()?
            .filter(|r| r.client_id.as_deref().map_or(true, |id| id == self.settings.client_id));
        let now = Utc::now().timestamp();

        if let Some(token) = record.as_ref().and_then(|r| r.valid_access_token(now)) {
            tracing::debug!("Using cached Graph access token");
            return Ok(token.to_string());
        }

        if let Some(refresh_token) = record.as_ref().and_then(|r| r.refresh_token.clone()) {
            match self.redeem(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ]) {
                Ok(tokens) => {
                    tracing::debug!("Refreshed Graph access token");
                    return self.remember(tokens, Some(refresh_token));
                }
                Err(e) => tracing::warn!("Token refresh failed, signing in again: {}", e),
            }
        }

        let grant = self.sign_in.sign_in(&self.settings)?;
        let tokens = self.redeem(&[
            ("grant_type", "authorization_code"),
            ("code", grant.code.as_str()),
            ("redirect_uri", grant.redirect_uri.as_str()),
            ("code_verifier", grant.code_verifier.as_str()),
        ])?;
        tracing::info!("Signed in to Microsoft Graph");
        self.remember(tokens, None)
    }

    /// POST a grant to the token endpoint.
    fn redeem(&self, grant: &[(&str, &str)]) -> GraphResult<TokenResponse> {
        let scope = self.settings.scope();
        let mut form = vec![
            ("client_id", self.settings.client_id.as_str()),
            ("scope", scope.as_str()),
        ];
        form.extend_from_slice(grant);

        match self.agent.post(&self.settings.token_endpoint()).send_form(&form) {
            Ok(response) => {
                let body = response.into_string()?;
                Ok(serde_json::from_str(&body)?)
            }
            Err(ureq::Error::Status(status, response)) => {
                let body = response.into_string().unwrap_or_default();
                let reason = serde_json::from_str::<TokenErrorBody>(&body)
                    .ok()
                    .and_then(|b| b.error_description.or(b.error))
                    .unwrap_or(body);
                Err(GraphError::Auth(format!("token endpoint returned {}: {}", status, reason)))
            }
            Err(e) => Err(GraphError::HttpError(e.to_string())),
        }
    }

    /// Save freshly issued tokens, keeping the old refresh token when the
    /// response omits one.
    fn remember(&self, tokens: TokenResponse, previous_refresh: Option<String>) -> GraphResult<String> {
        let record = AuthRecord {
            access_token: Some(tokens.access_token.clone()),
            expires_at: Some(Utc::now().timestamp() + tokens.expires_in.unwrap_or(3600)),
            refresh_token: tokens.refresh_token.or(previous_refresh),
            client_id: Some(self.settings.client_id.clone()),
            tenant_id: Some(self.settings.tenant_id.clone()),
        };
        self.store.save(&record)?;
        Ok(tokens.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        OAuthSettings {
            client_id: "client-123".to_string(),
            tenant_id: "organizations".to_string(),
            authority_url: "https://login.microsoftonline.com".to_string(),
        }
    }

    #[test]
    fn test_endpoints_and_scope() {
        let s = settings();
        assert_eq!(
            s.token_endpoint(),
            "https://login.microsoftonline.com/organizations/oauth2/v2.0/token"
        );
        assert!(s.scope().ends_with(" offline_access"));
        assert!(s.scope().contains("OnlineMeetingTranscript.Read.All"));
    }

    #[test]
    fn test_pkce_challenge_matches_rfc_7636_example() {
        assert_eq!(
            pkce_challenge("dBjftJeZ4CVP-mJ92IZ0yQ0Mz1q6eTHwrs-Wmye54bA"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_random_token_is_alphanumeric() {
        let token = random_token(64);
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_authorization_url_carries_pkce_and_state() {
        let url = settings().authorization_url("http://localhost:5555", "challenge", "state42");
        assert!(url.starts_with(
            "https://login.microsoftonline.com/organizations/oauth2/v2.0/authorize?client_id=client-123"
        ));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5555"));
        assert!(url.contains("state=state42"));
        assert!(url.contains("code_challenge=challenge&code_challenge_method=S256"));
    }

    #[test]
    fn test_parse_query_decodes_values() {
        let params = parse_query("code=abc%2Fdef&state=xyz&error_description=user+cancelled");
        assert_eq!(params.get("code").map(String::as_str), Some("abc/def"));
        assert_eq!(params.get("state").map(String::as_str), Some("xyz"));
        assert_eq!(
            params.get("error_description").map(String::as_str),
            Some("user cancelled")
        );
    }

    #[test]
    fn test_loopback_redirect_is_parsed() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let browser = std::thread::spawn(move || {
            let mut favicon = TcpStream::connect(addr).unwrap();
            favicon.write_all(b"GET /favicon.ico HTTP/1.1\r\n\r\n").unwrap();
            let mut ignored = String::new();
            std::io::Read::read_to_string(&mut favicon, &mut ignored).unwrap();
            let mut redirect = TcpStream::connect(addr).unwrap();
            redirect
                .write_all(b"GET /?code=the-code&state=s1 HTTP/1.1\r\nHost: localhost\r\n\r\n")
                .unwrap();
            let mut response = String::new();
            std::io::Read::read_to_string(&mut redirect, &mut response).unwrap();
            response
        });

        let params = wait_for_redirect(&listener, Duration::from_secs(10)).unwrap();
        assert_eq!(params.get("code").map(String::as_str), Some("the-code"));
        assert!(browser.join().unwrap().contains("You can close this tab now."));
    }
}
