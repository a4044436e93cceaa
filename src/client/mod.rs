//! HTTP client for the HubSpot CRM v3/v4 REST API.
//!
//! This module provides a synchronous HTTP client that can be used from async contexts
//! via `tokio::task::spawn_blocking`. The client handles bearer authentication, error
//! mapping, and the generic object endpoints every CRM tool is built on.

mod async_wrapper;
pub use async_wrapper::{AsyncHubSpotClient, AsyncHubSpotClientImpl};

use crate::config::Config;
use crate::domain::ObjectType;
use crate::error::{HubSpotApiError, HubSpotApiResult};
use crate::metrics::{HttpTimer, Metrics};
use crate::models::{
    AssociatedId, AssociationPage, AssociationPageV4, BatchReadRequest, CreateObjectRequest,
    CrmObject, ObjectPage, Owner, OwnerPage, SearchRequest, UpdateObjectRequest,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Page size used when listing v4 associations.
pub const ASSOCIATION_PAGE_SIZE: usize = 500;

/// HTTP client for the HubSpot CRM API.
///
/// This client uses `ureq` for synchronous HTTP requests and can be called
/// from async contexts using `tokio::task::spawn_blocking`.
#[derive(Clone)]
pub struct HubSpotClient {
    /// Base URL for the HubSpot API
    base_url: String,

    /// Private app token; requests fail with `MissingToken` without it
    access_token: Option<String>,

    /// HTTP client agent
    agent: Arc<ureq::Agent>,

    /// Metrics collector
    metrics: Metrics,
}

impl HubSpotClient {
    /// Create a new HubSpotClient from configuration.
    pub fn new(config: &Config) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        Self {
            base_url: config.hubspot_base_url.clone(),
            access_token: config.hubspot_access_token.clone(),
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Create a HubSpotClient with a custom base URL (useful for testing).
    #[doc(hidden)]
    pub fn with_base_url(base_url: String, access_token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(10))
            .build();

        Self {
            base_url,
            access_token,
            agent: Arc::new(agent),
            metrics: Metrics::new(),
        }
    }

    /// Get a reference to the metrics collector.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    pub fn has_access_token(&self) -> bool {
        self.access_token.is_some()
    }

    /// Build a full URL from a path.
    fn build_url(&self, path: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        let path = path.trim_start_matches('/');
        format!("{}/{}", base, path)
    }

    /// Execute an authenticated request, with an optional JSON body.
    fn send(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> HubSpotApiResult<ureq::Response> {
        let token = self
            .access_token
            .as_deref()
            .ok_or(HubSpotApiError::MissingToken)?;
        let url = self.build_url(path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .agent
            .request(method, &url)
            .set("Authorization", &format!("Bearer {}", token))
            .set("Content-Type", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }

        let timer = HttpTimer::new(&self.metrics);
        let result = match body {
            Some(body) => {
                tracing::debug!(
                    "Request body: {}",
                    serde_json::to_string(&body).unwrap_or_else(|_| "<invalid json>".to_string())
                );
                request.send_json(body)
            }
            None => request.call(),
        };

        match result {
            Ok(response) => {
                tracing::debug!("{} {} - status {}", method, url, response.status());
                timer.complete();
                Ok(response)
            }
            Err(e) => {
                timer.complete_with_error();
                let err = self.map_error(e);
                tracing::error!("{} {} - Error: {}", method, url, err);
                Err(err)
            }
        }
    }

    fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> HubSpotApiResult<T> {
        let response = self.send(method, path, query, body)?;
        let text = response
            .into_string()
            .map_err(|e| HubSpotApiError::HttpError(e.to_string()))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Map a ureq error to a HubSpotApiError.
    fn map_error(&self, error: ureq::Error) -> HubSpotApiError {
        match error {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "Unknown error".to_string());
                HubSpotApiError::ApiError { status, message }
            }
            ureq::Error::Transport(transport) => {
                if transport.kind() == ureq::ErrorKind::ConnectionFailed {
                    HubSpotApiError::HttpError("Connection failed".to_string())
                } else if transport.kind() == ureq::ErrorKind::Io {
                    HubSpotApiError::Timeout
                } else {
                    HubSpotApiError::HttpError(transport.to_string())
                }
            }
        }
    }

    // ========================= Object Operations =========================

    /// `GET /crm/v3/objects/{type}/{id}`, optionally embedding one association type.
    pub fn get_object(
        &self,
        object_type: ObjectType,
        id: &str,
        properties: &[&str],
        associations: Option<ObjectType>,
    ) -> HubSpotApiResult<CrmObject> {
        let path = format!("/crm/v3/objects/{}/{}", object_type, id);
        let mut query = vec![("properties", properties.join(","))];
        if let Some(assoc) = associations {
            query.push(("associations", assoc.to_string()));
        }

        let object: CrmObject = self.send_json("GET", &path, &query, None)?;
        self.metrics.record_objects_fetched(1);
        Ok(object)
    }

    /// `POST /crm/v3/objects/{type}`.
    pub fn create_object(
        &self,
        object_type: ObjectType,
        request: &CreateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        let path = format!("/crm/v3/objects/{}", object_type);
        let body = serde_json::to_value(request)?;
        self.send_json("POST", &path, &[], Some(body))
    }

    /// `PATCH /crm/v3/objects/{type}/{id}`.
    pub fn update_object(
        &self,
        object_type: ObjectType,
        id: &str,
        request: &UpdateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        let path = format!("/crm/v3/objects/{}/{}", object_type, id);
        let body = serde_json::to_value(request)?;
        self.send_json("PATCH", &path, &[], Some(body))
    }

    /// `POST /crm/v3/objects/{type}/search`.
    pub fn search_objects(
        &self,
        object_type: ObjectType,
        request: &SearchRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        let path = format!("/crm/v3/objects/{}/search", object_type);
        let body = serde_json::to_value(request)?;
        let page: ObjectPage = self.send_json("POST", &path, &[], Some(body))?;
        self.metrics.record_objects_fetched(page.results.len());
        Ok(page.results)
    }

    /// `POST /crm/v3/objects/{type}/batch/read`.
    pub fn batch_read(
        &self,
        object_type: ObjectType,
        request: &BatchReadRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        let path = format!("/crm/v3/objects/{}/batch/read", object_type);
        let body = serde_json::to_value(request)?;
        let page: ObjectPage = self.send_json("POST", &path, &[], Some(body))?;
        self.metrics.record_objects_fetched(page.results.len());
        Ok(page.results)
    }

    // ====================== Association Operations ======================

    /// IDs of `to` records linked to a record, via the v4 associations API.
    ///
    /// Only the first page of [`ASSOCIATION_PAGE_SIZE`] entries is read.
    pub fn associated_ids(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<String>> {
        let path = format!("/crm/v4/objects/{}/{}/associations/{}", from, id, to);
        let query = [("limit", ASSOCIATION_PAGE_SIZE.to_string())];
        let page: AssociationPageV4 = self.send_json("GET", &path, &query, None)?;
        Ok(page.into_ids())
    }

    /// Linked records via the v3 associations API.
    pub fn list_associations(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<AssociatedId>> {
        let path = format!("/crm/v3/objects/{}/{}/associations/{}", from, id, to);
        let page: AssociationPage = self.send_json("GET", &path, &[], None)?;
        Ok(page.results)
    }

    // ========================= Owner Operations =========================

    /// `GET /crm/v3/owners`.
    pub fn list_owners(&self) -> HubSpotApiResult<Vec<Owner>> {
        let page: OwnerPage = self.send_json("GET", "/crm/v3/owners", &[], None)?;
        Ok(page.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_url() {
        let client = HubSpotClient::with_base_url(
            "https://api.hubapi.com/".to_string(),
            Some("token".to_string()),
        );
        assert_eq!(
            client.build_url("/crm/v3/owners"),
            "https://api.hubapi.com/crm/v3/owners"
        );
    }

    #[test]
    fn test_missing_token_fails_without_request() {
        let client = HubSpotClient::with_base_url("http://127.0.0.1:9".to_string(), None);
        assert!(!client.has_access_token());

        let err = client.list_owners().unwrap_err();
        assert!(matches!(err, HubSpotApiError::MissingToken));
        assert_eq!(client.metrics().http_requests_total(), 0);
    }

    #[test]
    fn test_status_error_keeps_code() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/crm/v3/objects/deals/1")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .with_body(r#"{"message":"not found"}"#)
            .create();

        let client = HubSpotClient::with_base_url(server.url(), Some("token".to_string()));
        let err = client
            .get_object(ObjectType::Deals, "1", &["dealname"], None)
            .unwrap_err();

        mock.assert();
        assert_eq!(err.status(), Some(404));
        assert_eq!(client.metrics().http_errors_total(), 1);
    }
}
