//! Async wrapper around synchronous HubSpotClient.
//!
//! This module provides an async interface to the synchronous HubSpotClient by using
//! `tokio::task::spawn_blocking` to run HTTP operations on a dedicated thread pool,
//! preventing blocking of the async runtime.

use crate::client::HubSpotClient;
use crate::domain::ObjectType;
use crate::error::{HubSpotApiError, HubSpotApiResult};
use crate::models::*;
use async_trait::async_trait;
use std::sync::Arc;

/// Async trait for HubSpot operations.
///
/// Tools depend on this trait rather than on [`HubSpotClient`], so tests can
/// substitute a recording mock.
#[async_trait]
pub trait AsyncHubSpotClient: Send + Sync {
    /// Whether a token is configured. Checked before any other work.
    fn has_access_token(&self) -> bool;

    async fn get_object(
        &self,
        object_type: ObjectType,
        id: &str,
        properties: &'static [&'static str],
        associations: Option<ObjectType>,
    ) -> HubSpotApiResult<CrmObject>;

    async fn create_object(
        &self,
        object_type: ObjectType,
        request: CreateObjectRequest,
    ) -> HubSpotApiResult<CrmObject>;

    async fn update_object(
        &self,
        object_type: ObjectType,
        id: &str,
        request: UpdateObjectRequest,
    ) -> HubSpotApiResult<CrmObject>;

    async fn search_objects(
        &self,
        object_type: ObjectType,
        request: SearchRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>>;

    async fn batch_read(
        &self,
        object_type: ObjectType,
        request: BatchReadRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>>;

    async fn associated_ids(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<String>>;

    async fn list_associations(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<AssociatedId>>;

    async fn list_owners(&self) -> HubSpotApiResult<Vec<Owner>>;
}

/// Async wrapper around synchronous HubSpotClient.
#[derive(Clone)]
pub struct AsyncHubSpotClientImpl {
    client: Arc<HubSpotClient>,
}

impl AsyncHubSpotClientImpl {
    pub fn new(client: HubSpotClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    /// Underlying blocking client.
    pub fn inner(&self) -> &HubSpotClient {
        &self.client
    }

    /// Run a blocking client call on the blocking thread pool.
    async fn run<T, F>(&self, call: F) -> HubSpotApiResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&HubSpotClient) -> HubSpotApiResult<T> + Send + 'static,
    {
        let client = self.client.clone();

        tokio::task::spawn_blocking(move || call(&client))
            .await
            .map_err(|e| HubSpotApiError::HttpError(format!("Task join error: {}", e)))?
    }
}

#[async_trait]
impl AsyncHubSpotClient for AsyncHubSpotClientImpl {
    fn has_access_token(&self) -> bool {
        self.client.has_access_token()
    }

    async fn get_object(
        &self,
        object_type: ObjectType,
        id: &str,
        properties: &'static [&'static str],
        associations: Option<ObjectType>,
    ) -> HubSpotApiResult<CrmObject> {
        let id = id.to_string();
        self.run(move |c| c.get_object(object_type, &id, properties, associations))
            .await
    }

    async fn create_object(
        &self,
        object_type: ObjectType,
        request: CreateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        self.run(move |c| c.create_object(object_type, &request))
            .await
    }

    async fn update_object(
        &self,
        object_type: ObjectType,
        id: &str,
        request: UpdateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        let id = id.to_string();
        self.run(move |c| c.update_object(object_type, &id, &request))
            .await
    }

    async fn search_objects(
        &self,
        object_type: ObjectType,
        request: SearchRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        self.run(move |c| c.search_objects(object_type, &request))
            .await
    }

    async fn batch_read(
        &self,
        object_type: ObjectType,
        request: BatchReadRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        self.run(move |c| c.batch_read(object_type, &request)).await
    }

    async fn associated_ids(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<String>> {
        let id = id.to_string();
        self.run(move |c| c.associated_ids(from, &id, to)).await
    }

    async fn list_associations(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<AssociatedId>> {
        let id = id.to_string();
        self.run(move |c| c.list_associations(from, &id, to)).await
    }

    async fn list_owners(&self) -> HubSpotApiResult<Vec<Owner>> {
        self.run(|c| c.list_owners()).await
    }
}
