use async_trait::async_trait;
use hubspot_mcp_server::client::AsyncHubSpotClient;
use hubspot_mcp_server::domain::ObjectType;
use hubspot_mcp_server::error::{HubSpotApiError, HubSpotApiResult};
use hubspot_mcp_server::models::*;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// One call made through the mock, with its request body as JSON.
#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub method: &'static str,
    pub object_type: Option<ObjectType>,
    pub id: Option<String>,
    pub body: Value,
}

/// Mock HubSpot client for testing.
///
/// Serves objects from an in-memory store and records every call, so tests
/// can assert both the request payloads and that validation failures never
/// reach the network.
#[allow(dead_code)]
#[derive(Clone)]
pub struct MockHubSpotClient {
    has_token: bool,
    objects: Arc<Mutex<HashMap<(ObjectType, String), CrmObject>>>,
    associations: Arc<Mutex<HashMap<(ObjectType, String, ObjectType), Vec<String>>>>,
    search_results: Arc<Mutex<Vec<CrmObject>>>,
    owners: Arc<Mutex<Vec<Owner>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

#[allow(dead_code)]
impl MockHubSpotClient {
    /// Create a mock with a configured token and an empty store.
    pub fn new() -> Self {
        Self::with_token(true)
    }

    pub fn with_token(has_token: bool) -> Self {
        Self {
            has_token,
            objects: Arc::new(Mutex::new(HashMap::new())),
            associations: Arc::new(Mutex::new(HashMap::new())),
            search_results: Arc::new(Mutex::new(Vec::new())),
            owners: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn add_object(&self, object_type: ObjectType, id: &str, properties: &[(&str, &str)]) {
        let object = CrmObject::new(id, properties.iter().copied().collect());
        self.objects
            .lock()
            .unwrap()
            .insert((object_type, id.to_string()), object);
    }

    pub fn associate(&self, from: ObjectType, id: &str, to: ObjectType, targets: &[&str]) {
        self.associations.lock().unwrap().insert(
            (from, id.to_string(), to),
            targets.iter().map(|t| t.to_string()).collect(),
        );
    }

    pub fn set_search_results(&self, results: Vec<CrmObject>) {
        *self.search_results.lock().unwrap() = results;
    }

    pub fn set_owners(&self, owners: Vec<Owner>) {
        *self.owners.lock().unwrap() = owners;
    }

    /// Total number of API calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls made to one method.
    pub fn calls_to(&self, method: &str) -> Vec<RecordedCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method)
            .collect()
    }

    fn record(
        &self,
        method: &'static str,
        object_type: Option<ObjectType>,
        id: Option<&str>,
        body: Value,
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            object_type,
            id: id.map(str::to_string),
            body,
        });
    }

    fn not_found() -> HubSpotApiError {
        HubSpotApiError::ApiError {
            status: 404,
            message: "resource not found".to_string(),
        }
    }
}

#[async_trait]
impl AsyncHubSpotClient for MockHubSpotClient {
    fn has_access_token(&self) -> bool {
        self.has_token
    }

    async fn get_object(
        &self,
        object_type: ObjectType,
        id: &str,
        _properties: &'static [&'static str],
        _associations: Option<ObjectType>,
    ) -> HubSpotApiResult<CrmObject> {
        self.record("get_object", Some(object_type), Some(id), Value::Null);
        self.objects
            .lock()
            .unwrap()
            .get(&(object_type, id.to_string()))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn create_object(
        &self,
        object_type: ObjectType,
        request: CreateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        let body = serde_json::to_value(&request)?;
        self.record("create_object", Some(object_type), None, body.clone());

        let id = format!("{}", 1000 + self.call_count());
        let properties: Properties = body["properties"]
            .as_object()
            .map(|props| {
                props
                    .iter()
                    .map(|(k, v)| (k.clone(), v.as_str().unwrap_or_default().to_string()))
                    .collect()
            })
            .unwrap_or_default();
        let object = CrmObject::new(id.clone(), properties);
        self.objects
            .lock()
            .unwrap()
            .insert((object_type, id), object.clone());
        Ok(object)
    }

    async fn update_object(
        &self,
        object_type: ObjectType,
        id: &str,
        request: UpdateObjectRequest,
    ) -> HubSpotApiResult<CrmObject> {
        self.record(
            "update_object",
            Some(object_type),
            Some(id),
            serde_json::to_value(&request)?,
        );
        self.objects
            .lock()
            .unwrap()
            .get(&(object_type, id.to_string()))
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn search_objects(
        &self,
        object_type: ObjectType,
        request: SearchRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        self.record(
            "search_objects",
            Some(object_type),
            None,
            serde_json::to_value(&request)?,
        );
        Ok(self.search_results.lock().unwrap().clone())
    }

    async fn batch_read(
        &self,
        object_type: ObjectType,
        request: BatchReadRequest,
    ) -> HubSpotApiResult<Vec<CrmObject>> {
        self.record(
            "batch_read",
            Some(object_type),
            None,
            serde_json::to_value(&request)?,
        );
        let objects = self.objects.lock().unwrap();
        Ok(request
            .inputs
            .iter()
            .filter_map(|input| objects.get(&(object_type, input.id.clone())).cloned())
            .collect())
    }

    async fn associated_ids(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<String>> {
        self.record("associated_ids", Some(from), Some(id), Value::Null);
        Ok(self
            .associations
            .lock()
            .unwrap()
            .get(&(from, id.to_string(), to))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_associations(
        &self,
        from: ObjectType,
        id: &str,
        to: ObjectType,
    ) -> HubSpotApiResult<Vec<AssociatedId>> {
        self.record("list_associations", Some(from), Some(id), Value::Null);
        Ok(self
            .associations
            .lock()
            .unwrap()
            .get(&(from, id.to_string(), to))
            .map(|ids| {
                ids.iter()
                    .map(|id| AssociatedId {
                        id: id.clone(),
                        kind: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_owners(&self) -> HubSpotApiResult<Vec<Owner>> {
        self.record("list_owners", None, None, Value::Null);
        Ok(self.owners.lock().unwrap().clone())
    }
}
