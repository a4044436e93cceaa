//! Request payloads for the HubSpot objects API.

use crate::domain::Association;
use serde::Serialize;
use std::collections::BTreeMap;

/// Properties sent on create and update. Only supplied fields are present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap(BTreeMap<&'static str, String>);

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a property unconditionally.
    pub fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        self.0.insert(key, value.into());
    }

    /// Set a property when the value is present and non-empty.
    pub fn insert_opt(&mut self, key: &'static str, value: Option<impl Into<String>>) {
        if let Some(value) = value {
            let value = value.into();
            if !value.is_empty() {
                self.0.insert(key, value);
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Body of `POST /crm/v3/objects/{type}`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateObjectRequest {
    pub properties: PropertyMap,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub associations: Vec<Association>,
}

impl CreateObjectRequest {
    pub fn new(properties: PropertyMap) -> Self {
        Self {
            properties,
            associations: Vec::new(),
        }
    }

    pub fn with_associations(mut self, associations: Vec<Association>) -> Self {
        self.associations = associations;
        self
    }
}

/// Body of `PATCH /crm/v3/objects/{type}/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateObjectRequest {
    pub properties: PropertyMap,
}

/// Search filter operators used by this server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOperator {
    Eq,
    Gte,
    Lte,
    ContainsToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub property_name: &'static str,
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn new(property_name: &'static str, operator: FilterOperator, value: impl Into<String>) -> Self {
        Self {
            property_name,
            operator,
            value: value.into(),
        }
    }
}

/// Filters within a group are ANDed; groups are ORed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterGroup {
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sort {
    pub property_name: &'static str,
    pub direction: &'static str,
}

/// Body of `POST /crm/v3/objects/{type}/search`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub filter_groups: Vec<FilterGroup>,
    pub properties: Vec<&'static str>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sorts: Vec<Sort>,

    pub limit: usize,
}

impl SearchRequest {
    pub fn new(properties: &[&'static str], limit: usize) -> Self {
        Self {
            filter_groups: Vec::new(),
            properties: properties.to_vec(),
            sorts: Vec::new(),
            limit,
        }
    }

    /// Add an alternative: records matching this single filter are included.
    pub fn or_filter(mut self, filter: Filter) -> Self {
        self.filter_groups.push(FilterGroup {
            filters: vec![filter],
        });
        self
    }

    /// Add a group whose filters must all match.
    pub fn all_of(mut self, filters: Vec<Filter>) -> Self {
        self.filter_groups.push(FilterGroup { filters });
        self
    }

    pub fn sort_descending(mut self, property_name: &'static str) -> Self {
        self.sorts.push(Sort {
            property_name,
            direction: "DESCENDING",
        });
        self
    }

    pub fn has_filters(&self) -> bool {
        !self.filter_groups.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchInput {
    pub id: String,
}

/// Body of `POST /crm/v3/objects/{type}/batch/read`.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReadRequest {
    pub properties: Vec<&'static str>,
    pub inputs: Vec<BatchInput>,
}

impl BatchReadRequest {
    pub fn new(properties: &[&'static str], ids: &[String]) -> Self {
        Self {
            properties: properties.to_vec(),
            inputs: ids.iter().map(|id| BatchInput { id: id.clone() }).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_map_skips_blank_values() {
        let mut props = PropertyMap::new();
        props.insert("email", "a@b.co");
        props.insert_opt("firstname", Some(""));
        props.insert_opt("lastname", None::<String>);
        props.insert_opt("phone", Some("555"));
        assert_eq!(props.len(), 2);
        assert_eq!(props.get("phone"), Some("555"));
    }

    #[test]
    fn test_search_request_wire_shape() {
        let request = SearchRequest::new(&["dealname"], 5)
            .or_filter(Filter::new("dealname", FilterOperator::ContainsToken, "tower"))
            .sort_descending("hs_timestamp");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "filterGroups": [{"filters": [
                    {"propertyName": "dealname", "operator": "CONTAINS_TOKEN", "value": "tower"}
                ]}],
                "properties": ["dealname"],
                "sorts": [{"propertyName": "hs_timestamp", "direction": "DESCENDING"}],
                "limit": 5
            })
        );
    }

    #[test]
    fn test_create_request_omits_empty_associations() {
        let mut props = PropertyMap::new();
        props.insert("name", "Acme");
        let value = serde_json::to_value(CreateObjectRequest::new(props)).unwrap();
        assert_eq!(value, json!({"properties": {"name": "Acme"}}));
    }
}
