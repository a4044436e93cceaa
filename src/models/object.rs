//! Generic CRM object as returned by the v3 objects API.

use crate::domain::ObjectType;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Property bag of a CRM object.
///
/// HubSpot returns every property as a string or `null`; unset and empty
/// values are treated the same by [`Properties::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, serde_json::Value>);

impl Properties {
    /// Non-empty string value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .get(key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Value of `key`, or `default` when unset or empty.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Properties(
            iter.into_iter()
                .map(|(k, v)| (k.into(), serde_json::Value::String(v.into())))
                .collect(),
        )
    }
}

/// A contact, company, deal or engagement record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrmObject {
    /// HubSpot record ID
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    /// Requested properties
    #[serde(default)]
    pub properties: Properties,

    /// Associations embedded by `?associations=...`, keyed by object type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associations: Option<HashMap<String, AssociationPage>>,
}

impl CrmObject {
    pub fn new(id: impl Into<String>, properties: Properties) -> Self {
        Self {
            id: id.into(),
            properties,
            associations: None,
        }
    }

    /// ID of the first embedded association of the given type.
    pub fn first_associated(&self, object_type: ObjectType) -> Option<&str> {
        self.associations
            .as_ref()?
            .get(object_type.as_str())?
            .results
            .first()
            .map(|a| a.id.as_str())
    }
}

/// A page of records (search results, batch reads).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObjectPage {
    #[serde(default)]
    pub results: Vec<CrmObject>,
}

/// A v3 association listing, also used for embedded associations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssociationPage {
    #[serde(default)]
    pub results: Vec<AssociatedId>,
}

/// One associated record in a v3 listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedId {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// A v4 association listing (`/crm/v4/objects/{type}/{id}/associations/{to}`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssociationPageV4 {
    #[serde(default)]
    pub results: Vec<AssociationV4>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationV4 {
    #[serde(deserialize_with = "deserialize_id")]
    pub to_object_id: String,
}

impl AssociationPageV4 {
    pub fn into_ids(self) -> Vec<String> {
        self.results.into_iter().map(|r| r.to_object_id).collect()
    }
}

/// Accept IDs as JSON strings or numbers (v4 associations use numbers).
fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("invalid object id: {}", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_and_empty_properties_read_as_missing() {
        let obj: CrmObject = serde_json::from_str(
            r#"{"id": "42", "properties": {"name": "Acme", "domain": null, "city": ""}}"#,
        )
        .unwrap();
        assert_eq!(obj.properties.get("name"), Some("Acme"));
        assert_eq!(obj.properties.get("domain"), None);
        assert_eq!(obj.properties.get("city"), None);
        assert_eq!(obj.properties.get_or("state", "n/a"), "n/a");
    }

    #[test]
    fn test_embedded_associations() {
        let obj: CrmObject = serde_json::from_str(
            r#"{
                "id": "7",
                "properties": {},
                "associations": {
                    "companies": {"results": [{"id": "900", "type": "contact_to_company"}]}
                }
            }"#,
        )
        .unwrap();
        assert_eq!(obj.first_associated(ObjectType::Companies), Some("900"));
        assert_eq!(obj.first_associated(ObjectType::Deals), None);
    }

    #[test]
    fn test_v4_numeric_ids() {
        let page: AssociationPageV4 = serde_json::from_str(
            r#"{"results": [{"toObjectId": 123, "associationTypes": []}, {"toObjectId": "456"}]}"#,
        )
        .unwrap();
        assert_eq!(page.into_ids(), vec!["123", "456"]);
    }
}
