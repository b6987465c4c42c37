//! Wire types of the configuration API

use pingdirectory_core::operations::Operation;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Server-side notices about an object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messages {
    #[serde(default)]
    pub notifications: Vec<String>,
    #[serde(default)]
    pub required_actions: Vec<RequiredAction>,
}

/// An action the administrator must take for a change to fully apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequiredAction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    #[serde(rename = "type")]
    pub action_type: String,
    pub synopsis: String,
}

/// A configuration object as returned by get, add and update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigObject {
    #[serde(default)]
    pub schemas: Vec<String>,
    pub id: String,
    #[serde(rename = "urn:pingidentity:schemas:configuration:messages:2.0", default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Messages>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<JsonValue>,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

impl ConfigObject {
    /// Variant name taken from the first schema URN carrying `prefix`
    pub fn discriminator(&self, prefix: &str) -> Option<&str> {
        self.schemas.iter().find_map(|s| s.strip_prefix(prefix))
    }

    pub fn property(&self, name: &str) -> Option<&JsonValue> {
        self.properties.get(name)
    }
}

/// Body of a POST creating a configuration object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AddRequest {
    pub schemas: Vec<String>,
    #[serde(flatten)]
    pub properties: Map<String, JsonValue>,
}

/// Body of a PATCH updating a configuration object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest {
    pub operations: Vec<Operation>,
}

/// Response of a collection GET
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ListResponse {
    #[serde(default)]
    pub schemas: Vec<String>,
    #[serde(rename = "totalResults", default)]
    pub total_results: usize,
    #[serde(rename = "Resources", default)]
    pub resources: Vec<ConfigObject>,
}

/// Error body returned with non-2xx responses
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_object_splits_known_sections_from_properties() {
        let object: ConfigObject = serde_json::from_value(json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:identity-mapper:exact-match"],
            "id": "Exact Match",
            "matchAttribute": ["uid"],
            "enabled": true,
            "meta": {"resourceType": "identity-mapper"},
            "urn:pingidentity:schemas:configuration:messages:2.0": {
                "notifications": ["restart needed"],
                "requiredActions": [
                    {"property": "enabled", "type": "component-restart", "synopsis": "Restart it"}
                ]
            }
        }))
        .unwrap();

        assert_eq!(
            object.discriminator("urn:pingidentity:schemas:configuration:2.0:identity-mapper:"),
            Some("exact-match")
        );
        assert_eq!(object.property("enabled"), Some(&json!(true)));
        assert!(object.property("meta").is_none());
        let messages = object.messages.unwrap();
        assert_eq!(messages.notifications, vec!["restart needed"]);
        assert_eq!(messages.required_actions[0].action_type, "component-restart");
    }

    #[test]
    fn add_request_flattens_properties() {
        let mut properties = Map::new();
        properties.insert("mapperName".to_string(), json!("Mapper"));
        properties.insert("enabled".to_string(), json!(false));
        let request = AddRequest {
            schemas: vec!["urn:x:aggregate".to_string()],
            properties,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"schemas": ["urn:x:aggregate"], "mapperName": "Mapper", "enabled": false})
        );
    }
}
