//! Mapping between resources and configuration API objects
//!
//! - `resolve_variant` picks the variant named by the `type` attribute
//! - `build_add_request` turns a planned resource into a POST body
//! - `read_config_object` turns a server object back into state
//! - `update_operations` diffs plan and state into PATCH operations
//!
//! Only attributes that apply to the selected variant take part in any of
//! these steps.

use std::collections::HashMap;

use pingdirectory_core::operations::{Operation, create_operations};
use pingdirectory_core::resource::{ResourceId, State, Value};
use pingdirectory_core::schema::AttributeType;
use serde_json::{Map, Value as JsonValue};

use crate::client::{AddRequest, ConfigObject, Messages};
use crate::schemas::{ConfigFamily, Variant};

/// Variant selected by a resource's `type` attribute
pub fn resolve_variant(
    family: &ConfigFamily,
    attributes: &HashMap<String, Value>,
) -> Result<&'static Variant, String> {
    let type_name = attributes
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| "Attribute 'type' must be set".to_string())?;

    family.variant(type_name).ok_or_else(|| {
        format!(
            "Unknown {} type '{}'. Expected one of: {}",
            family.display_name,
            type_name,
            family.type_names().join(", ")
        )
    })
}

/// Build the POST body creating `name` from a planned resource
///
/// Empty strings, empty sets and unknown values are left out so the server
/// applies its own defaults.
pub fn build_add_request(
    family: &ConfigFamily,
    variant: &Variant,
    name: &str,
    planned: &HashMap<String, Value>,
) -> AddRequest {
    let mut properties = Map::new();
    properties.insert(
        family.name_property.to_string(),
        JsonValue::String(name.to_string()),
    );

    for (attr_name, attr) in &family.schema.attributes {
        let Some(property) = attr.provider_name.as_deref() else {
            continue;
        };
        if attr.is_read_only() || !variant.applies(attr_name) {
            continue;
        }
        if let Some(json) = planned.get(attr_name).and_then(request_value) {
            properties.insert(property.to_string(), json);
        }
    }

    AddRequest {
        schemas: vec![family.schema_urn(variant)],
        properties,
    }
}

fn request_value(value: &Value) -> Option<JsonValue> {
    match value {
        Value::Null | Value::Unknown => None,
        Value::String(s) if s.is_empty() => None,
        Value::Set(items) if items.is_empty() => None,
        other => other.to_json(),
    }
}

/// Map a server object into state attributes
///
/// `expected` holds the values the caller configured (the plan after create
/// or update, the prior state on refresh). A string the server leaves unset
/// reads back as `""` when `""` was expected and as null otherwise, so an
/// explicit empty string never shows up as drift.
pub fn read_config_object(
    family: &ConfigFamily,
    variant: &Variant,
    object: &ConfigObject,
    id: ResourceId,
    expected: Option<&HashMap<String, Value>>,
) -> State {
    let mut attributes = HashMap::new();
    attributes.insert("id".to_string(), Value::string(&object.id));
    attributes.insert("type".to_string(), Value::string(variant.type_name));

    for (attr_name, attr) in &family.schema.attributes {
        let Some(property) = attr.provider_name.as_deref() else {
            continue;
        };
        if !variant.applies(attr_name) {
            attributes.insert(attr_name.clone(), Value::Null);
            continue;
        }
        let expects_empty = expected
            .and_then(|e| e.get(attr_name))
            .is_some_and(|v| matches!(v, Value::String(s) if s.is_empty()));
        let value = response_value(&attr.attr_type, object.property(property), expects_empty);
        attributes.insert(attr_name.clone(), value);
    }

    let (notifications, required_actions) = messages_to_values(object.messages.as_ref());
    attributes.insert("notifications".to_string(), notifications);
    attributes.insert("required_actions".to_string(), required_actions);

    let last_updated = expected
        .and_then(|e| e.get("last_updated"))
        .filter(|v| matches!(v, Value::String(_)))
        .cloned()
        .unwrap_or(Value::Null);
    attributes.insert("last_updated".to_string(), last_updated);

    State::existing(id, attributes).with_identifier(object.id.clone())
}

/// Convert one JSON property into the attribute's value type
fn response_value(attr_type: &AttributeType, json: Option<&JsonValue>, expects_empty: bool) -> Value {
    let unset_string = || {
        if expects_empty {
            Value::string("")
        } else {
            Value::Null
        }
    };

    match (base_type(attr_type), json) {
        (AttributeType::Set(_), None | Some(JsonValue::Null)) => Value::empty_set(),
        (AttributeType::Set(_), Some(JsonValue::Array(items))) => Value::set(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string)),
        ),
        (AttributeType::Set(_), Some(JsonValue::String(s))) => Value::set([s.clone()]),
        (AttributeType::Int, Some(JsonValue::Number(n))) => {
            n.as_i64().map(Value::Int).unwrap_or(Value::Null)
        }
        (AttributeType::Int, Some(JsonValue::String(s))) => {
            s.trim().parse().map(Value::Int).unwrap_or(Value::Null)
        }
        (AttributeType::Bool, Some(JsonValue::Bool(b))) => Value::Bool(*b),
        (AttributeType::Bool, Some(JsonValue::String(s))) => match s.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Null,
        },
        (_, Some(JsonValue::String(s))) if !s.is_empty() => Value::string(s),
        (AttributeType::Int | AttributeType::Bool, _) => Value::Null,
        (_, Some(JsonValue::Number(n))) => Value::string(n.to_string()),
        (_, Some(JsonValue::Bool(b))) => Value::string(b.to_string()),
        _ => unset_string(),
    }
}

/// Constrained types carry their representation in `base`
fn base_type(attr_type: &AttributeType) -> &AttributeType {
    match attr_type {
        AttributeType::Constrained { base, .. } => base_type(base),
        other => other,
    }
}

/// Notifications and required actions as string sets
///
/// Required actions are kept as compact JSON documents so they survive the
/// string-set representation intact.
pub fn messages_to_values(messages: Option<&Messages>) -> (Value, Value) {
    let Some(messages) = messages else {
        return (Value::empty_set(), Value::empty_set());
    };

    let notifications = Value::set(messages.notifications.iter().cloned());
    let required_actions = Value::set(
        messages
            .required_actions
            .iter()
            .filter_map(|action| serde_json::to_string(action).ok()),
    );
    (notifications, required_actions)
}

/// PATCH operations moving the server from `state` to `planned`
pub fn update_operations(
    family: &ConfigFamily,
    variant: &Variant,
    planned: &HashMap<String, Value>,
    state: &HashMap<String, Value>,
) -> Vec<Operation> {
    create_operations(&family.schema, planned, state, |name| variant.applies(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequiredAction;
    use crate::schemas::{extended_operation_handler, identity_mapper};
    use serde_json::json;

    fn attrs(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn object(body: JsonValue) -> ConfigObject {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn resolve_variant_by_type() {
        let family = identity_mapper::family();
        let variant =
            resolve_variant(&family, &attrs(&[("type", Value::string("aggregate"))])).unwrap();
        assert_eq!(variant.type_name, "aggregate");

        let err = resolve_variant(&family, &attrs(&[("type", Value::string("nope"))])).unwrap_err();
        assert!(err.contains("exact-match, regular-expression, aggregate, third-party"));
        assert!(resolve_variant(&family, &HashMap::new()).is_err());
    }

    #[test]
    fn add_request_omits_empty_and_inapplicable_values() {
        let family = identity_mapper::family();
        let variant = family.variant("exact-match").unwrap();
        let planned = attrs(&[
            ("id", Value::string("Email")),
            ("type", Value::string("exact-match")),
            ("description", Value::string("")),
            ("enabled", Value::Bool(true)),
            ("match_attribute", Value::set(["mail"])),
            ("match_base_dn", Value::empty_set()),
            ("match_filter", Value::Unknown),
            ("match_pattern", Value::string("ignored")),
            ("last_updated", Value::Unknown),
        ]);

        let request = build_add_request(&family, variant, "Email", &planned);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "schemas": ["urn:pingidentity:schemas:configuration:2.0:identity-mapper:exact-match"],
                "mapperName": "Email",
                "enabled": true,
                "matchAttribute": ["mail"]
            })
        );
    }

    #[test]
    fn add_request_uses_native_json_types() {
        let family = extended_operation_handler::family();
        let variant = family.variant("validate-totp-password").unwrap();
        let planned = attrs(&[
            ("enabled", Value::Bool(false)),
            ("time_interval_duration", Value::string("30 s")),
            ("adjacent_intervals_to_check", Value::Int(2)),
            ("prevent_totp_reuse", Value::Bool(true)),
        ]);

        let request = build_add_request(&family, variant, "TOTP", &planned);
        assert_eq!(request.properties["handlerName"], json!("TOTP"));
        assert_eq!(request.properties["adjacentIntervalsToCheck"], json!(2));
        assert_eq!(request.properties["preventTOTPReuse"], json!(true));
        assert_eq!(request.properties["timeIntervalDuration"], json!("30 s"));
    }

    #[test]
    fn reader_keeps_expected_empty_string() {
        let family = identity_mapper::family();
        let variant = family.variant("exact-match").unwrap();
        let response = object(json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:identity-mapper:exact-match"],
            "id": "Email",
            "enabled": true,
            "matchAttribute": ["mail", "uid"]
        }));
        let id = ResourceId::new("pingdirectory_identity_mapper", "email");

        let expected = attrs(&[("description", Value::string(""))]);
        let state = read_config_object(&family, variant, &response, id.clone(), Some(&expected));
        assert_eq!(state.attribute("description"), &Value::string(""));
        assert_eq!(state.attribute("match_filter"), &Value::Null);
        assert_eq!(state.attribute("match_attribute"), &Value::set(["mail", "uid"]));
        assert_eq!(state.attribute("match_base_dn"), &Value::empty_set());
        assert_eq!(state.attribute("match_pattern"), &Value::Null);
        assert_eq!(state.identifier.as_deref(), Some("Email"));

        let state = read_config_object(&family, variant, &response, id, None);
        assert_eq!(state.attribute("description"), &Value::Null);
    }

    #[test]
    fn reader_accepts_string_encoded_scalars() {
        let family = extended_operation_handler::family();
        let variant = family.variant("generate-password").unwrap();
        let response = object(json!({
            "schemas": ["urn:pingidentity:schemas:configuration:2.0:extended-operation-handler:generate-password"],
            "id": "Generate Password",
            "enabled": "true",
            "maximumPasswordsPerRequest": "3",
            "maximumValidationAttemptsPerPassword": 5,
            "defaultPasswordGenerator": "Random Password Generator"
        }));
        let state = read_config_object(
            &family,
            variant,
            &response,
            ResourceId::new("pingdirectory_extended_operation_handler", "gen"),
            None,
        );

        assert_eq!(state.attribute("enabled"), &Value::Bool(true));
        assert_eq!(state.attribute("maximum_passwords_per_request"), &Value::Int(3));
        assert_eq!(
            state.attribute("maximum_validation_attempts_per_password"),
            &Value::Int(5)
        );
        assert_eq!(state.attribute("type"), &Value::string("generate-password"));
    }

    #[test]
    fn messages_become_string_sets() {
        let messages = Messages {
            notifications: vec!["Changes take effect after restart".to_string()],
            required_actions: vec![RequiredAction {
                property: Some("enabled".to_string()),
                action_type: "component-restart".to_string(),
                synopsis: "Restart the handler".to_string(),
            }],
        };
        let (notifications, required_actions) = messages_to_values(Some(&messages));
        assert_eq!(
            notifications,
            Value::set(["Changes take effect after restart"])
        );
        assert_eq!(
            required_actions,
            Value::set([
                r#"{"property":"enabled","type":"component-restart","synopsis":"Restart the handler"}"#
            ])
        );
        assert_eq!(messages_to_values(None).0, Value::empty_set());
    }

    #[test]
    fn update_operations_follow_variant() {
        let family = identity_mapper::family();
        let variant = family.variant("regular-expression").unwrap();
        let planned = attrs(&[
            ("id", Value::string("Regex")),
            ("enabled", Value::Bool(true)),
            ("description", Value::string("")),
            ("match_pattern", Value::string("@example.com$")),
            ("match_attribute", Value::set(["uid"])),
            ("all_included_identity_mapper", Value::set(["x"])),
            ("notifications", Value::Unknown),
        ]);
        let state = attrs(&[
            ("id", Value::string("Regex")),
            ("enabled", Value::Bool(true)),
            ("description", Value::string("old")),
            ("match_pattern", Value::string("@example.org$")),
            ("match_attribute", Value::set(["uid", "mail"])),
        ]);

        let rendered: Vec<String> = update_operations(&family, variant, &planned, &state)
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            rendered,
            vec![
                "remove description",
                "remove matchAttribute [mail]",
                "replace matchPattern [@example.com$]",
            ]
        );
    }
}
