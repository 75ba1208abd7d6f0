//! Normalisation of action descriptor documents into [`ActionInfo`].
//!
//! Two document shapes exist: the `extract.actionsdata` files bundled with
//! the OS and apps, and the hand-authored curated reference file. They share
//! a top-level `actions` map but describe parameters differently.

use crate::types::{ActionInfo, ActionParameter, ActionSource};
use serde_json::Value;
use std::collections::BTreeMap;

const WORKFLOW_PREFIX: &str = "is.workflow.actions.";
const SHORTCUTS_ACTIONS_PREFIX: &str = "com.apple.ShortcutsActions.";
const SHORTCUTS_ACTIONS_TYPE_PREFIX: &str = "ShortcutsActions.";
const APPLE_PREFIX: &str = "com.apple.";

/// Category for an action that carries no explicit one.
pub fn derive_category(identifier: &str, fully_qualified_type_name: Option<&str>) -> String {
    let category = if identifier.starts_with(WORKFLOW_PREFIX) {
        "workflow"
    } else if identifier.starts_with(SHORTCUTS_ACTIONS_PREFIX)
        || fully_qualified_type_name
            .is_some_and(|name| name.starts_with(SHORTCUTS_ACTIONS_TYPE_PREFIX))
    {
        "apple.shortcuts"
    } else if identifier.starts_with(APPLE_PREFIX) {
        "apple.system"
    } else {
        "third-party"
    };
    category.to_string()
}

// ---------------------------------------------------------------------------
// actionsdata
// ---------------------------------------------------------------------------

/// Parse an `extract.actionsdata` document. Entries that are not objects are
/// skipped; a document without an `actions` object yields nothing.
pub fn parse_actionsdata_payload(payload: &Value, source: ActionSource) -> Vec<ActionInfo> {
    let Some(actions) = payload.get("actions").and_then(Value::as_object) else {
        return Vec::new();
    };
    actions
        .iter()
        .filter_map(|(key, entry)| {
            let entry = entry.as_object()?;
            let identifier = text(entry.get("identifier"))
                .filter(|id| !id.is_empty())
                .unwrap_or(key.as_str())
                .to_string();
            let description = entry
                .get("descriptionMetadata")
                .and_then(|meta| meta.get("descriptionText"))
                .and_then(localized_text);
            let fqtn = text(entry.get("fullyQualifiedTypeName"));
            let category = derive_category(&identifier, fqtn);
            Some(ActionInfo {
                title: entry.get("title").and_then(localized_text),
                description,
                category,
                parameters: entry
                    .get("parameters")
                    .map(parse_actionsdata_parameters)
                    .unwrap_or_default(),
                platform_availability: entry
                    .get("availabilityAnnotations")
                    .and_then(availability),
                identifier,
                source,
                usage_count: 0,
                example_params: None,
            })
        })
        .collect()
}

fn parse_actionsdata_parameters(value: &Value) -> Vec<ActionParameter> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            let name = text(item.get("name")).filter(|name| !name.is_empty())?;
            Some(ActionParameter {
                name: name.to_string(),
                title: item.get("title").and_then(localized_text),
                value_type: item
                    .get("valueType")
                    .map(value_type)
                    .unwrap_or_else(|| "unknown".to_string()),
                is_optional: item.get("isOptional").is_some_and(truthy),
                description: None,
            })
        })
        .collect()
}

/// Either a plain string or a localisation object whose `key` is the text.
pub fn localized_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => text(map.get("key")).map(str::to_string),
        _ => None,
    }
}

/// Describe a parameter's type. Checked in order: `primitiveType`
/// (lowercased), `entityType`, `enumType`, `typeName`, `identifier`.
pub fn value_type(value: &Value) -> String {
    let map = match value {
        Value::String(s) => return s.clone(),
        Value::Object(map) => map,
        _ => return "unknown".to_string(),
    };
    if let Some(primitive) = text(map.get("primitiveType")) {
        return primitive.to_lowercase();
    }
    if let Some(entity) = text(map.get("entityType")) {
        return format!("entity:{entity}");
    }
    if let Some(enum_type) = text(map.get("enumType")) {
        return format!("enum:{enum_type}");
    }
    text(map.get("typeName"))
        .or_else(|| text(map.get("identifier")))
        .unwrap_or("unknown")
        .to_string()
}

/// Platform → introduced version. Empty results collapse to `None`.
pub fn availability(value: &Value) -> Option<BTreeMap<String, String>> {
    let platforms = value.as_object()?;
    let versions: BTreeMap<String, String> = platforms
        .iter()
        .filter_map(|(platform, meta)| {
            let version = text(meta.get("introducedVersion"))?;
            Some((platform.clone(), version.to_string()))
        })
        .collect();
    (!versions.is_empty()).then_some(versions)
}

// ---------------------------------------------------------------------------
// Curated reference file
// ---------------------------------------------------------------------------

/// Parse the curated reference document. The `actions` wrapper is optional:
/// a bare top-level map of identifier → entry is accepted too.
pub fn parse_curated_payload(payload: &Value) -> Vec<ActionInfo> {
    let actions = match payload.get("actions").and_then(Value::as_object) {
        Some(actions) => actions,
        None => match payload.as_object() {
            Some(actions) => actions,
            None => return Vec::new(),
        },
    };
    actions
        .iter()
        .filter_map(|(identifier, entry)| {
            let entry = entry.as_object()?;
            let category = text(entry.get("category"))
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| derive_category(identifier, None));
            Some(ActionInfo {
                identifier: identifier.clone(),
                source: ActionSource::Curated,
                title: text(entry.get("title")).map(str::to_string),
                description: text(entry.get("description")).map(str::to_string),
                category,
                parameters: entry
                    .get("parameters")
                    .map(parse_curated_parameters)
                    .unwrap_or_default(),
                platform_availability: None,
                usage_count: 0,
                example_params: None,
            })
        })
        .collect()
}

fn parse_curated_parameters(value: &Value) -> Vec<ActionParameter> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| {
            let item = item.as_object()?;
            let name = text(item.get("name")).filter(|name| !name.is_empty())?;
            Some(ActionParameter {
                name: name.to_string(),
                title: text(item.get("title")).map(str::to_string),
                value_type: text(item.get("value_type"))
                    .unwrap_or("unknown")
                    .to_string(),
                is_optional: item.get("is_optional").is_some_and(truthy),
                description: text(item.get("description")).map(str::to_string),
            })
        })
        .collect()
}

fn text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

/// Loose truthiness for flags that descriptor files encode inconsistently.
/// Only null, `false`, zero and the empty string are false; any array or
/// object counts as set, even when empty.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_actionsdata_payload() {
        let payload = json!({
            "actions": {
                "com.apple.TestAction": {
                    "identifier": "com.apple.TestAction",
                    "title": {"key": "Test Action"},
                    "descriptionMetadata": {"descriptionText": {"key": "Does a thing"}},
                    "parameters": [
                        {
                            "name": "value",
                            "title": {"key": "Value"},
                            "valueType": {"primitiveType": "String"},
                            "isOptional": true
                        },
                        {"title": "nameless"}
                    ],
                    "availabilityAnnotations": {
                        "iOS": {"introducedVersion": "16.0"},
                        "macOS": {"deprecatedVersion": "14.0"}
                    },
                    "fullyQualifiedTypeName": "ShortcutsActions.TestAction"
                }
            }
        });

        let actions = parse_actionsdata_payload(&payload, ActionSource::System);
        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.identifier, "com.apple.TestAction");
        assert_eq!(action.source, ActionSource::System);
        assert_eq!(action.title.as_deref(), Some("Test Action"));
        assert_eq!(action.description.as_deref(), Some("Does a thing"));
        assert_eq!(action.category, "apple.shortcuts");
        assert_eq!(action.parameters.len(), 1);
        assert_eq!(action.parameters[0].value_type, "string");
        assert_eq!(action.parameters[0].title.as_deref(), Some("Value"));
        assert!(action.parameters[0].is_optional);

        let availability = action.platform_availability.as_ref().unwrap();
        assert_eq!(availability.get("iOS").map(String::as_str), Some("16.0"));
        assert!(!availability.contains_key("macOS"));
    }

    #[test]
    fn actionsdata_identifier_falls_back_to_key() {
        let payload = json!({
            "actions": {
                "com.example.Thing": {"title": 7},
                "broken": "not an object"
            }
        });
        let actions = parse_actionsdata_payload(&payload, ActionSource::Apps);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].identifier, "com.example.Thing");
        assert_eq!(actions[0].title, None);
        assert_eq!(actions[0].category, "third-party");
        assert_eq!(actions[0].platform_availability, None);
    }

    #[test]
    fn actionsdata_without_actions_map_is_empty() {
        assert!(parse_actionsdata_payload(&json!({}), ActionSource::System).is_empty());
        assert!(parse_actionsdata_payload(&json!({"actions": []}), ActionSource::System).is_empty());
    }

    #[test]
    fn parses_curated_payload() {
        let payload = json!({
            "actions": {
                "is.workflow.actions.comment": {
                    "title": "Comment",
                    "description": "Add a comment",
                    "category": "is.workflow.actions",
                    "parameters": [{
                        "name": "WFCommentActionText",
                        "title": "Text",
                        "value_type": "string",
                        "is_optional": false,
                        "description": "Comment text"
                    }]
                }
            }
        });

        let actions = parse_curated_payload(&payload);
        assert_eq!(actions.len(), 1);
        let action = &actions[0];
        assert_eq!(action.source, ActionSource::Curated);
        assert_eq!(action.category, "is.workflow.actions");
        assert_eq!(action.parameters[0].name, "WFCommentActionText");
        assert_eq!(action.parameters[0].description.as_deref(), Some("Comment text"));
        assert!(!action.parameters[0].is_optional);
    }

    #[test]
    fn curated_payload_without_wrapper_derives_category() {
        let payload = json!({
            "is.workflow.actions.delay": {"title": "Wait", "parameters": [{"name": "WFDelayTime"}]}
        });
        let actions = parse_curated_payload(&payload);
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].category, "workflow");
        assert_eq!(actions[0].parameters[0].value_type, "unknown");
    }

    #[test]
    fn derives_categories_from_identifiers() {
        assert_eq!(derive_category("is.workflow.actions.delay", None), "workflow");
        assert_eq!(
            derive_category("com.apple.ShortcutsActions.Test", None),
            "apple.shortcuts"
        );
        assert_eq!(derive_category("com.apple.Foo", None), "apple.system");
        assert_eq!(derive_category("com.example.App", None), "third-party");
        assert_eq!(
            derive_category("com.apple.Foo", Some("ShortcutsActions.Foo")),
            "apple.shortcuts"
        );
    }

    #[test]
    fn value_type_priority() {
        assert_eq!(value_type(&json!("custom")), "custom");
        assert_eq!(value_type(&json!({"primitiveType": "Integer"})), "integer");
        assert_eq!(value_type(&json!({"entityType": "Note"})), "entity:Note");
        assert_eq!(value_type(&json!({"enumType": "Mode", "typeName": "x"})), "enum:Mode");
        assert_eq!(value_type(&json!({"typeName": "URL"})), "URL");
        assert_eq!(value_type(&json!({"identifier": "com.x.T"})), "com.x.T");
        assert_eq!(value_type(&json!({"other": 1})), "unknown");
        assert_eq!(value_type(&json!(3)), "unknown");
    }

    #[test]
    fn localized_text_shapes() {
        assert_eq!(localized_text(&json!("Plain")), Some("Plain".into()));
        assert_eq!(localized_text(&json!({"key": "Keyed"})), Some("Keyed".into()));
        assert_eq!(localized_text(&json!({"key": 1})), None);
        assert_eq!(localized_text(&json!(["x"])), None);
    }

    #[test]
    fn truthiness() {
        assert!(truthy(&json!(1)));
        assert!(truthy(&json!("yes")));
        assert!(!truthy(&json!(0)));
        assert!(!truthy(&json!("")));
        assert!(!truthy(&Value::Null));
        assert!(!truthy(&json!(false)));
        assert!(!truthy(&json!(0.0)));
    }

    #[test]
    fn empty_containers_count_as_set() {
        assert!(truthy(&json!([])));
        assert!(truthy(&json!({})));
        assert!(truthy(&json!([0])));
    }
}
