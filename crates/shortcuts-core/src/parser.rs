//! Extraction of shortcut actions from stored workflow plists.
//!
//! `ZSHORTCUTACTIONS.ZDATA` usually holds the action list directly, while
//! exported workflows wrap it in a dictionary under `WFWorkflowActions`.
//! Both shapes are accepted; anything else parses as an empty shortcut.

use crate::plist::{self, PlistDict, PlistValue};
use crate::types::ShortcutAction;
use crate::value::{coerce_map, JsonMap};
use serde_json::Value;
use std::collections::HashSet;

pub const WORKFLOW_ACTIONS_KEY: &str = "WFWorkflowActions";
pub const ACTION_IDENTIFIER_KEY: &str = "WFWorkflowActionIdentifier";
pub const ACTION_PARAMETERS_KEY: &str = "WFWorkflowActionParameters";
pub const INPUT_CLASSES_KEY: &str = "WFWorkflowInputContentItemClasses";

/// Parse a workflow blob into its actions, preserving execution order.
///
/// Elements without a non-empty identifier are skipped.
pub fn parse_actions(data: &[u8]) -> Vec<ShortcutAction> {
    let Some(root) = plist::decode(data) else {
        return Vec::new();
    };
    let items = match &root {
        PlistValue::Array(items) => items.as_slice(),
        PlistValue::Dictionary(dict) => match dict.get(WORKFLOW_ACTIONS_KEY) {
            Some(PlistValue::Array(items)) => items.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(PlistValue::as_dictionary)
        .filter_map(action_from_dict)
        .collect()
}

fn action_from_dict(dict: &PlistDict) -> Option<ShortcutAction> {
    let identifier = dict
        .get(ACTION_IDENTIFIER_KEY)?
        .as_str()
        .filter(|id| !id.is_empty())?;
    let parameters = match dict.get(ACTION_PARAMETERS_KEY) {
        Some(PlistValue::Dictionary(params)) => coerce_map(params),
        _ => JsonMap::new(),
    };
    Some(ShortcutAction {
        identifier: identifier.to_string(),
        parameters,
    })
}

/// Declared input content classes, when the blob is a workflow dictionary
/// that carries them. Raw `ZDATA` action lists usually do not.
pub fn parse_input_types(data: &[u8]) -> Option<Vec<String>> {
    let root = plist::decode(data)?;
    let classes = root.as_dictionary()?.get(INPUT_CLASSES_KEY)?.as_array()?;
    Some(
        classes
            .iter()
            .map(|class| match class {
                PlistValue::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    )
}

/// Distinct action identifiers in first-occurrence order.
pub fn action_types(actions: &[ShortcutAction]) -> Vec<String> {
    let mut seen = HashSet::new();
    actions
        .iter()
        .filter(|action| seen.insert(action.identifier.as_str()))
        .map(|action| action.identifier.clone())
        .collect()
}

/// Flatten identifiers and parameters into one space-separated haystack.
pub fn action_search_blob(actions: &[ShortcutAction]) -> String {
    let mut parts = Vec::with_capacity(actions.len() * 2);
    for action in actions {
        parts.push(action.identifier.clone());
        if !action.parameters.is_empty() {
            parts.push(Value::Object(action.parameters.clone()).to_string());
        }
    }
    parts.join(" ")
}
