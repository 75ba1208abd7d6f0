use super::ShortcutsTool;
use crate::context::ToolContext;
use serde_json::Value;
use shortcuts_core::catalog::ActionQuery;
use shortcuts_core::types::ActionSource;
use std::collections::BTreeSet;

pub struct GetAvailableActionsTool;

impl ShortcutsTool for GetAvailableActionsTool {
    fn name(&self) -> &str {
        "get_available_actions"
    }

    fn description(&self) -> &str {
        "List the action types known from system frameworks, installed apps, the curated \
         reference, and the user's own shortcuts"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "source": {
                    "type": "string",
                    "enum": ["system", "apps", "library", "curated"],
                    "description": "Only actions whose winning source is this one"
                },
                "category": {
                    "type": "string",
                    "description": "Category name or identifier prefix (case-insensitive)"
                },
                "search": {
                    "type": "string",
                    "description": "Substring of identifier, title, or description (case-insensitive)"
                },
                "include_parameters": {
                    "type": "boolean",
                    "default": true
                },
                "include_examples": {
                    "type": "boolean",
                    "description": "Include parameters observed in the user's shortcuts",
                    "default": false
                },
                "force_refresh": {
                    "type": "boolean",
                    "description": "Rebuild the catalog before answering",
                    "default": false
                }
            }
        })
    }

    fn call(&self, args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let source = match args["source"].as_str() {
            Some(raw) => Some(raw.parse::<ActionSource>()?),
            None => None,
        };
        let query = ActionQuery {
            source,
            category: args["category"].as_str().map(str::to_string),
            search: args["search"].as_str().map(str::to_string),
            force_refresh: args["force_refresh"].as_bool().unwrap_or(false),
        };
        let include_parameters = args["include_parameters"].as_bool().unwrap_or(true);
        let include_examples = args["include_examples"].as_bool().unwrap_or(false);

        let result = ctx
            .catalog
            .get_all_actions(&query)
            .map_err(|e| e.to_string())?;

        let categories: BTreeSet<&str> = result
            .actions
            .iter()
            .map(|action| action.category.as_str())
            .collect();

        let mut actions = Vec::with_capacity(result.actions.len());
        for action in &result.actions {
            let mut value = serde_json::to_value(action).map_err(|e| e.to_string())?;
            if let Value::Object(fields) = &mut value {
                if !include_parameters {
                    fields.remove("parameters");
                }
                if !include_examples {
                    fields.remove("example_params");
                }
            }
            actions.push(value);
        }

        Ok(serde_json::json!({
            "actions": actions,
            "total": result.actions.len(),
            "cached": result.cached,
            "categories": categories,
        }))
    }
}
