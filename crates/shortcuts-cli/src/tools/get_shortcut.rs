use super::ShortcutsTool;
use crate::context::ToolContext;
use shortcuts_core::library;

pub struct GetShortcutTool;

impl ShortcutsTool for GetShortcutTool {
    fn name(&self) -> &str {
        "get_shortcut"
    }

    fn description(&self) -> &str {
        "Get a shortcut by exact name, including its decoded actions and accepted input types"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Exact shortcut name"
                },
                "include_actions": {
                    "type": "boolean",
                    "description": "Decode the shortcut's actions",
                    "default": true
                }
            },
            "required": ["name"]
        })
    }

    fn call(&self, args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let name = args["name"]
            .as_str()
            .ok_or_else(|| "missing required argument: name".to_string())?;
        let include_actions = args["include_actions"].as_bool().unwrap_or(true);

        let detail =
            library::get_shortcut(&ctx.db, name, include_actions).map_err(|e| e.to_string())?;
        serde_json::to_value(detail).map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_context;

    #[test]
    fn returns_actions_and_input_types() {
        let (_dir, ctx) = fixture_context();
        let result = GetShortcutTool
            .call(serde_json::json!({"name": "Morning Routine"}), &ctx)
            .unwrap();
        assert_eq!(result["id"], "morning-id");
        assert_eq!(result["action_count"], 3);
        let actions = result["actions"].as_array().unwrap();
        assert_eq!(actions.len(), 3);
        assert_eq!(actions[0]["identifier"], "is.workflow.actions.gettext");
        assert_eq!(actions[0]["parameters"]["WFTextActionText"], "Good Morning");
        assert_eq!(result["input_types"], serde_json::json!(["WFStringContentItem"]));
    }

    #[test]
    fn include_actions_false_skips_decoding() {
        let (_dir, ctx) = fixture_context();
        let result = GetShortcutTool
            .call(
                serde_json::json!({"name": "Morning Routine", "include_actions": false}),
                &ctx,
            )
            .unwrap();
        assert!(result["actions"].is_null());
        assert!(result["input_types"].is_null());
    }

    #[test]
    fn unknown_name_is_not_found() {
        let (_dir, ctx) = fixture_context();
        let err = GetShortcutTool
            .call(serde_json::json!({"name": "Nope"}), &ctx)
            .unwrap_err();
        assert_eq!(err, "shortcut not found: Nope");
    }

    #[test]
    fn missing_name_is_rejected() {
        let (_dir, ctx) = fixture_context();
        let err = GetShortcutTool.call(serde_json::json!({}), &ctx).unwrap_err();
        assert_eq!(err, "missing required argument: name");
    }
}
