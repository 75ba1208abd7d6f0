use super::ShortcutsTool;
use crate::context::ToolContext;
use shortcuts_core::library;

pub struct ListShortcutsTool;

impl ShortcutsTool for ListShortcutsTool {
    fn name(&self) -> &str {
        "list_shortcuts"
    }

    fn description(&self) -> &str {
        "List the shortcuts in the user's library, optionally with the action types each one uses"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "folder": {
                    "type": "string",
                    "description": "Folder name to filter by"
                },
                "include_actions": {
                    "type": "boolean",
                    "description": "Include the distinct action identifiers of each shortcut",
                    "default": false
                }
            }
        })
    }

    fn call(&self, args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let folder = args["folder"].as_str();
        let include_actions = args["include_actions"].as_bool().unwrap_or(false);

        let shortcuts =
            library::list_shortcuts(&ctx.db, folder, include_actions).map_err(|e| e.to_string())?;
        Ok(serde_json::json!({ "shortcuts": shortcuts }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_context;

    #[test]
    fn lists_without_action_types_by_default() {
        let (_dir, ctx) = fixture_context();
        let result = ListShortcutsTool.call(serde_json::json!({}), &ctx).unwrap();
        let shortcuts = result["shortcuts"].as_array().unwrap();
        assert_eq!(shortcuts.len(), 2);
        assert_eq!(shortcuts[0]["name"], "Empty");
        assert_eq!(shortcuts[0]["last_modified"], "2001-01-02T00:00:00+00:00");
        assert!(shortcuts[1]["action_types"].is_null());
    }

    #[test]
    fn include_actions_adds_distinct_types() {
        let (_dir, ctx) = fixture_context();
        let result = ListShortcutsTool
            .call(serde_json::json!({"include_actions": true}), &ctx)
            .unwrap();
        let morning = &result["shortcuts"][1];
        assert_eq!(morning["name"], "Morning Routine");
        assert_eq!(
            morning["action_types"],
            serde_json::json!([
                "is.workflow.actions.gettext",
                "is.workflow.actions.showresult",
                "com.example.Weather.Forecast"
            ])
        );
    }

    #[test]
    fn unreadable_database_is_a_tool_error() {
        let (dir, mut ctx) = fixture_context();
        ctx.db = std::sync::Arc::new(shortcuts_core::database::ShortcutDb::new(
            dir.path().join("missing.sqlite"),
        ));
        let err = ListShortcutsTool.call(serde_json::json!({}), &ctx).unwrap_err();
        assert!(err.starts_with("database error"), "{err}");
    }
}
