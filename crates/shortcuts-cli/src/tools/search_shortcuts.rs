use super::ShortcutsTool;
use crate::context::ToolContext;
use shortcuts_core::library;
use shortcuts_core::types::SearchIn;

pub struct SearchShortcutsTool;

impl ShortcutsTool for SearchShortcutsTool {
    fn name(&self) -> &str {
        "search_shortcuts"
    }

    fn description(&self) -> &str {
        "Search shortcuts by name, by the content of their actions, or both"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Text to look for (case-insensitive)"
                },
                "search_in": {
                    "type": "string",
                    "enum": ["name", "actions", "both"],
                    "description": "Where to search",
                    "default": "name"
                }
            },
            "required": ["query"]
        })
    }

    fn call(&self, args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let query = args["query"]
            .as_str()
            .ok_or_else(|| "missing required argument: query".to_string())?;
        let search_in = match args["search_in"].as_str() {
            Some(raw) => raw.parse::<SearchIn>()?,
            None => SearchIn::default(),
        };

        let shortcuts =
            library::search_shortcuts(&ctx.db, query, search_in).map_err(|e| e.to_string())?;
        Ok(serde_json::json!({ "shortcuts": shortcuts }))
    }
}
