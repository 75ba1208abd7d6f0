use super::ShortcutsTool;
use crate::context::ToolContext;
use shortcuts_core::executor::run_shortcut;
use std::time::Duration;

pub struct RunShortcutTool;

impl ShortcutsTool for RunShortcutTool {
    fn name(&self) -> &str {
        "run_shortcut"
    }

    fn description(&self) -> &str {
        "Run a shortcut by name, optionally passing input and waiting for its output"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "Exact shortcut name"
                },
                "input": {
                    "description": "Input passed to the shortcut; non-strings are sent as JSON"
                },
                "wait_for_result": {
                    "type": "boolean",
                    "description": "Wait for the shortcut to finish and capture its output",
                    "default": true
                },
                "timeout": {
                    "type": "integer",
                    "description": "Seconds to wait before giving up",
                    "minimum": 1
                }
            },
            "required": ["name"]
        })
    }

    fn call(&self, args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let name = args["name"]
            .as_str()
            .ok_or_else(|| "missing required argument: name".to_string())?;
        let wait_for_result = args["wait_for_result"].as_bool().unwrap_or(true);
        let timeout = match args.get("timeout").filter(|v| !v.is_null()) {
            Some(value) => {
                let secs = value
                    .as_u64()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| "timeout must be a positive integer".to_string())?;
                Duration::from_secs(secs)
            }
            None => ctx.config.default_timeout(),
        };

        let result = ctx.block_on(run_shortcut(
            &ctx.runner,
            name,
            args.get("input"),
            wait_for_result,
            timeout,
        ))?;
        serde_json::to_value(result).map_err(|e| e.to_string())
    }
}
