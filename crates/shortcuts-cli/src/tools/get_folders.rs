use super::ShortcutsTool;
use crate::context::ToolContext;

pub struct GetFoldersTool;

impl ShortcutsTool for GetFoldersTool {
    fn name(&self) -> &str {
        "get_folders"
    }

    fn description(&self) -> &str {
        "List the folders of the shortcut library"
    }

    fn schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    fn call(&self, _args: serde_json::Value, ctx: &ToolContext) -> Result<serde_json::Value, String> {
        let folders = ctx.db.folders().map_err(|e| e.to_string())?;
        Ok(serde_json::json!({ "folders": folders }))
    }
}
