use crate::context::ToolContext;

pub mod get_available_actions;
pub mod get_folders;
pub mod get_shortcut;
pub mod list_shortcuts;
pub mod run_shortcut;
pub mod search_shortcuts;

pub trait ShortcutsTool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn schema(&self) -> serde_json::Value;
    fn call(&self, args: serde_json::Value, ctx: &ToolContext)
        -> Result<serde_json::Value, String>;
}

pub fn all_tools() -> Vec<Box<dyn ShortcutsTool>> {
    vec![
        Box::new(list_shortcuts::ListShortcutsTool),
        Box::new(get_shortcut::GetShortcutTool),
        Box::new(search_shortcuts::SearchShortcutsTool),
        Box::new(get_available_actions::GetAvailableActionsTool),
        Box::new(run_shortcut::RunShortcutTool),
        Box::new(get_folders::GetFoldersTool),
    ]
}
