use shortcuts_core::catalog::ActionCatalog;
use shortcuts_core::config::Config;
use shortcuts_core::database::{ShortcutDb, ShortcutLibrary};
use shortcuts_core::executor::SystemRunner;
use std::future::Future;
use std::sync::Arc;

/// Everything a command or MCP tool needs, built once per process.
pub struct ToolContext {
    pub config: Config,
    pub db: Arc<ShortcutDb>,
    pub catalog: ActionCatalog,
    pub runner: SystemRunner,
}

impl ToolContext {
    pub fn new(config: Config) -> Self {
        let db = Arc::new(ShortcutDb::new(&config.db_path));
        let library: Arc<dyn ShortcutLibrary> = db.clone();
        let catalog = ActionCatalog::new(library, config.catalog.clone());
        Self {
            config,
            db,
            catalog,
            runner: SystemRunner,
        }
    }

    /// Drive an async operation to completion from synchronous code, reusing
    /// the ambient tokio runtime when there is one.
    pub fn block_on<F: Future>(&self, fut: F) -> Result<F::Output, String> {
        let rt = match tokio::runtime::Handle::try_current() {
            Ok(_) => None,
            Err(_) => Some(
                tokio::runtime::Runtime::new()
                    .map_err(|e| format!("failed to create tokio runtime: {e}"))?,
            ),
        };
        Ok(match &rt {
            Some(rt) => rt.block_on(fut),
            None => {
                tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(fut))
            }
        })
    }
}
