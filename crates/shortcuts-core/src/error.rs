use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShortcutsError {
    #[error("shortcut not found: {0}")]
    ShortcutNotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("execution failed: {0}")]
    Execution(String),

    #[error("timed out after {0}s")]
    Timeout(u64),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ShortcutsError>;
