pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod executor;
pub mod library;
pub mod parser;
pub mod plist;
pub mod scan;
pub mod types;
pub mod value;

pub use error::{Result, ShortcutsError};
