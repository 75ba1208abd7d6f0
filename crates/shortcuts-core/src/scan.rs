use std::path::{Path, PathBuf};

/// Files under `root` matching a glob `pattern` relative to it, sorted.
///
/// A missing or non-UTF-8 root, an invalid pattern, and unreadable entries
/// all contribute nothing rather than failing.
pub fn list_files(root: &Path, pattern: &str) -> Vec<PathBuf> {
    if !root.is_dir() {
        return Vec::new();
    }
    let Some(root_str) = root.to_str() else {
        return Vec::new();
    };
    let full = format!(
        "{}/{}",
        glob::Pattern::escape(root_str.trim_end_matches('/')),
        pattern.trim_start_matches('/')
    );
    let paths = match glob::glob(&full) {
        Ok(paths) => paths,
        Err(e) => {
            tracing::debug!(pattern = %full, error = %e, "invalid glob pattern");
            return Vec::new();
        }
    };

    let mut files: Vec<PathBuf> = paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    files
}
