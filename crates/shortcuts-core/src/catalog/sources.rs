use super::descriptor::{derive_category, parse_actionsdata_payload, parse_curated_payload};
use crate::config::BUNDLED_CURATED_ACTIONS;
use crate::database::ShortcutLibrary;
use crate::error::Result;
use crate::parser::parse_actions;
use crate::scan::list_files;
use crate::types::{ActionInfo, ActionSource};
use crate::value::JsonMap;
use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

pub const SYSTEM_ACTIONS_PATTERN: &str = "*/Metadata.appintents/extract.actionsdata";
pub const APP_ACTIONS_PATTERNS: [&str; 2] = [
    "*.app/Contents/Resources/Metadata.appintents/extract.actionsdata",
    "*.app/Resources/Metadata.appintents/extract.actionsdata",
];

pub fn scan_system_actions(root: &Path) -> Vec<ActionInfo> {
    let paths = list_files(root, SYSTEM_ACTIONS_PATTERN);
    scan_descriptor_files(&paths, ActionSource::System)
}

pub fn scan_app_actions(root: &Path) -> Vec<ActionInfo> {
    let paths: Vec<PathBuf> = APP_ACTIONS_PATTERNS
        .iter()
        .flat_map(|pattern| list_files(root, pattern))
        .collect();
    scan_descriptor_files(&paths, ActionSource::Apps)
}

/// Parse each descriptor file independently; unreadable or malformed files
/// are skipped.
pub fn scan_descriptor_files(paths: &[PathBuf], source: ActionSource) -> Vec<ActionInfo> {
    let mut actions = Vec::new();
    for path in paths {
        match read_json(path) {
            Some(payload) => actions.extend(parse_actionsdata_payload(&payload, source)),
            None => tracing::debug!(path = %path.display(), "skipping descriptor file"),
        }
    }
    actions
}

/// The curated reference: the override file when one is configured, the
/// copy compiled into the binary otherwise.
pub fn curated_actions(override_file: Option<&Path>) -> Vec<ActionInfo> {
    match override_file {
        Some(path) => load_curated_actions(path),
        None => load_bundled_curated_actions(),
    }
}

pub fn load_bundled_curated_actions() -> Vec<ActionInfo> {
    match serde_json::from_str::<Value>(BUNDLED_CURATED_ACTIONS) {
        Ok(payload) if payload.is_object() => parse_curated_payload(&payload),
        _ => {
            tracing::warn!("bundled curated actions are not a JSON object");
            Vec::new()
        }
    }
}

/// A curated reference file. Missing or malformed means no curated actions.
pub fn load_curated_actions(path: &Path) -> Vec<ActionInfo> {
    if !path.is_file() {
        return Vec::new();
    }
    match read_json(path) {
        Some(payload) => parse_curated_payload(&payload),
        None => {
            tracing::debug!(path = %path.display(), "ignoring unreadable curated actions file");
            Vec::new()
        }
    }
}

fn read_json(path: &Path) -> Option<Value> {
    let raw = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;
    value.is_object().then_some(value)
}

#[derive(Default)]
struct Usage {
    count: u64,
    example: Option<JsonMap>,
}

/// One entry per distinct action identifier used anywhere in the library,
/// counting every occurrence.
///
/// Failing to list shortcuts is an error; a single shortcut whose actions
/// cannot be read is skipped.
pub fn scan_library_actions(library: &dyn ShortcutLibrary) -> Result<Vec<ActionInfo>> {
    let rows = library.all_shortcuts(None)?;
    let mut usage: IndexMap<String, Usage> = IndexMap::new();

    for row in &rows {
        let data = match library.shortcut_actions(row.pk) {
            Ok(Some(data)) if !data.is_empty() => data,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(shortcut = %row.name, error = %e, "skipping shortcut actions");
                continue;
            }
        };
        for action in parse_actions(&data) {
            let entry = usage.entry(action.identifier).or_default();
            entry.count += 1;
            if entry.example.is_none() && !action.parameters.is_empty() {
                entry.example = Some(action.parameters);
            }
        }
    }

    let actions = usage
        .into_iter()
        .map(|(identifier, usage)| ActionInfo {
            category: derive_category(&identifier, None),
            identifier,
            source: ActionSource::Library,
            title: None,
            description: None,
            parameters: Vec::new(),
            platform_availability: None,
            usage_count: usage.count,
            example_params: usage.example,
        })
        .collect();
    Ok(actions)
}
