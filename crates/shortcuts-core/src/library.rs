//! Shortcut-level queries composed from the database reader and the parser.

use crate::database::{ShortcutDb, ShortcutLibrary};
use crate::error::Result;
use crate::parser::{action_search_blob, action_types, parse_actions, parse_input_types};
use crate::types::{SearchIn, ShortcutDetail, ShortcutMetadata};
use indexmap::IndexMap;

/// Every shortcut, optionally annotated with its distinct action types.
pub fn list_shortcuts(
    db: &ShortcutDb,
    folder: Option<&str>,
    include_actions: bool,
) -> Result<Vec<ShortcutMetadata>> {
    let rows = db.all_shortcuts(folder)?;
    let mut shortcuts = Vec::with_capacity(rows.len());
    for row in &rows {
        let mut meta = ShortcutMetadata::from_row(row);
        if include_actions {
            meta.action_types = db
                .shortcut_actions(row.pk)?
                .filter(|data| !data.is_empty())
                .map(|data| action_types(&parse_actions(&data)));
        }
        shortcuts.push(meta);
    }
    Ok(shortcuts)
}

/// Full detail for one shortcut by exact name.
pub fn get_shortcut(db: &ShortcutDb, name: &str, include_actions: bool) -> Result<ShortcutDetail> {
    let row = db.require_shortcut(name)?;

    let (actions, input_types) = if include_actions {
        match db.shortcut_actions(row.pk)?.filter(|data| !data.is_empty()) {
            Some(data) => (Some(parse_actions(&data)), parse_input_types(&data)),
            None => (None, None),
        }
    } else {
        (None, None)
    };

    Ok(ShortcutDetail {
        name: row.name,
        id: row.workflow_id,
        folder: row.folder,
        action_count: row.action_count,
        last_modified: row.modified_at,
        actions,
        input_types,
    })
}

/// Shortcuts matching `query` by name, by action content, or both.
/// Results are unique by name and keep the order they were first found in.
pub fn search_shortcuts(
    db: &ShortcutDb,
    query: &str,
    search_in: SearchIn,
) -> Result<Vec<ShortcutMetadata>> {
    let mut matches: IndexMap<String, ShortcutMetadata> = IndexMap::new();

    if search_in.includes_name() {
        for row in db.search_by_name(query)? {
            matches.insert(row.name.clone(), ShortcutMetadata::from_row(&row));
        }
    }

    if search_in.includes_actions() {
        let needle = query.to_lowercase();
        for row in db.all_shortcuts(None)? {
            let Some(data) = db.shortcut_actions(row.pk)? else {
                continue;
            };
            let blob = action_search_blob(&parse_actions(&data)).to_lowercase();
            if blob.contains(&needle) {
                matches.insert(row.name.clone(), ShortcutMetadata::from_row(&row));
            }
        }
    }

    Ok(matches.into_values().collect())
}
