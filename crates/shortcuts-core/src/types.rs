use crate::value::JsonMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Shortcuts
// ---------------------------------------------------------------------------

/// One step of a shortcut, in execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutAction {
    pub identifier: String,
    #[serde(default)]
    pub parameters: JsonMap,
}

/// A `ZSHORTCUT` row after normalisation.
#[derive(Debug, Clone, PartialEq)]
pub struct ShortcutRow {
    pub pk: i64,
    pub name: String,
    pub action_count: Option<i64>,
    pub modified_at: Option<String>,
    pub workflow_id: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutMetadata {
    pub name: String,
    pub id: Option<String>,
    pub folder: Option<String>,
    pub action_count: Option<i64>,
    pub last_modified: Option<String>,
    pub action_types: Option<Vec<String>>,
}

impl ShortcutMetadata {
    pub fn from_row(row: &ShortcutRow) -> Self {
        Self {
            name: row.name.clone(),
            id: row.workflow_id.clone(),
            folder: row.folder.clone(),
            action_count: row.action_count,
            last_modified: row.modified_at.clone(),
            action_types: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortcutDetail {
    pub name: String,
    pub id: Option<String>,
    pub folder: Option<String>,
    pub action_count: Option<i64>,
    pub last_modified: Option<String>,
    pub actions: Option<Vec<ShortcutAction>>,
    pub input_types: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    pub name: String,
    pub shortcut_count: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub output: Option<String>,
    pub execution_time_ms: Option<u64>,
}

/// Where `search_shortcuts` looks for a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchIn {
    #[default]
    Name,
    Actions,
    Both,
}

impl SearchIn {
    pub fn includes_name(self) -> bool {
        matches!(self, SearchIn::Name | SearchIn::Both)
    }

    pub fn includes_actions(self) -> bool {
        matches!(self, SearchIn::Actions | SearchIn::Both)
    }
}

impl FromStr for SearchIn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(SearchIn::Name),
            "actions" => Ok(SearchIn::Actions),
            "both" => Ok(SearchIn::Both),
            other => Err(format!(
                "invalid search_in '{other}': expected name, actions, or both"
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Action catalog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSource {
    System,
    Apps,
    Library,
    Curated,
}

impl ActionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionSource::System => "system",
            ActionSource::Apps => "apps",
            ActionSource::Library => "library",
            ActionSource::Curated => "curated",
        }
    }
}

impl fmt::Display for ActionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(ActionSource::System),
            "apps" => Ok(ActionSource::Apps),
            "library" => Ok(ActionSource::Library),
            "curated" => Ok(ActionSource::Curated),
            other => Err(format!(
                "invalid source '{other}': expected system, apps, library, or curated"
            )),
        }
    }
}

/// Metadata for one named input slot of an action type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionParameter {
    pub name: String,
    pub title: Option<String>,
    pub value_type: String,
    pub is_optional: bool,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionInfo {
    pub identifier: String,
    pub source: ActionSource,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: String,
    pub parameters: Vec<ActionParameter>,
    /// Platform name → minimum version.
    pub platform_availability: Option<BTreeMap<String, String>>,
    pub usage_count: u64,
    pub example_params: Option<JsonMap>,
}
