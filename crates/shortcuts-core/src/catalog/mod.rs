//! The merged index of every known action type.
//!
//! Four sources feed the catalog: descriptor files bundled with the OS,
//! descriptor files bundled with apps, the curated reference file, and the
//! actions actually used in the user's library. A refresh scans all of them
//! and swaps the merged result in with a single write; readers keep the
//! previous snapshot until then.

pub mod descriptor;
pub mod merge;
pub mod sources;

pub use descriptor::{derive_category, parse_actionsdata_payload, parse_curated_payload};
pub use merge::{merge_action, merge_sources, MergedActions};

use crate::config::CatalogPaths;
use crate::database::ShortcutLibrary;
use crate::error::Result;
use crate::types::{ActionInfo, ActionSource};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::thread;

/// Filters applied to the merged set, in field order.
#[derive(Debug, Clone, Default)]
pub struct ActionQuery {
    pub source: Option<ActionSource>,
    /// Case-insensitive category name or identifier prefix.
    pub category: Option<String>,
    /// Case-insensitive substring of identifier, title, or description.
    pub search: Option<String>,
    pub force_refresh: bool,
}

impl ActionQuery {
    pub fn matches(&self, action: &ActionInfo) -> bool {
        if self.source.is_some_and(|source| action.source != source) {
            return false;
        }
        if let Some(category) = &self.category {
            let category = category.to_lowercase();
            if action.category.to_lowercase() != category
                && !action.identifier.to_lowercase().starts_with(&category)
            {
                return false;
            }
        }
        if let Some(search) = &self.search {
            let haystack = [
                Some(action.identifier.as_str()),
                action.title.as_deref(),
                action.description.as_deref(),
            ]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
            if !haystack.contains(&search.to_lowercase()) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct ActionQueryResult {
    pub actions: Vec<ActionInfo>,
    /// False when this query triggered the rebuild it was answered from.
    pub cached: bool,
}

#[derive(Debug, Clone)]
struct Snapshot {
    actions: Arc<MergedActions>,
    built_at: DateTime<Utc>,
    generation: u64,
}

#[derive(Debug, Default)]
enum CatalogState {
    #[default]
    Empty,
    Populated(Snapshot),
}

pub struct ActionCatalog {
    library: Arc<dyn ShortcutLibrary>,
    paths: CatalogPaths,
    state: RwLock<CatalogState>,
    /// Serialises rebuilds; a caller that waited here reuses the result of
    /// the rebuild it waited on.
    refresh_lock: Mutex<()>,
}

impl ActionCatalog {
    pub fn new(library: Arc<dyn ShortcutLibrary>, paths: CatalogPaths) -> Self {
        Self {
            library,
            paths,
            state: RwLock::new(CatalogState::Empty),
            refresh_lock: Mutex::new(()),
        }
    }

    pub fn get_all_actions(&self, query: &ActionQuery) -> Result<ActionQueryResult> {
        let current = self.snapshot();
        let (snapshot, cached) = match current {
            Some(snapshot) if !query.force_refresh => (snapshot, true),
            current => (self.refresh_after(current.map(|s| s.generation))?, false),
        };
        let actions = snapshot
            .actions
            .values()
            .filter(|action| query.matches(action))
            .cloned()
            .collect();
        Ok(ActionQueryResult { actions, cached })
    }

    /// Rebuild unconditionally (unless another rebuild finishes while waiting).
    pub fn refresh(&self) -> Result<usize> {
        let seen = self.snapshot().map(|s| s.generation);
        Ok(self.refresh_after(seen)?.actions.len())
    }

    /// Sorted distinct categories across the whole catalog.
    pub fn categories(&self) -> Result<Vec<String>> {
        let result = self.get_all_actions(&ActionQuery::default())?;
        let categories: BTreeSet<String> =
            result.actions.into_iter().map(|action| action.category).collect();
        Ok(categories.into_iter().collect())
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot().map(|s| s.built_at)
    }

    pub fn is_populated(&self) -> bool {
        self.snapshot().is_some()
    }

    fn snapshot(&self) -> Option<Snapshot> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &*state {
            CatalogState::Empty => None,
            CatalogState::Populated(snapshot) => Some(snapshot.clone()),
        }
    }

    /// Rebuild unless a snapshot newer than `seen` appeared while waiting
    /// for the refresh lock.
    fn refresh_after(&self, seen: Option<u64>) -> Result<Snapshot> {
        let _guard = self
            .refresh_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(current) = self.snapshot() {
            if seen.map_or(true, |seen| current.generation > seen) {
                tracing::debug!(generation = current.generation, "reusing concurrent refresh");
                return Ok(current);
            }
        }

        let actions = self.build()?;
        let snapshot = Snapshot {
            actions: Arc::new(actions),
            built_at: Utc::now(),
            generation: seen.map_or(1, |seen| seen + 1),
        };
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = CatalogState::Populated(snapshot.clone());
        tracing::info!(
            actions = snapshot.actions.len(),
            generation = snapshot.generation,
            "action catalog refreshed"
        );
        Ok(snapshot)
    }

    fn build(&self) -> Result<MergedActions> {
        let library = Arc::clone(&self.library);
        let (system, apps, used) = thread::scope(|scope| {
            let system = scope.spawn(|| sources::scan_system_actions(&self.paths.system_root));
            let apps = scope.spawn(|| sources::scan_app_actions(&self.paths.apps_root));
            let used = scope.spawn(move || sources::scan_library_actions(library.as_ref()));
            (join(system), join(apps), join(used))
        });
        let used = used?;
        let curated = sources::curated_actions(self.paths.curated_file.as_deref());

        tracing::debug!(
            system = system.len(),
            apps = apps.len(),
            curated = curated.len(),
            library = used.len(),
            "action sources scanned"
        );

        Ok(merge_sources(
            system.into_iter().chain(apps).chain(curated),
            used,
        ))
    }
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, T>) -> T {
    handle
        .join()
        .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
}

#[cfg(test)]
mod tests {
    use super::sources::tests::{workflow_xml, write_descriptor, MemoryLibrary};
    use super::*;
    use serde_json::json;
    use std::path::Path;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn info(identifier: &str, source: ActionSource, category: &str) -> ActionInfo {
        ActionInfo {
            identifier: identifier.to_string(),
            source,
            title: None,
            description: None,
            category: category.to_string(),
            parameters: Vec::new(),
            platform_availability: None,
            usage_count: 0,
            example_params: None,
        }
    }

    fn paths(root: &Path) -> CatalogPaths {
        CatalogPaths {
            system_root: root.join("system"),
            apps_root: root.join("apps"),
            curated_file: Some(root.join("curated.json")),
        }
    }

    fn populated_catalog(dir: &TempDir) -> ActionCatalog {
        let root = dir.path();
        write_descriptor(
            &root.join("system"),
            "Shortcuts.framework/Metadata.appintents/extract.actionsdata",
            &json!({"actions": {
                "is.workflow.actions.delay": {"title": "Wait", "descriptionMetadata": {"descriptionText": "Pause"}},
                "com.apple.Notes.Create": {"title": {"key": "Create Note"}}
            }}),
        );
        write_descriptor(
            &root.join("apps"),
            "Thing.app/Contents/Resources/Metadata.appintents/extract.actionsdata",
            &json!({"actions": {"com.example.Thing.Go": {"title": "Go"}}}),
        );
        std::fs::write(
            root.join("curated.json"),
            json!({"actions": {"is.workflow.actions.comment": {"title": "Comment", "category": "Scripting"}}})
                .to_string(),
        )
        .unwrap();

        let library = MemoryLibrary::default().with_shortcut(
            1,
            "Daily",
            &workflow_xml(&[
                ("is.workflow.actions.delay", Some("x")),
                ("is.workflow.actions.delay", None),
                ("com.example.Unknown.Do", None),
            ]),
        );
        ActionCatalog::new(Arc::new(library), paths(root))
    }

    #[test]
    fn first_query_builds_then_serves_cache() {
        let dir = TempDir::new().unwrap();
        let catalog = populated_catalog(&dir);
        assert!(!catalog.is_populated());

        let first = catalog.get_all_actions(&ActionQuery::default()).unwrap();
        assert!(!first.cached);
        assert_eq!(first.actions.len(), 5);
        assert!(catalog.built_at().is_some());

        let second = catalog.get_all_actions(&ActionQuery::default()).unwrap();
        assert!(second.cached);

        let forced = catalog
            .get_all_actions(&ActionQuery {
                force_refresh: true,
                ..Default::default()
            })
            .unwrap();
        assert!(!forced.cached);
        assert_eq!(forced.actions.len(), 5);
    }

    #[test]
    fn library_usage_merges_into_system_entry() {
        let dir = TempDir::new().unwrap();
        let catalog = populated_catalog(&dir);
        let result = catalog.get_all_actions(&ActionQuery::default()).unwrap();

        let delay = result
            .actions
            .iter()
            .find(|a| a.identifier == "is.workflow.actions.delay")
            .unwrap();
        assert_eq!(delay.source, ActionSource::System);
        assert_eq!(delay.title.as_deref(), Some("Wait"));
        assert_eq!(delay.usage_count, 2);
        assert_eq!(delay.example_params.as_ref().unwrap()["Text"], json!("x"));

        let unknown = result
            .actions
            .iter()
            .find(|a| a.identifier == "com.example.Unknown.Do")
            .unwrap();
        assert_eq!(unknown.source, ActionSource::Library);
        assert_eq!(unknown.usage_count, 1);
    }

    #[test]
    fn filters_by_source() {
        let dir = TempDir::new().unwrap();
        let catalog = populated_catalog(&dir);
        let query = ActionQuery {
            source: Some(ActionSource::Apps),
            ..Default::default()
        };
        let result = catalog.get_all_actions(&query).unwrap();
        assert_eq!(result.actions.len(), 1);
        assert_eq!(result.actions[0].identifier, "com.example.Thing.Go");
    }

    #[test]
    fn source_filter_picks_exactly_one_of_two() {
        let system = info("com.apple.A", ActionSource::System, "apple.system");
        let apps = info("com.example.B", ActionSource::Apps, "third-party");
        let query = ActionQuery {
            source: Some(ActionSource::System),
            ..Default::default()
        };
        let matched: Vec<&ActionInfo> =
            [&system, &apps].into_iter().filter(|a| query.matches(a)).collect();
        assert_eq!(matched, [&system]);
    }

    #[test]
    fn category_matches_name_or_identifier_prefix() {
        let by_name = info("com.example.X", ActionSource::Curated, "Workflow");
        let by_prefix = info("workflow.custom.thing", ActionSource::Apps, "third-party");
        let neither = info("com.example.Y", ActionSource::Apps, "third-party");
        let query = ActionQuery {
            category: Some("workflow".into()),
            ..Default::default()
        };
        assert!(query.matches(&by_name));
        assert!(query.matches(&by_prefix));
        assert!(!query.matches(&neither));

        let namespace = ActionQuery {
            category: Some("COM.APPLE.".into()),
            ..Default::default()
        };
        assert!(namespace.matches(&info("com.apple.Z", ActionSource::System, "apple.system")));
    }

    #[test]
    fn search_covers_identifier_title_and_description() {
        let mut action = info("com.example.Z", ActionSource::Apps, "third-party");
        action.title = Some("Make Coffee".into());
        action.description = Some("Brews a cup".into());

        let search = |needle: &str| ActionQuery {
            search: Some(needle.into()),
            ..Default::default()
        };
        assert!(search("coffee").matches(&action));
        assert!(search("BREWS").matches(&action));
        assert!(search("example.z make").matches(&action));
        assert!(!search("tea").matches(&action));
    }

    #[test]
    fn categories_are_sorted_and_distinct() {
        let dir = TempDir::new().unwrap();
        let catalog = populated_catalog(&dir);
        assert_eq!(
            catalog.categories().unwrap(),
            ["Scripting", "apple.system", "third-party", "workflow"]
        );
    }

    #[test]
    fn failed_refresh_keeps_previous_snapshot() {
        let dir = TempDir::new().unwrap();
        let library = Arc::new(
            MemoryLibrary::default().with_shortcut(1, "Only", &workflow_xml(&[("a.b", None)])),
        );
        let catalog = ActionCatalog::new(library.clone(), paths(dir.path()));
        assert_eq!(catalog.refresh().unwrap(), 1);
        let built_at = catalog.built_at();

        library.fail_listing.store(true, Ordering::SeqCst);
        assert!(catalog.refresh().is_err());
        assert_eq!(catalog.built_at(), built_at);

        let result = catalog.get_all_actions(&ActionQuery::default()).unwrap();
        assert!(result.cached);
        assert_eq!(result.actions[0].identifier, "a.b");
    }

    #[test]
    fn unreachable_library_fails_first_query() {
        let dir = TempDir::new().unwrap();
        let library = MemoryLibrary::default();
        library.fail_listing.store(true, Ordering::SeqCst);
        let catalog = ActionCatalog::new(Arc::new(library), paths(dir.path()));
        assert!(catalog.get_all_actions(&ActionQuery::default()).is_err());
        assert!(!catalog.is_populated());
    }

    #[test]
    fn concurrent_queries_share_one_build() {
        let dir = TempDir::new().unwrap();
        let catalog = populated_catalog(&dir);
        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let result = catalog.get_all_actions(&ActionQuery::default()).unwrap();
                    assert_eq!(result.actions.len(), 5);
                });
            }
        });
        assert_eq!(catalog.snapshot().unwrap().generation, 1);
        assert_eq!(catalog.refresh().unwrap(), 5);
        assert_eq!(catalog.snapshot().unwrap().generation, 2);
    }
}
