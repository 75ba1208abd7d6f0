use crate::types::{ActionInfo, ActionSource};
use indexmap::map::Entry;
use indexmap::IndexMap;

pub type MergedActions = IndexMap<String, ActionInfo>;

/// Precedence among the descriptive sources when one identifier is declared
/// by more than one of them. Higher wins; equal ranks go to the later entry.
pub fn source_rank(source: ActionSource) -> u8 {
    match source {
        ActionSource::Curated => 3,
        ActionSource::System => 2,
        ActionSource::Apps => 1,
        ActionSource::Library => 0,
    }
}

/// Fold `incoming` into `existing`, producing a new entry.
///
/// Existing descriptive fields win when present; usage counts add up. The
/// source tag only moves off `library` so that descriptive sources dominate.
pub fn merge_action(existing: &ActionInfo, incoming: &ActionInfo) -> ActionInfo {
    ActionInfo {
        identifier: existing.identifier.clone(),
        source: if existing.source == ActionSource::Library {
            incoming.source
        } else {
            existing.source
        },
        title: existing.title.clone().or_else(|| incoming.title.clone()),
        description: existing
            .description
            .clone()
            .or_else(|| incoming.description.clone()),
        category: if existing.category.is_empty() {
            incoming.category.clone()
        } else {
            existing.category.clone()
        },
        parameters: if existing.parameters.is_empty() {
            incoming.parameters.clone()
        } else {
            existing.parameters.clone()
        },
        platform_availability: existing
            .platform_availability
            .clone()
            .or_else(|| incoming.platform_availability.clone()),
        usage_count: existing.usage_count + incoming.usage_count,
        example_params: existing
            .example_params
            .clone()
            .or_else(|| incoming.example_params.clone()),
    }
}

/// Build the merged catalog.
///
/// Descriptive entries (system, apps, curated) are resolved by
/// [`source_rank`]; a replaced entry keeps its original position. Library
/// usage is then folded in with [`merge_action`].
pub fn merge_sources(
    descriptive: impl IntoIterator<Item = ActionInfo>,
    library: impl IntoIterator<Item = ActionInfo>,
) -> MergedActions {
    let mut merged = MergedActions::new();

    for action in descriptive {
        match merged.entry(action.identifier.clone()) {
            Entry::Occupied(mut slot) => {
                if source_rank(action.source) >= source_rank(slot.get().source) {
                    slot.insert(action);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(action);
            }
        }
    }

    for action in library {
        match merged.entry(action.identifier.clone()) {
            Entry::Occupied(mut slot) => {
                let combined = merge_action(slot.get(), &action);
                slot.insert(combined);
            }
            Entry::Vacant(slot) => {
                slot.insert(action);
            }
        }
    }

    merged
}
