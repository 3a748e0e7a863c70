//! Feature symbol merging
//!
//! Combines a definition's own symbols with the batch-wide general symbols.
//!
//! Precedence: a general symbol overrides a definition symbol with the same
//! name. Order is definition symbols first (in their declared order), then
//! general-only symbols. Within one list a later entry overrides an earlier
//! entry of the same name.

use super::definition::Symbol;

/// Merge definition and general symbols into one deduplicated list
pub fn merge(definition: &[Symbol], general: &[Symbol]) -> Vec<Symbol> {
    let mut merged: Vec<Symbol> = Vec::with_capacity(definition.len() + general.len());

    for symbol in definition.iter().chain(general) {
        match merged.iter_mut().find(|s| s.name == symbol.name) {
            Some(existing) => existing.active = symbol.active,
            None => merged.push(symbol.clone()),
        }
    }

    merged
}

/// Names of the active symbols after merging
pub fn active_names(definition: &[Symbol], general: &[Symbol]) -> Vec<String> {
    merge(definition, general)
        .into_iter()
        .filter(|s| s.active)
        .map(|s| s.name)
        .collect()
}
