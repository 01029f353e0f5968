//! Merge and replace reconciliation between a live and an imported collection

use crate::collection::{compare_names, Compendium};
use crate::model::Named;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an imported collection is combined with the live one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportPolicy {
    /// Name-keyed upsert per category; live entries without an incoming
    /// counterpart survive unchanged
    Merge,
    /// The incoming collection becomes the live one wholesale
    Replace,
}

/// Combine `incoming` into `live` under the chosen policy
///
/// Merge handles each category independently: an empty incoming category
/// leaves the live one untouched, and on a case-insensitive name collision
/// the incoming entry fully replaces the live one. Merged categories are
/// re-sorted by the canonical comparator. Each category's new sequence is
/// computed in full before it replaces the live one.
pub fn reconcile(live: &mut Compendium, incoming: Compendium, policy: ImportPolicy) {
    match policy {
        ImportPolicy::Replace => *live = incoming,
        ImportPolicy::Merge => {
            merge_category(&mut live.items, incoming.items);
            merge_category(&mut live.spells, incoming.spells);
            merge_category(&mut live.monsters, incoming.monsters);
            merge_category(&mut live.classes, incoming.classes);
            merge_category(&mut live.races, incoming.races);
            merge_category(&mut live.feats, incoming.feats);
            merge_category(&mut live.backgrounds, incoming.backgrounds);
        }
    }
}

fn merge_category<T: Named>(live: &mut Vec<T>, incoming: Vec<T>) {
    if incoming.is_empty() {
        return;
    }

    let current = std::mem::take(live);
    let mut merged: Vec<T> = Vec::with_capacity(current.len() + incoming.len());
    let mut index: HashMap<String, usize> = HashMap::new();
    for entry in current.into_iter().chain(incoming) {
        let key = entry.name().to_lowercase();
        match index.get(&key) {
            Some(&i) => merged[i] = entry,
            None => {
                index.insert(key, merged.len());
                merged.push(entry);
            }
        }
    }
    merged.sort_by(|a, b| compare_names(a.name(), b.name()));
    *live = merged;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Item, Spell};

    fn collection_with_items(names: &[(&str, &str)]) -> Compendium {
        let mut compendium = Compendium::new();
        for (name, text) in names {
            compendium.items.push(Item {
                name: name.to_string(),
                text: text.to_string(),
                ..Item::default()
            });
        }
        compendium
    }

    #[test]
    fn test_merge_upserts_and_sorts() {
        let mut live = collection_with_items(&[("Dagger", "old"), ("Rope", "keep")]);
        let incoming = collection_with_items(&[("Axe", "new")]);

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        assert_eq!(live.names(Category::Items), ["Axe", "Dagger", "Rope"]);
    }

    #[test]
    fn test_merge_incoming_wins_across_case() {
        let mut live = collection_with_items(&[("Dagger", "live version")]);
        let incoming = collection_with_items(&[("dagger", "incoming version")]);

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        assert_eq!(live.items.len(), 1);
        assert_eq!(live.items[0].name, "dagger");
        assert_eq!(live.items[0].text, "incoming version");
    }

    #[test]
    fn test_merge_preserves_unmatched_live_entries() {
        let mut live = collection_with_items(&[("Dagger", "a"), ("Rope", "b")]);
        let incoming = collection_with_items(&[("Dagger", "c")]);

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        assert_eq!(live.items.len(), 2);
        let rope = live.items.iter().find(|i| i.name == "Rope").unwrap();
        assert_eq!(rope.text, "b");
    }

    #[test]
    fn test_merge_skips_empty_incoming_categories() {
        let mut live = collection_with_items(&[("Dagger", "a")]);
        live.spells.push(Spell {
            name: "Light".to_string(),
            ..Spell::default()
        });
        let incoming = Compendium::new();

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        assert_eq!(live.items.len(), 1);
        assert_eq!(live.spells.len(), 1);
    }

    #[test]
    fn test_merge_does_not_touch_other_categories() {
        let mut live = Compendium::new();
        live.spells.push(Spell {
            name: "Zap".to_string(),
            ..Spell::default()
        });
        let incoming = collection_with_items(&[("Dagger", "x")]);

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        assert_eq!(live.names(Category::Spells), ["Zap"]);
        assert_eq!(live.names(Category::Items), ["Dagger"]);
    }

    #[test]
    fn test_replace_is_total() {
        let mut live = collection_with_items(&[("Dagger", "a")]);
        live.spells.push(Spell {
            name: "Light".to_string(),
            ..Spell::default()
        });
        let incoming = collection_with_items(&[("Axe", "b")]);

        reconcile(&mut live, incoming.clone(), ImportPolicy::Replace);

        assert_eq!(live, incoming);
        assert!(live.spells.is_empty());
    }

    #[test]
    fn test_uniqueness_holds_after_merge() {
        let mut live = collection_with_items(&[("Dagger", "a"), ("AXE", "b")]);
        let incoming = collection_with_items(&[("dagger", "c"), ("axe", "d"), ("Bow", "e")]);

        reconcile(&mut live, incoming, ImportPolicy::Merge);

        let mut lowered: Vec<String> = live
            .names(Category::Items)
            .iter()
            .map(|n| n.to_lowercase())
            .collect();
        lowered.dedup();
        assert_eq!(lowered, ["axe", "bow", "dagger"]);
    }
}
