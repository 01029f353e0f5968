//! The in-memory compendium collection and its mutating operations
//!
//! A `Compendium` holds seven independently sorted category sequences.
//! Mutating operations keep each category alphabetized by the canonical
//! comparator and enforce per-category, case-insensitive name uniqueness.

use crate::error::{Error, Result};
use crate::model::{
    Background, Category, Class, Entry, Feat, Item, Monster, Named, Race, Spell,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Canonical entry ordering: ordinal compare of the lowercased names,
/// tie-broken by ordinal compare of the raw names. Used by both add-time
/// sorting and merge re-sorting.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Case-insensitive name equality, matching the uniqueness invariant
fn names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// A category-partitioned collection of compendium entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Compendium {
    pub items: Vec<Item>,
    pub spells: Vec<Spell>,
    pub monsters: Vec<Monster>,
    pub classes: Vec<Class>,
    pub races: Vec<Race>,
    pub feats: Vec<Feat>,
    pub backgrounds: Vec<Background>,
}

impl Compendium {
    /// Create a new empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all categories
    pub fn len(&self) -> usize {
        Category::ALL.iter().map(|c| self.count(*c)).sum()
    }

    /// Check whether every category is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries in one category
    pub fn count(&self, category: Category) -> usize {
        match category {
            Category::Items => self.items.len(),
            Category::Spells => self.spells.len(),
            Category::Monsters => self.monsters.len(),
            Category::Classes => self.classes.len(),
            Category::Races => self.races.len(),
            Category::Feats => self.feats.len(),
            Category::Backgrounds => self.backgrounds.len(),
        }
    }

    /// Entry names of one category, in sequence order
    pub fn names(&self, category: Category) -> Vec<&str> {
        match category {
            Category::Items => self.items.iter().map(Named::name).collect(),
            Category::Spells => self.spells.iter().map(Named::name).collect(),
            Category::Monsters => self.monsters.iter().map(Named::name).collect(),
            Category::Classes => self.classes.iter().map(Named::name).collect(),
            Category::Races => self.races.iter().map(Named::name).collect(),
            Category::Feats => self.feats.iter().map(Named::name).collect(),
            Category::Backgrounds => self.backgrounds.iter().map(Named::name).collect(),
        }
    }

    /// Name of the entry at `index` in one category
    pub fn entry_name(&self, category: Category, index: usize) -> Option<&str> {
        match category {
            Category::Items => self.items.get(index).map(Named::name),
            Category::Spells => self.spells.get(index).map(Named::name),
            Category::Monsters => self.monsters.get(index).map(Named::name),
            Category::Classes => self.classes.get(index).map(Named::name),
            Category::Races => self.races.get(index).map(Named::name),
            Category::Feats => self.feats.get(index).map(Named::name),
            Category::Backgrounds => self.backgrounds.get(index).map(Named::name),
        }
    }

    /// Display body of the entry at `index` in one category
    pub fn entry_text(&self, category: Category, index: usize) -> Option<&str> {
        match category {
            Category::Items => self.items.get(index).map(|e| e.text.as_str()),
            Category::Spells => self.spells.get(index).map(|e| e.text.as_str()),
            Category::Monsters => self.monsters.get(index).map(|e| e.text.as_str()),
            Category::Classes => self.classes.get(index).map(|e| e.text.as_str()),
            Category::Races => self.races.get(index).map(|e| e.text.as_str()),
            Category::Feats => self.feats.get(index).map(|e| e.text.as_str()),
            Category::Backgrounds => self.backgrounds.get(index).map(|e| e.text.as_str()),
        }
    }

    /// Check whether a name is taken in a category, case-insensitively
    pub fn contains(&self, category: Category, name: &str) -> bool {
        self.names(category)
            .iter()
            .any(|n| names_equal(n, name))
    }

    /// Wipe the collection back to empty
    pub fn clear(&mut self) {
        *self = Compendium::new();
    }

    /// Insert a new entry into its category and re-sort
    ///
    /// Fails with [`Error::DuplicateName`] when the name is already taken
    /// in that category (case-insensitive); the collection is untouched.
    pub fn add(&mut self, entry: Entry) -> Result<()> {
        match entry {
            Entry::Item(e) => insert_sorted(&mut self.items, e, Category::Items),
            Entry::Spell(e) => insert_sorted(&mut self.spells, e, Category::Spells),
            Entry::Monster(e) => insert_sorted(&mut self.monsters, e, Category::Monsters),
            Entry::Class(e) => insert_sorted(&mut self.classes, e, Category::Classes),
            Entry::Race(e) => insert_sorted(&mut self.races, e, Category::Races),
            Entry::Feat(e) => insert_sorted(&mut self.feats, e, Category::Feats),
            Entry::Background(e) => insert_sorted(&mut self.backgrounds, e, Category::Backgrounds),
        }
    }

    /// Replace the entry whose name exactly matches the given entry's name
    ///
    /// Returns `false` (and leaves the collection untouched) when no entry
    /// matches; callers are expected to update an existing entry.
    pub fn update(&mut self, entry: Entry) -> bool {
        match entry {
            Entry::Item(e) => replace_exact(&mut self.items, e),
            Entry::Spell(e) => replace_exact(&mut self.spells, e),
            Entry::Monster(e) => replace_exact(&mut self.monsters, e),
            Entry::Class(e) => replace_exact(&mut self.classes, e),
            Entry::Race(e) => replace_exact(&mut self.races, e),
            Entry::Feat(e) => replace_exact(&mut self.feats, e),
            Entry::Background(e) => replace_exact(&mut self.backgrounds, e),
        }
    }

    /// Remove the entry with the exact name from a category
    ///
    /// Returns `false` when no entry matches.
    pub fn remove(&mut self, category: Category, name: &str) -> bool {
        match category {
            Category::Items => remove_exact(&mut self.items, name),
            Category::Spells => remove_exact(&mut self.spells, name),
            Category::Monsters => remove_exact(&mut self.monsters, name),
            Category::Classes => remove_exact(&mut self.classes, name),
            Category::Races => remove_exact(&mut self.races, name),
            Category::Feats => remove_exact(&mut self.feats, name),
            Category::Backgrounds => remove_exact(&mut self.backgrounds, name),
        }
    }
}

fn insert_sorted<T: Named>(list: &mut Vec<T>, entry: T, category: Category) -> Result<()> {
    if list.iter().any(|e| names_equal(e.name(), entry.name())) {
        return Err(Error::DuplicateName {
            name: entry.name().to_string(),
            category,
        });
    }
    list.push(entry);
    list.sort_by(|a, b| compare_names(a.name(), b.name()));
    Ok(())
}

fn replace_exact<T: Named>(list: &mut [T], entry: T) -> bool {
    match list.iter().position(|e| e.name() == entry.name()) {
        Some(i) => {
            list[i] = entry;
            true
        }
        None => false,
    }
}

fn remove_exact<T: Named>(list: &mut Vec<T>, name: &str) -> bool {
    match list.iter().position(|e| e.name() == name) {
        Some(i) => {
            list.remove(i);
            true
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Entry {
        Entry::Item(Item {
            name: name.to_string(),
            ..Item::default()
        })
    }

    #[test]
    fn test_add_keeps_category_sorted() {
        let mut compendium = Compendium::new();
        compendium.add(item("Longsword")).unwrap();
        compendium.add(item("club")).unwrap();
        compendium.add(item("Dagger")).unwrap();

        assert_eq!(
            compendium.names(Category::Items),
            ["club", "Dagger", "Longsword"]
        );
    }

    #[test]
    fn test_add_rejects_case_insensitive_duplicate() {
        let mut compendium = Compendium::new();
        compendium.add(item("Dagger")).unwrap();

        let err = compendium.add(item("dagger")).unwrap_err();
        assert!(matches!(err, Error::DuplicateName { .. }));
        assert_eq!(compendium.count(Category::Items), 1);
        assert_eq!(compendium.names(Category::Items), ["Dagger"]);
    }

    #[test]
    fn test_same_name_allowed_across_categories() {
        let mut compendium = Compendium::new();
        compendium.add(item("Alert")).unwrap();
        compendium
            .add(Entry::Feat(Feat {
                name: "Alert".to_string(),
                ..Feat::default()
            }))
            .unwrap();

        assert_eq!(compendium.count(Category::Items), 1);
        assert_eq!(compendium.count(Category::Feats), 1);
    }

    #[test]
    fn test_update_replaces_exact_match() {
        let mut compendium = Compendium::new();
        compendium.add(item("Dagger")).unwrap();

        let updated = Entry::Item(Item {
            name: "Dagger".to_string(),
            text: "A pointy knife.".to_string(),
            ..Item::default()
        });
        assert!(compendium.update(updated));
        assert_eq!(compendium.items[0].text, "A pointy knife.");
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut compendium = Compendium::new();
        compendium.add(item("Dagger")).unwrap();

        assert!(!compendium.update(item("Halberd")));
        assert_eq!(compendium.names(Category::Items), ["Dagger"]);
    }

    #[test]
    fn test_remove_exact_and_missing() {
        let mut compendium = Compendium::new();
        compendium.add(item("Dagger")).unwrap();

        assert!(!compendium.remove(Category::Items, "dagger"));
        assert!(compendium.remove(Category::Items, "Dagger"));
        assert!(!compendium.remove(Category::Items, "Dagger"));
        assert!(compendium.is_empty());
    }

    #[test]
    fn test_clear_wipes_everything() {
        let mut compendium = Compendium::new();
        compendium.add(item("Dagger")).unwrap();
        compendium
            .add(Entry::Spell(Spell {
                name: "Fireball".to_string(),
                ..Spell::default()
            }))
            .unwrap();

        compendium.clear();
        assert!(compendium.is_empty());
        assert_eq!(compendium.len(), 0);
    }

    #[test]
    fn test_compare_names_is_case_insensitive_with_tiebreak() {
        assert_eq!(compare_names("club", "Dagger"), Ordering::Less);
        assert_eq!(compare_names("Dagger", "dagger"), Ordering::Less);
        assert_eq!(compare_names("axe", "Axe"), Ordering::Greater);
    }
}
