//! Typed model for compendium entries
//!
//! Entries are partitioned into seven fixed categories. Every scalar field
//! is a `String` because the wire format carries no numeric typing. For
//! monsters, classes, races and backgrounds the `text` body is derived from
//! the nested trait/feature lists and must be rebuilt whenever those change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One of the seven fixed partitions of a compendium
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Items,
    Spells,
    Monsters,
    Classes,
    Races,
    Feats,
    Backgrounds,
}

impl Category {
    /// All categories in canonical document order
    pub const ALL: [Category; 7] = [
        Category::Items,
        Category::Spells,
        Category::Monsters,
        Category::Classes,
        Category::Races,
        Category::Feats,
        Category::Backgrounds,
    ];

    /// The element tag used for a single entry of this category
    pub fn entry_tag(&self) -> &'static str {
        match self {
            Category::Items => "item",
            Category::Spells => "spell",
            Category::Monsters => "monster",
            Category::Classes => "class",
            Category::Races => "race",
            Category::Feats => "feat",
            Category::Backgrounds => "background",
        }
    }

    /// The plural key naming the category as a whole
    pub fn key(&self) -> &'static str {
        match self {
            Category::Items => "items",
            Category::Spells => "spells",
            Category::Monsters => "monsters",
            Category::Classes => "classes",
            Category::Races => "races",
            Category::Feats => "feats",
            Category::Backgrounds => "backgrounds",
        }
    }

    /// Human-readable name for browsing frontends
    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Items => "Equipment",
            Category::Spells => "Spells",
            Category::Monsters => "Bestiary",
            Category::Classes => "Classes",
            Category::Races => "Races",
            Category::Feats => "Feats",
            Category::Backgrounds => "Backgrounds",
        }
    }

    /// Look up a category from an entry element tag, case-insensitively
    pub fn from_entry_tag(tag: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.entry_tag().eq_ignore_ascii_case(tag))
    }

    /// Look up a category from its plural key, case-insensitively
    pub fn from_key(key: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|c| c.key().eq_ignore_ascii_case(key))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// Name access shared by every category payload
pub trait Named {
    /// The entry name, unique within its category under case-insensitive
    /// comparison
    fn name(&self) -> &str;
}

/// A named text block with optional structured attack data, used by
/// monsters (as trait/action/legendary/reaction), races and backgrounds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Trait {
    pub name: String,
    pub text: String,
    /// Attack-mode tokens from the pipe-delimited wire field; `None` when
    /// the source carried no attack data (distinct from an empty list)
    pub attack: Option<Vec<String>>,
}

/// A class feature nested under a level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feature {
    pub name: String,
    pub text: String,
    /// True exactly when the source marks the feature `optional="YES"`
    pub optional: bool,
}

/// One step of a class progression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelInfo {
    /// String-typed level number, taken from the `level` attribute
    pub level: String,
    pub features: Vec<Feature>,
}

/// An equipment entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Item {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub magic: String,
    pub detail: String,
    pub weight: String,
    pub value: String,
    pub dmg1: String,
    pub dmg2: String,
    pub dmg_type: String,
    pub property: String,
    pub range: String,
    pub ac: String,
    pub strength: String,
    pub text: String,
    /// Unknown wire fields, carried through decode and encode
    pub extra: BTreeMap<String, String>,
}

/// A spell entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Spell {
    pub name: String,
    pub level: String,
    pub school: String,
    pub ritual: String,
    pub time: String,
    pub range: String,
    pub components: String,
    pub duration: String,
    pub classes: String,
    pub text: String,
    /// Unknown wire fields, carried through decode and encode
    pub extra: BTreeMap<String, String>,
}

/// A feat entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Feat {
    pub name: String,
    pub prerequisite: String,
    pub text: String,
    /// Unknown wire fields, carried through decode and encode
    pub extra: BTreeMap<String, String>,
}

/// A bestiary entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Monster {
    pub name: String,
    pub size: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub alignment: String,
    pub ac: String,
    pub hp: String,
    pub speed: String,
    pub strength: String,
    pub dexterity: String,
    pub constitution: String,
    pub intelligence: String,
    pub wisdom: String,
    pub charisma: String,
    pub save: String,
    pub skill: String,
    pub resist: String,
    pub vulnerable: String,
    pub immune: String,
    pub condition_immune: String,
    pub senses: String,
    pub passive: String,
    pub languages: String,
    pub cr: String,
    pub spells: String,
    pub environment: String,
    /// Derived display body; rebuild with [`Monster::rebuild_text`]
    pub text: String,
    pub traits: Vec<Trait>,
    pub actions: Vec<Trait>,
    pub legendaries: Vec<Trait>,
    pub reactions: Vec<Trait>,
}

impl Monster {
    /// Regenerate the display body from the trait, action, legendary and
    /// reaction lists, in that order. The stored `text` is never taken
    /// from the document.
    pub fn rebuild_text(&mut self) {
        let all = self
            .traits
            .iter()
            .chain(&self.actions)
            .chain(&self.legendaries)
            .chain(&self.reactions);
        self.text = trait_blocks(all);
    }
}

/// A playable race entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Race {
    pub name: String,
    pub size: String,
    pub speed: String,
    pub ability: String,
    /// Derived display body; rebuild with [`Race::rebuild_text`]
    pub text: String,
    pub traits: Vec<Trait>,
}

impl Race {
    /// Regenerate the display body from the trait list
    pub fn rebuild_text(&mut self) {
        self.text = trait_blocks(self.traits.iter());
    }
}

/// A character background entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Background {
    pub name: String,
    pub proficiency: String,
    /// Derived display body; rebuild with [`Background::rebuild_text`]
    pub text: String,
    pub traits: Vec<Trait>,
}

impl Background {
    /// Regenerate the display body from the trait list
    pub fn rebuild_text(&mut self) {
        self.text = trait_blocks(self.traits.iter());
    }
}

/// A character class entry with its level progression
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Class {
    pub name: String,
    pub hd: String,
    pub proficiency: String,
    pub spell_ability: String,
    /// Derived display body; rebuild with [`Class::rebuild_text`]
    pub text: String,
    pub levels: Vec<LevelInfo>,
}

impl Class {
    /// Regenerate the display body by flattening every level's features in
    /// level order then feature order
    pub fn rebuild_text(&mut self) {
        let blocks: Vec<String> = self
            .levels
            .iter()
            .flat_map(|level| {
                level.features.iter().map(move |feature| {
                    format!("**{} (Level {})**\n{}", feature.name, level.level, feature.text)
                })
            })
            .collect();
        self.text = blocks.join("\n\n");
    }
}

/// Render traits as `**name**\nbody` paragraphs joined by blank lines
fn trait_blocks<'a>(traits: impl Iterator<Item = &'a Trait>) -> String {
    let blocks: Vec<String> = traits
        .map(|t| format!("**{}**\n{}", t.name, t.text))
        .collect();
    blocks.join("\n\n")
}

macro_rules! impl_named {
    ($($ty:ty),*) => {
        $(impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        })*
    };
}

impl_named!(Item, Spell, Feat, Monster, Race, Background, Class);

/// One named entry in some category
///
/// This is the tagged union handed across the §6-style interfaces; JSON
/// serialization carries the category as a `category` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Entry {
    Item(Item),
    Spell(Spell),
    Monster(Monster),
    Class(Class),
    Race(Race),
    Feat(Feat),
    Background(Background),
}

impl Entry {
    /// The category this entry belongs to
    pub fn category(&self) -> Category {
        match self {
            Entry::Item(_) => Category::Items,
            Entry::Spell(_) => Category::Spells,
            Entry::Monster(_) => Category::Monsters,
            Entry::Class(_) => Category::Classes,
            Entry::Race(_) => Category::Races,
            Entry::Feat(_) => Category::Feats,
            Entry::Background(_) => Category::Backgrounds,
        }
    }

    /// The entry name
    pub fn name(&self) -> &str {
        match self {
            Entry::Item(e) => &e.name,
            Entry::Spell(e) => &e.name,
            Entry::Monster(e) => &e.name,
            Entry::Class(e) => &e.name,
            Entry::Race(e) => &e.name,
            Entry::Feat(e) => &e.name,
            Entry::Background(e) => &e.name,
        }
    }

    /// The display body (synthesized for monsters, classes, races and
    /// backgrounds)
    pub fn text(&self) -> &str {
        match self {
            Entry::Item(e) => &e.text,
            Entry::Spell(e) => &e.text,
            Entry::Monster(e) => &e.text,
            Entry::Class(e) => &e.text,
            Entry::Race(e) => &e.text,
            Entry::Feat(e) => &e.text,
            Entry::Background(e) => &e.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_lookup() {
        assert_eq!(Category::from_entry_tag("monster"), Some(Category::Monsters));
        assert_eq!(Category::from_entry_tag("MONSTER"), Some(Category::Monsters));
        assert_eq!(Category::from_entry_tag("autolevel"), None);
        assert_eq!(Category::from_key("backgrounds"), Some(Category::Backgrounds));
        assert_eq!(Category::from_key("equipment"), None);
    }

    #[test]
    fn test_category_order() {
        let tags: Vec<&str> = Category::ALL.iter().map(|c| c.entry_tag()).collect();
        assert_eq!(
            tags,
            ["item", "spell", "monster", "class", "race", "feat", "background"]
        );
    }

    #[test]
    fn test_monster_derived_text() {
        let mut monster = Monster {
            name: "Direwolf".to_string(),
            traits: vec![Trait {
                name: "Keen Smell".to_string(),
                text: "Advantage on smell checks.".to_string(),
                attack: None,
            }],
            actions: vec![Trait {
                name: "Bite".to_string(),
                text: "Melee weapon attack.".to_string(),
                attack: Some(vec!["Bite".to_string(), "5".to_string()]),
            }],
            ..Monster::default()
        };
        monster.rebuild_text();
        assert_eq!(
            monster.text,
            "**Keen Smell**\nAdvantage on smell checks.\n\n**Bite**\nMelee weapon attack."
        );
    }

    #[test]
    fn test_monster_derived_text_is_deterministic() {
        let mut monster = Monster {
            traits: vec![Trait {
                name: "Keen Smell".to_string(),
                text: "Advantage on smell checks.".to_string(),
                attack: None,
            }],
            ..Monster::default()
        };
        monster.rebuild_text();
        assert_eq!(monster.text, "**Keen Smell**\nAdvantage on smell checks.");
        let first = monster.text.clone();
        monster.rebuild_text();
        assert_eq!(monster.text, first);
    }

    #[test]
    fn test_class_derived_text_carries_levels() {
        let mut class = Class {
            name: "Ranger".to_string(),
            levels: vec![
                LevelInfo {
                    level: "1".to_string(),
                    features: vec![Feature {
                        name: "Favored Enemy".to_string(),
                        text: "Pick a foe.".to_string(),
                        optional: false,
                    }],
                },
                LevelInfo {
                    level: "2".to_string(),
                    features: vec![Feature {
                        name: "Fighting Style".to_string(),
                        text: "Pick a style.".to_string(),
                        optional: true,
                    }],
                },
            ],
            ..Class::default()
        };
        class.rebuild_text();
        assert_eq!(
            class.text,
            "**Favored Enemy (Level 1)**\nPick a foe.\n\n**Fighting Style (Level 2)**\nPick a style."
        );
    }

    #[test]
    fn test_entry_accessors() {
        let entry = Entry::Feat(Feat {
            name: "Alert".to_string(),
            text: "Always on guard.".to_string(),
            ..Feat::default()
        });
        assert_eq!(entry.category(), Category::Feats);
        assert_eq!(entry.name(), "Alert");
        assert_eq!(entry.text(), "Always on guard.");
    }

    #[test]
    fn test_entry_json_is_category_tagged() {
        let entry = Entry::Item(Item {
            name: "Dagger".to_string(),
            kind: "M".to_string(),
            ..Item::default()
        });
        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"category\":\"item\""));
        assert!(json.contains("\"type\":\"M\""));

        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
