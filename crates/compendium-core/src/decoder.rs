//! XML decoder turning compendium documents into typed collections
//!
//! Decoding fails only when the document itself is not well-formed XML.
//! A missing child element yields an empty string for its field, and a
//! malformed single entry is decoded with whatever fields are present.

use crate::collection::Compendium;
use crate::error::{Error, Result};
use crate::model::{
    Background, Category, Class, Feat, Feature, Item, LevelInfo, Monster, Race, Spell, Trait,
};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Decode an XML compendium document into a typed collection
///
/// A well-formed document with zero entries decodes to the empty
/// collection; anything that is not well-formed XML is
/// [`Error::MalformedDocument`].
pub fn decode_str(xml: &str) -> Result<Compendium> {
    let root = parse_tree(xml)?;
    let mut compendium = Compendium::new();
    collect_entries(&root, &mut compendium);
    Ok(compendium)
}

/// Read and decode a compendium file
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<Compendium> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    decode_str(&content)
}

/// A single element of the parsed document tree
#[derive(Debug, Default)]
struct Element {
    tag: String,
    attrs: BTreeMap<String, String>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    /// Trimmed text of the first child element with a matching tag
    /// (case-insensitive), or the empty string when absent
    fn child_text(&self, tag: &str) -> String {
        self.children
            .iter()
            .find(|c| c.tag.eq_ignore_ascii_case(tag))
            .map(|c| c.text.trim().to_string())
            .unwrap_or_default()
    }

    /// Child elements with a matching tag, case-insensitively
    fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> {
        self.children
            .iter()
            .filter(move |c| c.tag.eq_ignore_ascii_case(tag))
    }

    /// Attribute value by exact name
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }
}

/// Parse the whole document into an element tree rooted at its single
/// top-level element
fn parse_tree(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                let elem = element_from_start(&reader, &start)?;
                stack.push(elem);
            }
            Ok(Event::Empty(start)) => {
                let elem = element_from_start(&reader, &start)?;
                attach(&mut stack, &mut root, elem, &reader)?;
            }
            Ok(Event::End(_)) => match stack.pop() {
                Some(elem) => attach(&mut stack, &mut root, elem, &reader)?,
                None => return Err(malformed(&reader, "unexpected closing tag")),
            },
            Ok(Event::Text(text)) => {
                if let Some(top) = stack.last_mut() {
                    let unescaped = text.unescape().map_err(|e| malformed(&reader, e))?;
                    top.text.push_str(&unescaped);
                }
            }
            Ok(Event::CData(cdata)) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&String::from_utf8_lossy(&cdata.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {} // declaration, comments, processing instructions, doctype
            Err(e) => return Err(malformed(&reader, e)),
        }
    }

    if !stack.is_empty() {
        return Err(malformed(&reader, "unexpected end of document inside an element"));
    }
    root.ok_or_else(|| malformed(&reader, "document has no root element"))
}

fn element_from_start(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = BTreeMap::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| malformed(reader, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| malformed(reader, e))?
            .into_owned();
        attrs.insert(key, value);
    }
    Ok(Element {
        tag,
        attrs,
        children: Vec::new(),
        text: String::new(),
    })
}

/// Hand a completed element to its parent, or install it as the root
fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    elem: Element,
    reader: &Reader<&[u8]>,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(elem),
        None => {
            if root.is_some() {
                return Err(malformed(reader, "multiple root elements"));
            }
            *root = Some(elem);
        }
    }
    Ok(())
}

fn malformed(reader: &Reader<&[u8]>, message: impl ToString) -> Error {
    Error::MalformedDocument {
        position: reader.buffer_position() as u64,
        message: message.to_string(),
    }
}

/// Walk the tree collecting entry elements; the walk does not descend into
/// a matched entry
fn collect_entries(elem: &Element, out: &mut Compendium) {
    match Category::from_entry_tag(&elem.tag) {
        Some(Category::Items) => out.items.push(decode_item(elem)),
        Some(Category::Spells) => out.spells.push(decode_spell(elem)),
        Some(Category::Monsters) => out.monsters.push(decode_monster(elem)),
        Some(Category::Classes) => out.classes.push(decode_class(elem)),
        Some(Category::Races) => out.races.push(decode_race(elem)),
        Some(Category::Feats) => out.feats.push(decode_feat(elem)),
        Some(Category::Backgrounds) => out.backgrounds.push(decode_background(elem)),
        None => {
            for child in &elem.children {
                collect_entries(child, out);
            }
        }
    }
}

/// Shared parser for trait/action/legendary/reaction elements
fn decode_trait(elem: &Element) -> Trait {
    let attack = elem.child_text("attack");
    Trait {
        name: elem.child_text("name"),
        text: elem.child_text("text"),
        attack: if attack.is_empty() {
            None
        } else {
            Some(attack.split('|').map(str::to_string).collect())
        },
    }
}

fn decode_traits(elem: &Element, tag: &str) -> Vec<Trait> {
    elem.children_named(tag).map(decode_trait).collect()
}

fn decode_item(elem: &Element) -> Item {
    let mut item = Item::default();
    for child in &elem.children {
        let key = child.tag.to_lowercase();
        let value = child.text.trim().to_string();
        match key.as_str() {
            "name" => item.name = value,
            "type" => item.kind = value,
            "magic" => item.magic = value,
            "detail" => item.detail = value,
            "weight" => item.weight = value,
            "value" => item.value = value,
            "dmg1" => item.dmg1 = value,
            "dmg2" => item.dmg2 = value,
            "dmgtype" => item.dmg_type = value,
            "property" => item.property = value,
            "range" => item.range = value,
            "ac" => item.ac = value,
            "strength" => item.strength = value,
            "text" => item.text = value,
            _ => {
                item.extra.insert(key, value);
            }
        }
    }
    item
}

fn decode_spell(elem: &Element) -> Spell {
    let mut spell = Spell::default();
    for child in &elem.children {
        let key = child.tag.to_lowercase();
        let value = child.text.trim().to_string();
        match key.as_str() {
            "name" => spell.name = value,
            "level" => spell.level = value,
            "school" => spell.school = value,
            "ritual" => spell.ritual = value,
            "time" => spell.time = value,
            "range" => spell.range = value,
            "components" => spell.components = value,
            "duration" => spell.duration = value,
            "classes" => spell.classes = value,
            "text" => spell.text = value,
            _ => {
                spell.extra.insert(key, value);
            }
        }
    }
    spell
}

fn decode_feat(elem: &Element) -> Feat {
    let mut feat = Feat::default();
    for child in &elem.children {
        let key = child.tag.to_lowercase();
        let value = child.text.trim().to_string();
        match key.as_str() {
            "name" => feat.name = value,
            "prerequisite" => feat.prerequisite = value,
            "text" => feat.text = value,
            _ => {
                feat.extra.insert(key, value);
            }
        }
    }
    feat
}

fn decode_monster(elem: &Element) -> Monster {
    let mut monster = Monster {
        name: elem.child_text("name"),
        size: elem.child_text("size"),
        kind: elem.child_text("type"),
        alignment: elem.child_text("alignment"),
        ac: elem.child_text("ac"),
        hp: elem.child_text("hp"),
        speed: elem.child_text("speed"),
        strength: elem.child_text("str"),
        dexterity: elem.child_text("dex"),
        constitution: elem.child_text("con"),
        intelligence: elem.child_text("int"),
        wisdom: elem.child_text("wis"),
        charisma: elem.child_text("cha"),
        save: elem.child_text("save"),
        skill: elem.child_text("skill"),
        resist: elem.child_text("resist"),
        vulnerable: elem.child_text("vulnerable"),
        immune: elem.child_text("immune"),
        condition_immune: elem.child_text("conditionImmune"),
        senses: elem.child_text("senses"),
        passive: elem.child_text("passive"),
        languages: elem.child_text("languages"),
        cr: elem.child_text("cr"),
        spells: elem.child_text("spells"),
        environment: elem.child_text("environment"),
        text: String::new(),
        traits: decode_traits(elem, "trait"),
        actions: decode_traits(elem, "action"),
        legendaries: decode_traits(elem, "legendary"),
        reactions: decode_traits(elem, "reaction"),
    };
    monster.rebuild_text();
    monster
}

fn decode_race(elem: &Element) -> Race {
    let mut race = Race {
        name: elem.child_text("name"),
        size: elem.child_text("size"),
        speed: elem.child_text("speed"),
        ability: elem.child_text("ability"),
        text: String::new(),
        traits: decode_traits(elem, "trait"),
    };
    race.rebuild_text();
    race
}

fn decode_background(elem: &Element) -> Background {
    let mut background = Background {
        name: elem.child_text("name"),
        proficiency: elem.child_text("proficiency"),
        text: String::new(),
        traits: decode_traits(elem, "trait"),
    };
    background.rebuild_text();
    background
}

fn decode_class(elem: &Element) -> Class {
    let mut class = Class {
        name: elem.child_text("name"),
        hd: elem.child_text("hd"),
        proficiency: elem.child_text("proficiency"),
        spell_ability: elem.child_text("spellAbility"),
        text: String::new(),
        levels: elem.children_named("autolevel").map(decode_level).collect(),
    };
    class.rebuild_text();
    class
}

fn decode_level(elem: &Element) -> LevelInfo {
    LevelInfo {
        level: elem.attr("level").unwrap_or_default().to_string(),
        features: elem
            .children_named("feature")
            .map(|f| Feature {
                name: f.child_text("name"),
                text: f.child_text("text"),
                optional: f.attr("optional") == Some("YES"),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_simple_item() {
        let xml = r#"<compendium version="5">
  <item>
    <name>Dagger</name>
    <type>M</type>
    <weight>1</weight>
    <text>A simple blade.</text>
  </item>
</compendium>"#;
        let compendium = decode_str(xml).unwrap();
        assert_eq!(compendium.items.len(), 1);

        let item = &compendium.items[0];
        assert_eq!(item.name, "Dagger");
        assert_eq!(item.kind, "M");
        assert_eq!(item.weight, "1");
        assert_eq!(item.text, "A simple blade.");
        assert_eq!(item.dmg1, "");
        assert!(item.extra.is_empty());
    }

    #[test]
    fn test_decode_unknown_tags_are_carried() {
        let xml = "<compendium><item><name>Orb</name><aura>faint</aura></item></compendium>";
        let compendium = decode_str(xml).unwrap();
        assert_eq!(
            compendium.items[0].extra.get("aura").map(String::as_str),
            Some("faint")
        );
    }

    #[test]
    fn test_decode_tag_case_is_folded() {
        let xml = "<compendium><item><name>Pike</name><dmgType>P</dmgType></item></compendium>";
        let compendium = decode_str(xml).unwrap();
        assert_eq!(compendium.items[0].dmg_type, "P");
        assert!(compendium.items[0].extra.is_empty());
    }

    #[test]
    fn test_decode_monster_with_derived_text() {
        let xml = r#"<compendium>
  <monster>
    <name>Wolf</name>
    <size>M</size>
    <hp>11</hp>
    <trait>
      <name>Keen Smell</name>
      <text>Advantage on smell checks.</text>
    </trait>
    <action>
      <name>Bite</name>
      <text>Melee attack.</text>
      <attack>Bite|4|2d4+2</attack>
    </action>
  </monster>
</compendium>"#;
        let compendium = decode_str(xml).unwrap();
        let monster = &compendium.monsters[0];

        assert_eq!(monster.name, "Wolf");
        assert_eq!(monster.hp, "11");
        assert_eq!(monster.traits.len(), 1);
        assert_eq!(monster.traits[0].attack, None);
        assert_eq!(
            monster.actions[0].attack,
            Some(vec!["Bite".to_string(), "4".to_string(), "2d4+2".to_string()])
        );
        assert_eq!(
            monster.text,
            "**Keen Smell**\nAdvantage on smell checks.\n\n**Bite**\nMelee attack."
        );
    }

    #[test]
    fn test_decode_class_levels_and_optional_flag() {
        let xml = r#"<compendium>
  <class>
    <name>Fighter</name>
    <hd>10</hd>
    <spellAbility>Intelligence</spellAbility>
    <autolevel level="1">
      <feature>
        <name>Second Wind</name>
        <text>Regain hit points.</text>
      </feature>
      <feature optional="YES">
        <name>Blind Fighting</name>
        <text>You have blindsight.</text>
      </feature>
    </autolevel>
  </class>
</compendium>"#;
        let compendium = decode_str(xml).unwrap();
        let class = &compendium.classes[0];

        assert_eq!(class.hd, "10");
        assert_eq!(class.spell_ability, "Intelligence");
        assert_eq!(class.levels.len(), 1);
        assert_eq!(class.levels[0].level, "1");
        assert!(!class.levels[0].features[0].optional);
        assert!(class.levels[0].features[1].optional);
        assert_eq!(
            class.text,
            "**Second Wind (Level 1)**\nRegain hit points.\n\n**Blind Fighting (Level 1)**\nYou have blindsight."
        );
    }

    #[test]
    fn test_decode_race_and_background() {
        let xml = r#"<compendium>
  <race>
    <name>Dwarf</name>
    <size>M</size>
    <speed>25</speed>
    <ability>Con 2</ability>
    <trait>
      <name>Darkvision</name>
      <text>See in dim light.</text>
    </trait>
  </race>
  <background>
    <name>Sage</name>
    <proficiency>Arcana, History</proficiency>
    <trait>
      <name>Researcher</name>
      <text>You know where to look.</text>
    </trait>
  </background>
</compendium>"#;
        let compendium = decode_str(xml).unwrap();

        let race = &compendium.races[0];
        assert_eq!(race.speed, "25");
        assert_eq!(race.text, "**Darkvision**\nSee in dim light.");

        let background = &compendium.backgrounds[0];
        assert_eq!(background.proficiency, "Arcana, History");
        assert_eq!(background.text, "**Researcher**\nYou know where to look.");
    }

    #[test]
    fn test_decode_entities_round_home() {
        let xml = "<compendium><item><name>A &amp; B &lt;test&gt;</name></item></compendium>";
        let compendium = decode_str(xml).unwrap();
        assert_eq!(compendium.items[0].name, "A & B <test>");
    }

    #[test]
    fn test_decode_missing_fields_are_empty() {
        let xml = "<compendium><spell><name>Light</name></spell></compendium>";
        let compendium = decode_str(xml).unwrap();
        let spell = &compendium.spells[0];
        assert_eq!(spell.name, "Light");
        assert_eq!(spell.level, "");
        assert_eq!(spell.duration, "");
    }

    #[test]
    fn test_decode_empty_document_is_not_an_error() {
        let compendium = decode_str("<compendium version=\"5\"></compendium>").unwrap();
        assert!(compendium.is_empty());
    }

    #[test]
    fn test_decode_malformed_is_an_error() {
        assert!(matches!(
            decode_str("<not valid"),
            Err(Error::MalformedDocument { .. })
        ));
        assert!(matches!(
            decode_str(""),
            Err(Error::MalformedDocument { .. })
        ));
        assert!(matches!(
            decode_str("<compendium><item></compendium>"),
            Err(Error::MalformedDocument { .. })
        ));
    }
}
