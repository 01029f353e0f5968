//! Canonical XML encoder for compendium collections
//!
//! Output is byte-reproducible for a given collection: categories in fixed
//! order, fields in the fixed per-category order mirroring the decoder, and
//! empty scalar fields omitted. The derived `text` of monsters, classes,
//! races and backgrounds is never emitted; the decoder reconstructs it.

use crate::collection::Compendium;
use crate::model::{Background, Class, Feat, Item, Monster, Race, Spell, Trait};
use std::collections::BTreeMap;

/// Serialize a collection into a canonical XML document string
pub fn encode(compendium: &Compendium) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<compendium version=\"5\">\n");
    for item in &compendium.items {
        write_item(&mut out, item);
    }
    for spell in &compendium.spells {
        write_spell(&mut out, spell);
    }
    for monster in &compendium.monsters {
        write_monster(&mut out, monster);
    }
    for class in &compendium.classes {
        write_class(&mut out, class);
    }
    for race in &compendium.races {
        write_race(&mut out, race);
    }
    for feat in &compendium.feats {
        write_feat(&mut out, feat);
    }
    for background in &compendium.backgrounds {
        write_background(&mut out, background);
    }
    out.push_str("</compendium>");
    out
}

/// Escape the five XML special characters
fn escape_xml(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Write one scalar field element; empty values are omitted entirely
fn write_tag(out: &mut String, indent: &str, tag: &str, value: &str) {
    if value.is_empty() {
        return;
    }
    out.push_str(indent);
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(&escape_xml(value));
    out.push_str("</");
    out.push_str(tag);
    out.push_str(">\n");
}

/// Write residual pass-through fields, sorted by tag
fn write_extra(out: &mut String, indent: &str, extra: &BTreeMap<String, String>) {
    for (tag, value) in extra {
        write_tag(out, indent, tag, value);
    }
}

/// Write a trait list as repeated elements under the given tag
fn write_traits(out: &mut String, tag: &str, traits: &[Trait]) {
    for tr in traits {
        out.push_str("    <");
        out.push_str(tag);
        out.push_str(">\n");
        write_tag(out, "      ", "name", &tr.name);
        write_tag(out, "      ", "text", &tr.text);
        if let Some(attack) = &tr.attack {
            write_tag(out, "      ", "attack", &attack.join("|"));
        }
        out.push_str("    </");
        out.push_str(tag);
        out.push_str(">\n");
    }
}

fn write_item(out: &mut String, item: &Item) {
    out.push_str("  <item>\n");
    write_tag(out, "    ", "name", &item.name);
    write_tag(out, "    ", "type", &item.kind);
    write_tag(out, "    ", "magic", &item.magic);
    write_tag(out, "    ", "detail", &item.detail);
    write_tag(out, "    ", "weight", &item.weight);
    write_tag(out, "    ", "value", &item.value);
    write_tag(out, "    ", "dmg1", &item.dmg1);
    write_tag(out, "    ", "dmg2", &item.dmg2);
    write_tag(out, "    ", "dmgType", &item.dmg_type);
    write_tag(out, "    ", "property", &item.property);
    write_tag(out, "    ", "range", &item.range);
    write_tag(out, "    ", "ac", &item.ac);
    write_tag(out, "    ", "strength", &item.strength);
    write_extra(out, "    ", &item.extra);
    write_tag(out, "    ", "text", &item.text);
    out.push_str("  </item>\n");
}

fn write_spell(out: &mut String, spell: &Spell) {
    out.push_str("  <spell>\n");
    write_tag(out, "    ", "name", &spell.name);
    write_tag(out, "    ", "level", &spell.level);
    write_tag(out, "    ", "school", &spell.school);
    write_tag(out, "    ", "ritual", &spell.ritual);
    write_tag(out, "    ", "time", &spell.time);
    write_tag(out, "    ", "range", &spell.range);
    write_tag(out, "    ", "components", &spell.components);
    write_tag(out, "    ", "duration", &spell.duration);
    write_tag(out, "    ", "classes", &spell.classes);
    write_extra(out, "    ", &spell.extra);
    write_tag(out, "    ", "text", &spell.text);
    out.push_str("  </spell>\n");
}

fn write_feat(out: &mut String, feat: &Feat) {
    out.push_str("  <feat>\n");
    write_tag(out, "    ", "name", &feat.name);
    write_tag(out, "    ", "prerequisite", &feat.prerequisite);
    write_extra(out, "    ", &feat.extra);
    write_tag(out, "    ", "text", &feat.text);
    out.push_str("  </feat>\n");
}

fn write_monster(out: &mut String, monster: &Monster) {
    out.push_str("  <monster>\n");
    write_tag(out, "    ", "name", &monster.name);
    write_tag(out, "    ", "size", &monster.size);
    write_tag(out, "    ", "type", &monster.kind);
    write_tag(out, "    ", "alignment", &monster.alignment);
    write_tag(out, "    ", "ac", &monster.ac);
    write_tag(out, "    ", "hp", &monster.hp);
    write_tag(out, "    ", "speed", &monster.speed);
    write_tag(out, "    ", "str", &monster.strength);
    write_tag(out, "    ", "dex", &monster.dexterity);
    write_tag(out, "    ", "con", &monster.constitution);
    write_tag(out, "    ", "int", &monster.intelligence);
    write_tag(out, "    ", "wis", &monster.wisdom);
    write_tag(out, "    ", "cha", &monster.charisma);
    write_tag(out, "    ", "save", &monster.save);
    write_tag(out, "    ", "skill", &monster.skill);
    write_tag(out, "    ", "resist", &monster.resist);
    write_tag(out, "    ", "vulnerable", &monster.vulnerable);
    write_tag(out, "    ", "immune", &monster.immune);
    write_tag(out, "    ", "conditionImmune", &monster.condition_immune);
    write_tag(out, "    ", "senses", &monster.senses);
    write_tag(out, "    ", "passive", &monster.passive);
    write_tag(out, "    ", "languages", &monster.languages);
    write_tag(out, "    ", "cr", &monster.cr);
    write_tag(out, "    ", "spells", &monster.spells);
    write_tag(out, "    ", "environment", &monster.environment);
    write_traits(out, "trait", &monster.traits);
    write_traits(out, "action", &monster.actions);
    write_traits(out, "legendary", &monster.legendaries);
    write_traits(out, "reaction", &monster.reactions);
    out.push_str("  </monster>\n");
}

fn write_race(out: &mut String, race: &Race) {
    out.push_str("  <race>\n");
    write_tag(out, "    ", "name", &race.name);
    write_tag(out, "    ", "size", &race.size);
    write_tag(out, "    ", "speed", &race.speed);
    write_tag(out, "    ", "ability", &race.ability);
    write_traits(out, "trait", &race.traits);
    out.push_str("  </race>\n");
}

fn write_background(out: &mut String, background: &Background) {
    out.push_str("  <background>\n");
    write_tag(out, "    ", "name", &background.name);
    write_tag(out, "    ", "proficiency", &background.proficiency);
    write_traits(out, "trait", &background.traits);
    out.push_str("  </background>\n");
}

fn write_class(out: &mut String, class: &Class) {
    out.push_str("  <class>\n");
    write_tag(out, "    ", "name", &class.name);
    write_tag(out, "    ", "hd", &class.hd);
    write_tag(out, "    ", "proficiency", &class.proficiency);
    write_tag(out, "    ", "spellAbility", &class.spell_ability);
    for level in &class.levels {
        out.push_str("    <autolevel level=\"");
        out.push_str(&escape_xml(&level.level));
        out.push_str("\">\n");
        for feature in &level.features {
            if feature.optional {
                out.push_str("      <feature optional=\"YES\">\n");
            } else {
                out.push_str("      <feature>\n");
            }
            write_tag(out, "        ", "name", &feature.name);
            write_tag(out, "        ", "text", &feature.text);
            out.push_str("      </feature>\n");
        }
        out.push_str("    </autolevel>\n");
    }
    out.push_str("  </class>\n");
}
