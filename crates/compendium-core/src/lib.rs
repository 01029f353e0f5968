//! compendium-core: Core library for XML game compendiums
//!
//! This library provides functionality to:
//! - Decode XML compendium documents into a typed, category-partitioned collection
//! - Mutate the collection (add/update/remove) with per-category name uniqueness
//! - Merge or replace the live collection with an imported one
//! - Encode the collection back into a canonical XML document
//! - Scan directories for compendium files

pub mod collection;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod model;
pub mod reconciler;
pub mod scanner;

pub use collection::{compare_names, Compendium};
pub use decoder::{decode_file, decode_str};
pub use encoder::encode;
pub use error::{Error, Result};
pub use model::{
    Background, Category, Class, Entry, Feat, Feature, Item, LevelInfo, Monster, Named, Race,
    Spell, Trait,
};
pub use reconciler::{reconcile, ImportPolicy};
pub use scanner::{is_compendium_file, scan_roots, ScanResult};
