//! Data structures for archetype stat tables.
//!
//! This module contains pure data structures designed to be deserialized
//! from RON. The built-in table ships inside the crate; hosts can supply
//! their own text through [`crate::catalog::StatCatalog::from_ron`].
//!
//! **Note:** This module contains no IO - it only parses strings.

mod archetype_data;

pub use archetype_data::{ArchetypeData, ArchetypeTable};

/// The archetype table compiled into the crate.
pub const BUILTIN_ARCHETYPES: &str = include_str!("../../data/archetypes.ron");
