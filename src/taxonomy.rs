// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Taxonomy and resolver (wire format section 4.4).
//!
//! A taxonomy is a partial bijection between field names and ordinals,
//! scoped by a 16-bit taxonomy id. Persisting taxonomies to a file or
//! registry format is an external collaborator, out of scope here
//! (spec.md section 1); only the in-memory bijection and the resolver
//! trait are normative.

use std::collections::HashMap;
use std::sync::Arc;

/// A bidirectional name <-> ordinal bijection.
pub trait Taxonomy: Send + Sync {
    fn get_field_name(&self, ordinal: i16) -> Option<&str>;
    fn get_field_ordinal(&self, name: &str) -> Option<i16>;
}

/// A `HashMap`-backed [`Taxonomy`] built from name/ordinal pairs.
#[derive(Debug, Clone, Default)]
pub struct MapTaxonomy {
    name_to_ordinal: HashMap<String, i16>,
    ordinal_to_name: HashMap<i16, String>,
}

impl MapTaxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I: IntoIterator<Item = (String, i16)>>(pairs: I) -> Self {
        let mut taxonomy = Self::new();
        for (name, ordinal) in pairs {
            taxonomy.insert(name, ordinal);
        }
        taxonomy
    }

    pub fn insert(&mut self, name: String, ordinal: i16) {
        self.ordinal_to_name.insert(ordinal, name.clone());
        self.name_to_ordinal.insert(name, ordinal);
    }
}

impl Taxonomy for MapTaxonomy {
    fn get_field_name(&self, ordinal: i16) -> Option<&str> {
        self.ordinal_to_name.get(&ordinal).map(String::as_str)
    }

    fn get_field_ordinal(&self, name: &str) -> Option<i16> {
        self.name_to_ordinal.get(name).copied()
    }
}

/// Maps a 16-bit taxonomy id to a [`Taxonomy`] instance.
pub trait TaxonomyResolver: Send + Sync {
    fn resolve(&self, taxonomy_id: i16) -> Option<Arc<dyn Taxonomy>>;
}

/// A resolver that never has a taxonomy for any id; the `Context`
/// default when no taxonomy is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTaxonomyResolver;

impl TaxonomyResolver for NullTaxonomyResolver {
    fn resolve(&self, _taxonomy_id: i16) -> Option<Arc<dyn Taxonomy>> {
        None
    }
}

/// A resolver backed by a fixed `HashMap<taxonomyId, Taxonomy>`,
/// populated once at construction and immutable thereafter.
#[derive(Default)]
pub struct MapTaxonomyResolver {
    taxonomies: HashMap<i16, Arc<dyn Taxonomy>>,
}

impl MapTaxonomyResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, taxonomy_id: i16, taxonomy: Arc<dyn Taxonomy>) {
        self.taxonomies.insert(taxonomy_id, taxonomy);
    }
}

impl TaxonomyResolver for MapTaxonomyResolver {
    fn resolve(&self, taxonomy_id: i16) -> Option<Arc<dyn Taxonomy>> {
        self.taxonomies.get(&taxonomy_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s4_taxonomy_substitutes_name_to_ordinal() {
        let taxonomy = MapTaxonomy::from_pairs([("x".to_string(), 7)]);
        assert_eq!(taxonomy.get_field_ordinal("x"), Some(7));
        assert_eq!(taxonomy.get_field_name(7), Some("x"));
        assert_eq!(taxonomy.get_field_ordinal("y"), None);
        assert_eq!(taxonomy.get_field_name(8), None);
    }

    #[test]
    fn null_resolver_never_resolves() {
        let resolver = NullTaxonomyResolver;
        assert!(resolver.resolve(1).is_none());
    }

    #[test]
    fn map_resolver_returns_registered_taxonomy() {
        let mut resolver = MapTaxonomyResolver::new();
        let taxonomy: Arc<dyn Taxonomy> =
            Arc::new(MapTaxonomy::from_pairs([("a".to_string(), 1)]));
        resolver.register(42, taxonomy);
        assert!(resolver.resolve(42).is_some());
        assert!(resolver.resolve(43).is_none());
    }
}
