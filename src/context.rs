// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-scoped binding of a type dictionary and taxonomy resolver
//! (wire format section 4.4 / 4.3).

use std::io::{Read, Write};
use std::sync::Arc;

use crate::dictionary::TypeDictionary;
use crate::reader::StreamReader;
use crate::taxonomy::{NullTaxonomyResolver, TaxonomyResolver};
use crate::writer::StreamWriter;

/// Immutable, `Send + Sync` binding of the type dictionary and
/// taxonomy resolver that readers and writers are constructed against.
/// Built once via [`ContextBuilder`] and shared, typically behind an
/// `Arc`, across however many streams a process opens.
pub struct Context {
    type_dictionary: Arc<TypeDictionary>,
    taxonomy_resolver: Arc<dyn TaxonomyResolver>,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context").finish_non_exhaustive()
    }
}

impl Context {
    /// A context with an empty type dictionary and a resolver that
    /// never resolves a taxonomy. Sufficient for untaxonomied streams.
    pub fn new() -> Self {
        ContextBuilder::new().build()
    }

    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    pub fn type_dictionary(&self) -> &TypeDictionary {
        &self.type_dictionary
    }

    pub fn taxonomy_resolver(&self) -> &dyn TaxonomyResolver {
        self.taxonomy_resolver.as_ref()
    }

    /// Construct a [`StreamReader`] over `source` using this context's
    /// taxonomy resolver.
    pub fn new_reader<R: Read>(&self, source: R) -> StreamReader<R> {
        StreamReader::new(source, Arc::clone(&self.taxonomy_resolver))
    }

    /// Construct a [`StreamWriter`] over `sink`. The taxonomy used for
    /// substitution is resolved lazily from this context's resolver
    /// once [`StreamWriter::write_envelope_header`] supplies a
    /// taxonomy id.
    pub fn new_writer<W: Write>(&self, sink: W) -> StreamWriter<W> {
        StreamWriter::new(sink, Arc::clone(&self.taxonomy_resolver))
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for [`Context`]; mirrors the immutable-after-construction
/// configuration style used for process-wide bindings elsewhere in
/// this crate (taxonomy resolvers, type dictionaries).
#[derive(Default)]
pub struct ContextBuilder {
    type_dictionary: Option<TypeDictionary>,
    taxonomy_resolver: Option<Arc<dyn TaxonomyResolver>>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_dictionary(mut self, dictionary: TypeDictionary) -> Self {
        self.type_dictionary = Some(dictionary);
        self
    }

    pub fn taxonomy_resolver<T: TaxonomyResolver + 'static>(mut self, resolver: T) -> Self {
        self.taxonomy_resolver = Some(Arc::new(resolver));
        self
    }

    pub fn build(self) -> Context {
        Context {
            type_dictionary: Arc::new(self.type_dictionary.unwrap_or_default()),
            taxonomy_resolver: self
                .taxonomy_resolver
                .unwrap_or_else(|| Arc::new(NullTaxonomyResolver)),
        }
    }
}
