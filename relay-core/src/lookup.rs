//! Lookup table collaborator
//!
//! Lookup tables are externally managed code-translation tables referenced
//! by name from mapping rules (`lookup` transforms) and scripts
//! (`lib.lookup`). This subsystem only ever reads from them.

use std::collections::HashMap;

/// Resolves a source code through a named lookup table.
///
/// A miss is an expected outcome, not an error: callers treat `None` as
/// "leave the field unset".
pub trait LookupResolver: Send + Sync {
    fn resolve(&self, source_code: &str, lookup_type: &str) -> Option<String>;
}

/// In-memory lookup tables, keyed by lookup type then source code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLookupResolver {
    tables: HashMap<String, HashMap<String, String>>,
}

impl InMemoryLookupResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a whole table under a lookup type name
    pub fn with_table(
        mut self,
        lookup_type: impl Into<String>,
        entries: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.tables
            .entry(lookup_type.into())
            .or_default()
            .extend(entries);
        self
    }

    /// Add a single entry
    pub fn insert(
        &mut self,
        lookup_type: impl Into<String>,
        source_code: impl Into<String>,
        value: impl Into<String>,
    ) {
        self.tables
            .entry(lookup_type.into())
            .or_default()
            .insert(source_code.into(), value.into());
    }
}

impl LookupResolver for InMemoryLookupResolver {
    fn resolve(&self, source_code: &str, lookup_type: &str) -> Option<String> {
        self.tables
            .get(lookup_type)
            .and_then(|table| table.get(source_code))
            .cloned()
    }
}

/// Null-object resolver for hosts with no lookup tables configured
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookups;

impl LookupResolver for NoLookups {
    fn resolve(&self, _source_code: &str, _lookup_type: &str) -> Option<String> {
        None
    }
}
