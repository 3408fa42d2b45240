//! Alias/source dedup table.
//!
//! Serialized queries stay compact by sharing one alias per logically
//! equal source: registering an equal source a second time hands back the
//! existing alias instead of growing the table.

use crate::ast::QueryDefn;

/// A registrable data source: a schema entity or a nested subquery.
#[derive(Debug, Clone, PartialEq)]
pub enum FromSource {
    /// Entity of a conceptual schema
    Entity { schema: String, entity: String },

    /// Nested subquery
    Subquery(Box<QueryDefn>),
}

impl FromSource {
    pub fn entity(schema: impl Into<String>, entity: impl Into<String>) -> Self {
        FromSource::Entity {
            schema: schema.into(),
            entity: entity.into(),
        }
    }

    pub fn subquery(query: QueryDefn) -> Self {
        FromSource::Subquery(Box::new(query))
    }

    /// Default alias for this source when the caller has no preference:
    /// the entity name's lowercase first letter, `"q"` for subqueries.
    fn default_alias(&self) -> String {
        match self {
            FromSource::Entity { entity, .. } => entity
                .chars()
                .next()
                .map(|c| c.to_lowercase().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| "t".to_string()),
            FromSource::Subquery(_) => "q".to_string(),
        }
    }
}

/// Outcome of [`FromTable::ensure_source`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnsureResult {
    /// Alias the source is registered under
    pub alias: String,
    /// Whether this call created the registration
    pub is_new: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct FromEntry {
    alias: String,
    source: FromSource,
}

/// Ordered alias → source table with unique aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FromTable {
    entries: Vec<FromEntry>,
}

impl FromTable {
    pub fn new() -> Self {
        FromTable::default()
    }

    /// Registers `source`, reusing the alias of an equal source if one is
    /// already present (`is_new = false`, table unchanged). A new source
    /// registers under `desired_alias` or the source's default alias,
    /// resolving collisions by numeric suffixing.
    pub fn ensure_source(
        &mut self,
        source: FromSource,
        desired_alias: Option<&str>,
    ) -> EnsureResult {
        if let Some(entry) = self.entries.iter().find(|e| e.source == source) {
            return EnsureResult {
                alias: entry.alias.clone(),
                is_new: false,
            };
        }

        let base = desired_alias
            .map(str::to_string)
            .unwrap_or_else(|| source.default_alias());
        let alias = self.unique_alias(&base);
        self.entries.push(FromEntry {
            alias: alias.clone(),
            source,
        });
        EnsureResult { alias, is_new: true }
    }

    /// Deletes the registration under `alias`, returning its source.
    ///
    /// No reference counting is performed: the caller must guarantee no
    /// expression still refers to the removed alias.
    pub fn remove(&mut self, alias: &str) -> Option<FromSource> {
        let position = self.entries.iter().position(|e| e.alias == alias)?;
        Some(self.entries.remove(position).source)
    }

    /// Source registered under `alias`.
    pub fn source(&self, alias: &str) -> Option<&FromSource> {
        self.entries
            .iter()
            .find(|e| e.alias == alias)
            .map(|e| &e.source)
    }

    /// Aliases in registration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.alias.as_str())
    }

    /// `(alias, source)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &FromSource)> {
        self.entries.iter().map(|e| (e.alias.as_str(), &e.source))
    }

    /// Rebuilds the table with each source passed through `f`; `None`
    /// keeps the source as-is. Aliases are preserved.
    pub fn map_sources<F>(&self, mut f: F) -> FromTable
    where
        F: FnMut(&FromSource) -> Option<FromSource>,
    {
        FromTable {
            entries: self
                .entries
                .iter()
                .map(|e| FromEntry {
                    alias: e.alias.clone(),
                    source: f(&e.source).unwrap_or_else(|| e.source.clone()),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn has_alias(&self, alias: &str) -> bool {
        self.entries.iter().any(|e| e.alias == alias)
    }

    fn unique_alias(&self, base: &str) -> String {
        if !self.has_alias(base) {
            return base.to_string();
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base}{n}");
            if !self.has_alias(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
