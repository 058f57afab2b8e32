//! Immutable snapshot of all configuration variants

use std::collections::BTreeMap;

use cfgsync_sections::ConfigDocument;

/// Every discovered variant, keyed by file name.
///
/// A `ConfigSet` is never mutated in place: each sync phase derives a new
/// snapshot with [`ConfigSet::with_document`] or [`ConfigSet::without`].
/// Iteration follows sorted file name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSet {
    documents: BTreeMap<String, ConfigDocument>,
}

impl ConfigSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ConfigDocument> {
        self.documents.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.documents.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// File names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn documents(&self) -> impl Iterator<Item = &ConfigDocument> {
        self.documents.values()
    }

    /// Documents other than `active`, in sorted order.
    pub fn targets<'a>(&'a self, active: &'a str) -> impl Iterator<Item = &'a ConfigDocument> {
        self.documents
            .values()
            .filter(move |doc| doc.name() != active)
    }

    /// A new snapshot with `document` added or replaced.
    pub fn with_document(&self, document: ConfigDocument) -> Self {
        let mut documents = self.documents.clone();
        documents.insert(document.name().to_string(), document);
        Self { documents }
    }

    /// A new snapshot without `name`.
    pub fn without(&self, name: &str) -> Self {
        let mut documents = self.documents.clone();
        documents.remove(name);
        Self { documents }
    }
}

impl FromIterator<ConfigDocument> for ConfigSet {
    fn from_iter<I: IntoIterator<Item = ConfigDocument>>(iter: I) -> Self {
        Self {
            documents: iter
                .into_iter()
                .map(|doc| (doc.name().to_string(), doc))
                .collect(),
        }
    }
}
