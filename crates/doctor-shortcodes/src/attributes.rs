//! Attribute extraction for matched shortcode elements.

use doctor_markup::{Document, NodeId};
use serde::{Serialize, Serializer};

/// Attributes of one shortcode element, in source order.
///
/// Keys are case-sensitive and values are the raw strings written in the
/// markup: no trimming, no entity decoding, no type coercion. A bare
/// attribute (`<toc sticky>`) has an empty value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeBag {
    entries: Vec<(String, String)>,
}

impl AttributeBag {
    /// Create an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by exact key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Check whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Insert a value, replacing an existing one with the same key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(name, _)| *name == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the bag is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in source order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for AttributeBag {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut bag = Self::new();
        for (key, value) in iter {
            bag.insert(key, value);
        }
        bag
    }
}

impl Serialize for AttributeBag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

/// Copy every attribute of `element` into a fresh [`AttributeBag`].
///
/// Returns an empty bag for non-element nodes and attribute-less elements.
/// When an attribute name repeats, the first occurrence wins.
#[must_use]
pub fn extract_attributes(doc: &Document, element: NodeId) -> AttributeBag {
    let mut bag = AttributeBag::new();
    let Some(element) = doc.element(element) else {
        return bag;
    };
    for attr in &element.attrs {
        if !bag.contains_key(&attr.name) {
            bag.entries.push((attr.name.clone(), attr.value().to_owned()));
        }
    }
    bag
}
