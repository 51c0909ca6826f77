use std::collections::btree_map;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A submitted field value: either text or a nested map.
///
/// Bracketed field names (`contact[verification][ip]`) nest, so a submitted
/// form is a tree of maps with text at the leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Map(FieldMap),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&FieldMap> {
        match self {
            FieldValue::Map(map) => Some(map),
            FieldValue::Text(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        FieldValue::Text(text.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        FieldValue::Text(text)
    }
}

impl From<FieldMap> for FieldValue {
    fn from(map: FieldMap) -> Self {
        FieldValue::Map(map)
    }
}

/// Submitted fields keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(BTreeMap<String, FieldValue>);

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from flat `(name, value)` pairs, expanding bracketed
    /// names. Later pairs win.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut map = Self::new();
        for (name, value) in pairs {
            map.insert_path(name.as_ref(), value);
        }
        map
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    /// Text value under `key`, if it is text.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Nested map under `key`, if it is a map.
    pub fn map(&self, key: &str) -> Option<&FieldMap> {
        self.get(key).and_then(FieldValue::as_map)
    }

    /// Mutable nested map under `key`, if it is a map.
    pub fn map_mut(&mut self, key: &str) -> Option<&mut FieldMap> {
        match self.0.get_mut(key) {
            Some(FieldValue::Map(map)) => Some(map),
            _ => None,
        }
    }

    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.0.remove(key)
    }

    /// Insert text under a possibly bracketed name.
    ///
    /// `a[b][c]` creates maps `a` and `b` as needed. An empty segment
    /// (`a[]`) appends under the next numeric key. A text value in the way
    /// of a nested name is replaced by a map.
    pub fn insert_path(&mut self, name: &str, value: impl Into<String>) {
        let segments = split_name(name);
        let Some((last, parents)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for segment in parents {
            let key = current.resolve_segment(segment);
            let slot = current
                .0
                .entry(key)
                .or_insert_with(|| FieldValue::Map(FieldMap::new()));
            if let FieldValue::Text(_) = slot {
                *slot = FieldValue::Map(FieldMap::new());
            }
            current = match slot {
                FieldValue::Map(map) => map,
                FieldValue::Text(_) => return,
            };
        }

        let key = current.resolve_segment(last);
        current.0.insert(key, FieldValue::Text(value.into()));
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    fn resolve_segment(&self, segment: &str) -> String {
        if segment.is_empty() {
            self.0.len().to_string()
        } else {
            segment.to_string()
        }
    }
}

impl<'a> IntoIterator for &'a FieldMap {
    type Item = (&'a String, &'a FieldValue);
    type IntoIter = btree_map::Iter<'a, String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Split `a[b][c]` into `["a", "b", "c"]`. Names that are not well formed
/// bracket paths are returned whole.
fn split_name(name: &str) -> Vec<&str> {
    let Some(open) = name.find('[') else {
        return vec![name];
    };
    if open == 0 || !name.ends_with(']') {
        return vec![name];
    }

    let mut segments = vec![&name[..open]];
    let mut rest = &name[open..];
    while !rest.is_empty() {
        let Some(inner) = rest.strip_prefix('[') else {
            return vec![name];
        };
        let Some(close) = inner.find(']') else {
            return vec![name];
        };
        segments.push(&inner[..close]);
        rest = &inner[close + 1..];
    }
    segments
}
