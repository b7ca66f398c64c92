use indexmap::IndexMap;

/// Insertion-ordered map keyed by image identifier.
///
/// Overwriting an existing key keeps its original position, so enumeration
/// order is always the order in which keys were first seen.
#[derive(Debug, Clone)]
pub struct ImageMap<V> {
    entries: IndexMap<String, V>,
}

impl<V> Default for ImageMap<V> {
    fn default() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }
}

impl<V> ImageMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites, returning the position of the entry.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> usize {
        self.entries.insert_full(key.into(), value).0
    }

    /// Returns the value for `key`, inserting `default()` at the end if absent.
    pub fn get_or_insert_with(&mut self, key: impl Into<String>, default: impl FnOnce() -> V) -> &mut V {
        self.entries.entry(key.into()).or_insert_with(default)
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn position(&self, key: &str) -> Option<usize> {
        self.entries.get_index_of(key)
    }

    pub fn get_index(&self, pos: usize) -> Option<(&str, &V)> {
        self.entries.get_index(pos).map(|(k, v)| (k.as_str(), v))
    }

    pub fn get_index_mut(&mut self, pos: usize) -> Option<(&str, &mut V)> {
        self.entries
            .get_index_mut(pos)
            .map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
