//! Result cache: relative key -> fingerprint of the last clean check, plus its persistent stores.
//!
//! The in-memory [`ResultCache`] is a validity oracle only. A run builds a fresh one (the
//! replacement cache) that fully replaces whatever was stored before.

mod json;
mod sqlite;
mod store;

pub use json::JsonStore;
pub use sqlite::SqliteStore;
pub use store::{CacheStore, open_store};

use std::collections::HashMap;
use std::collections::hash_map;

use crate::Fingerprint;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResultCache {
    entries: HashMap<String, Fingerprint>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Fingerprint> {
        self.entries.get(key).copied()
    }

    /// True iff `key` is recorded with exactly `current`.
    pub fn contains_valid(&self, key: &str, current: &Fingerprint) -> bool {
        self.entries.get(key) == Some(current)
    }

    pub fn insert(&mut self, key: impl Into<String>, fingerprint: Fingerprint) -> Option<Fingerprint> {
        self.entries.insert(key.into(), fingerprint)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Fingerprint> {
        self.entries.iter()
    }
}

impl FromIterator<(String, Fingerprint)> for ResultCache {
    fn from_iter<I: IntoIterator<Item = (String, Fingerprint)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a ResultCache {
    type Item = (&'a String, &'a Fingerprint);
    type IntoIter = hash_map::Iter<'a, String, Fingerprint>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_only_when_fingerprint_matches() {
        let old = Fingerprint::of_bytes(b"<?php 1;");
        let new = Fingerprint::of_bytes(b"<?php 2;");
        let mut cache = ResultCache::new();
        cache.insert("src/a.php", old);

        assert!(cache.contains_valid("src/a.php", &old));
        assert!(!cache.contains_valid("src/a.php", &new));
        assert!(!cache.contains_valid("src/b.php", &old));
        assert_eq!(cache.get("src/a.php"), Some(old));
        assert_eq!(cache.get("src/b.php"), None);
    }
}
