//! JSON cache store: a flat `{ "relative/key.php": "<blake3 hex>" }` object.

use log::warn;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::{CacheStore, ResultCache};
use crate::Fingerprint;
use crate::error::LintError;
use crate::utils::write_atomic;

pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }
}

impl CacheStore for JsonStore {
    /// A missing file is an empty cache. Content that is not a JSON object is treated as empty too.
    fn load(&self) -> Result<ResultCache, LintError> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ResultCache::new()),
            Err(source) => {
                return Err(LintError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let map = match serde_json::from_str::<Value>(&text)? {
            Value::Object(map) => map,
            other => {
                warn!(
                    "{}: expected an object, found {}; starting with an empty cache",
                    self.path.display(),
                    json_kind(&other)
                );
                return Ok(ResultCache::new());
            }
        };
        let mut cache = ResultCache::new();
        for (key, value) in map {
            match value.as_str().and_then(Fingerprint::from_hex) {
                Some(fp) => {
                    cache.insert(key, fp);
                }
                None => warn!("dropping cache entry {} with unreadable fingerprint", key),
            }
        }
        Ok(cache)
    }

    fn save(&mut self, cache: &ResultCache) -> Result<(), LintError> {
        let sorted: BTreeMap<&str, String> = cache
            .iter()
            .map(|(k, fp)| (k.as_str(), fp.to_hex()))
            .collect();
        let text = serde_json::to_string_pretty(&sorted)?;
        write_atomic(&self.path, text.as_bytes())
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(&dir.path().join("nope.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn non_object_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "[1, 2, 3]").unwrap();
        assert!(JsonStore::new(&path).load().unwrap().is_empty());
    }

    #[test]
    fn bad_entries_are_dropped_good_ones_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let good = Fingerprint::of_bytes(b"<?php");
        std::fs::write(
            &path,
            format!(
                r#"{{"a.php": "{}", "b.php": "d41d8cd98f00b204e9800998ecf8427e", "c.php": 5}}"#,
                good.to_hex()
            ),
        )
        .unwrap();
        let cache = JsonStore::new(&path).load().unwrap();
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a.php"), Some(good));
    }

    #[test]
    fn save_writes_exactly_the_given_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        let mut store = JsonStore::new(&path);

        let mut first = ResultCache::new();
        first.insert("a.php", Fingerprint::of_bytes(b"a"));
        first.insert("b.php", Fingerprint::of_bytes(b"b"));
        store.save(&first).unwrap();

        let mut second = ResultCache::new();
        second.insert("a.php", Fingerprint::of_bytes(b"a"));
        store.save(&second).unwrap();

        assert_eq!(store.load().unwrap(), second);
    }

    #[test]
    fn malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonStore::new(&path).load(),
            Err(LintError::Json(_))
        ));
    }
}
