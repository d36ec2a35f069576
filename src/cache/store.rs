use std::path::Path;

use super::{JsonStore, ResultCache, SqliteStore};
use crate::error::LintError;

/// Persistence for the result cache. `save` always replaces the stored set; it never merges.
pub trait CacheStore {
    fn load(&self) -> Result<ResultCache, LintError>;
    fn save(&mut self, cache: &ResultCache) -> Result<(), LintError>;
}

/// Open the store for `path`: JSON when the extension is `.json`, SQLite otherwise.
pub fn open_store(path: &Path) -> Result<Box<dyn CacheStore>, LintError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(Box::new(JsonStore::new(path)))
    } else {
        Ok(Box::new(SqliteStore::open(path)?))
    }
}
