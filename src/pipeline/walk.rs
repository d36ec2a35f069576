//! File-set discovery: expand the configured paths into FileRefs.

use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::FileRef;
use crate::engine::tools::{
    has_extension, is_excluded, is_os_hidden_file, path_relative_to, path_to_key,
};

/// Paths, excludes and extensions that define which files a run covers.
#[derive(Clone, Debug, Default)]
pub struct FileSet {
    pub paths: Vec<PathBuf>,
    pub exclude: Vec<String>,
    pub extensions: Vec<String>,
}

impl FileSet {
    /// Enumerate every matching file. Directories are walked in file-name order; files given
    /// directly are taken as-is (no extension or exclude filter), keyed by the path as given.
    /// Unreadable entries and missing paths are logged and skipped.
    ///
    /// Walked files are keyed relative to their directory. With more than one configured path
    /// the key is prefixed with the directory as given, so `src/index.php` and
    /// `tests/index.php` never share a cache key.
    pub fn discover(&self) -> Vec<FileRef> {
        let mut files = Vec::new();
        let prefix_keys = self.paths.len() > 1;
        for path in &self.paths {
            if path.is_dir() {
                let prefix = prefix_keys.then_some(path.as_path());
                self.walk_dir(path, prefix, &mut files);
            } else if path.is_file() {
                match FileRef::from_path(path) {
                    Ok(f) => files.push(f),
                    Err(e) => warn!("{}", e),
                }
            } else {
                warn!("{} is neither a file nor a directory, skipping", path.display());
            }
        }
        debug!("discovered {} files", files.len());
        files
    }

    fn walk_dir(&self, dir: &Path, key_prefix: Option<&Path>, out: &mut Vec<FileRef>) {
        let root = match dir.canonicalize() {
            Ok(r) => r,
            Err(e) => {
                warn!("cannot resolve {}: {}", dir.display(), e);
                return;
            }
        };
        let mut skipped = 0_usize;
        let walker = WalkDir::new(&root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.depth() == 0 {
                    return true;
                }
                if is_os_hidden_file(e.path()) {
                    return false;
                }
                match path_relative_to(e.path(), &root) {
                    Some(rel) => !is_excluded(&path_to_key(&rel), &self.exclude),
                    None => true,
                }
            });
        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!("Permission denied or error accessing path: {}", err);
                    skipped += 1;
                    continue;
                }
            };
            if !entry.file_type().is_file() || !has_extension(entry.path(), &self.extensions) {
                continue;
            }
            let rel = path_relative_to(entry.path(), &root)
                .unwrap_or_else(|| entry.path().to_path_buf());
            let key = match key_prefix {
                Some(prefix) => prefixed_key(prefix, &rel),
                None => path_to_key(&rel),
            };
            out.push(FileRef::new(entry.into_path(), key));
        }
        if skipped > 0 {
            warn!(
                "Skipped {} paths under {} due to permission errors or access issues",
                skipped,
                root.display()
            );
        }
    }
}

/// `prefix/rel` as a key, without a leading `./`.
fn prefixed_key(prefix: &Path, rel: &Path) -> String {
    let key = path_to_key(&prefix.join(rel));
    match key.strip_prefix("./") {
        Some(stripped) => stripped.to_string(),
        None => key,
    }
}
