use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::LintError;
use crate::utils::config::PackagePaths;

/// Sibling temp path for `path` (e.g. `.parlint.json` -> `.parlint.json.tmp`).
pub fn temp_path_for(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_else(|| PackagePaths::get().cache_filename());
    path.parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Write `bytes` to a temp file next to `path`, then rename over `path`.
/// Readers never observe a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), LintError> {
    let temp_path = temp_path_for(path);
    let io_err = |p: &Path| {
        let p = p.to_path_buf();
        move |source: std::io::Error| LintError::Io { path: p, source }
    };
    {
        let mut file = fs::File::create(&temp_path).map_err(io_err(&temp_path))?;
        file.write_all(bytes).map_err(io_err(&temp_path))?;
        file.sync_all().map_err(io_err(&temp_path))?;
    }
    if let Err(source) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(LintError::Io {
            path: path.to_path_buf(),
            source,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_path_is_sibling() {
        let p = Path::new("/work/.parlint.json");
        assert_eq!(temp_path_for(p), PathBuf::from("/work/.parlint.json.tmp"));
    }

    #[test]
    fn write_atomic_replaces_and_leaves_no_temp() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("cache.json");
        fs::write(&target, "old").unwrap();
        write_atomic(&target, b"new").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "new");
        assert!(!temp_path_for(&target).exists());
    }
}
