//! File fingerprinting

use blake3::Hasher;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::Fingerprint;
use crate::error::LintError;
use crate::utils::config::HashingConsts;

/// Fingerprint a file with blake3. Uses memory-mapped I/O for files above threshold, chunked reading otherwise.
pub fn fingerprint_file(path: &Path) -> Result<Fingerprint, LintError> {
    let io_err = |source| LintError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let size = file.metadata().map_err(io_err)?.len();
    let mut hasher = Hasher::new();

    if size > HashingConsts::HASH_MMAP_THRESHOLD {
        let mmap = unsafe { Mmap::map(&file).map_err(io_err)? };
        hasher.update(&mmap);
    } else {
        let mut reader =
            std::io::BufReader::with_capacity(HashingConsts::HASH_READ_CHUNK_SIZE, file);
        let mut buffer = vec![0u8; HashingConsts::HASH_READ_CHUNK_SIZE.min(size as usize + 1)];
        loop {
            let n = reader.read(&mut buffer).map_err(io_err)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }
    }

    Ok(Fingerprint(*hasher.finalize().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_in_memory_digest() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.php");
        std::fs::write(&p, "<?php echo 'hi';\n").unwrap();
        assert_eq!(
            fingerprint_file(&p).unwrap(),
            Fingerprint::of_bytes(b"<?php echo 'hi';\n")
        );
    }

    #[test]
    fn changes_with_content() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("a.php");
        std::fs::write(&p, "<?php 1;").unwrap();
        let before = fingerprint_file(&p).unwrap();
        std::fs::write(&p, "<?php 2;").unwrap();
        assert_ne!(before, fingerprint_file(&p).unwrap());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = fingerprint_file(Path::new("/no/such/file.php")).unwrap_err();
        assert!(matches!(err, LintError::Io { .. }));
    }
}
