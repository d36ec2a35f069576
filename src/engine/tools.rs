//! Path and filter utilities

use std::path::{Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Cache key for a path: forward slashes on every platform so a cache file is portable.
pub fn path_to_key(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Check if a file should be excluded based on OS-specific hidden files
pub fn is_os_hidden_file(path: &Path) -> bool {
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        match name {
            // macOS
            ".DS_Store" | ".AppleDouble" | ".LSOverride" => true,
            // Windows
            "Thumbs.db" | "ehthumbs.db" | "Desktop.ini" | "$RECYCLE.BIN" => true,
            // Linux
            ".directory" => true,
            _ => {
                // macOS resource fork files and trash dirs
                name.starts_with("._") || name.starts_with(".Trash-")
            }
        }
    } else {
        false
    }
}

/// True when `pattern` uses glob wildcards; plain patterns match as substrings.
fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// True if `rel` (a relative key with `/` separators) matches any exclude pattern.
///
/// Glob patterns are tried against the file name and the whole relative path; plain patterns
/// exclude every path containing them (so `vendor` drops `vendor/` and `lib/vendor/x.php`).
pub fn is_excluded(rel: &str, exclude_patterns: &[String]) -> bool {
    let name = rel.rsplit('/').next().unwrap_or(rel);
    exclude_patterns.iter().any(|pattern| {
        let pattern = pattern.trim_end_matches('/');
        if pattern.is_empty() {
            return false;
        }
        if is_glob(pattern) {
            glob_match(pattern, name) || glob_match(pattern, rel)
        } else {
            rel.contains(pattern)
        }
    })
}

/// True if the file's extension is one of `extensions` (no leading dot). Empty list accepts all.
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    if extensions.is_empty() {
        return true;
    }
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions
            .iter()
            .any(|want| want.trim_start_matches('.') == ext),
        None => false,
    }
}

/// Simple glob pattern matching (supports * and ?)
pub fn glob_match(pattern: &str, text: &str) -> bool {
    // Remove leading '!' if present (negation handled by caller)
    let pattern = pattern.strip_prefix('!').unwrap_or(pattern);

    let mut pattern_chars = pattern.chars().peekable();
    let mut text_chars = text.chars().peekable();

    while let Some(&p) = pattern_chars.peek() {
        match p {
            '*' => {
                pattern_chars.next();
                if pattern_chars.peek().is_none() {
                    return true; // trailing * matches everything
                }
                let rest: String = pattern_chars.clone().collect();
                loop {
                    if glob_match(&rest, &text_chars.clone().collect::<String>()) {
                        return true;
                    }
                    if text_chars.next().is_none() {
                        return false;
                    }
                }
            }
            '?' => {
                pattern_chars.next();
                if text_chars.next().is_none() {
                    return false;
                }
            }
            _ => {
                pattern_chars.next();
                if text_chars.next() != Some(p) {
                    return false;
                }
            }
        }
    }

    text_chars.peek().is_none()
}
