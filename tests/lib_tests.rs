use parlint::engine::tools::{has_extension, is_excluded};
use parlint::engine::{glob_match, path_relative_to, path_to_key};
use std::path::{Path, PathBuf};

// --- path_relative_to ---

#[test]
fn test_path_relative_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/foo/bar/baz/qux.php");
    assert_eq!(
        path_relative_to(&path, &base),
        Some(PathBuf::from("baz/qux.php"))
    );
}

#[test]
fn test_path_relative_not_under_base() {
    let base = PathBuf::from("/foo/bar");
    let path = PathBuf::from("/other/qux.php");
    assert_eq!(path_relative_to(&path, &base), None);
}

#[test]
fn test_path_relative_path_equals_base() {
    let base = PathBuf::from("/foo/bar");
    assert_eq!(path_relative_to(&base, &base), Some(PathBuf::new()));
}

// --- path_to_key (cache keys are portable) ---

#[test]
fn test_path_to_key_forward_slashes() {
    assert_eq!(path_to_key(Path::new("src/index.php")), "src/index.php");
}

#[test]
fn test_path_to_key_normalizes_backslashes() {
    assert_eq!(path_to_key(Path::new("src\\index.php")), "src/index.php");
}

// --- glob_match ---

#[test]
fn test_glob_star_suffix() {
    assert!(glob_match("*.php", "index.php"));
    assert!(!glob_match("*.php", "index.phtml"));
}

#[test]
fn test_glob_question_mark() {
    assert!(glob_match("a?.php", "ab.php"));
    assert!(!glob_match("a?.php", "abc.php"));
}

#[test]
fn test_glob_star_in_middle() {
    assert!(glob_match("cache/*/tmp.php", "cache/x/tmp.php"));
    assert!(glob_match("*.tpl.php", "views/home.tpl.php"));
}

#[test]
fn test_glob_negation_prefix_is_ignored() {
    assert!(glob_match("!*.php", "a.php"));
}

// --- is_excluded ---

#[test]
fn test_plain_pattern_matches_anywhere_in_path() {
    let patterns = vec!["vendor".to_string()];
    assert!(is_excluded("vendor", &patterns));
    assert!(is_excluded("lib/vendor/x.php", &patterns));
    assert!(!is_excluded("src/x.php", &patterns));
}

#[test]
fn test_glob_pattern_matches_name_or_path() {
    let patterns = vec!["*.tpl.php".to_string(), "build/*".to_string()];
    assert!(is_excluded("views/home.tpl.php", &patterns));
    assert!(is_excluded("build/out.php", &patterns));
    assert!(!is_excluded("views/home.php", &patterns));
}

#[test]
fn test_trailing_slash_and_empty_patterns() {
    assert!(is_excluded("cache/a.php", &["cache/".to_string()]));
    assert!(!is_excluded("a.php", &["".to_string()]));
}

// --- has_extension ---

#[test]
fn test_extension_filter() {
    let exts = vec!["php".to_string(), ".phtml".to_string()];
    assert!(has_extension(Path::new("a.php"), &exts));
    assert!(has_extension(Path::new("a.phtml"), &exts));
    assert!(!has_extension(Path::new("a.inc"), &exts));
    assert!(!has_extension(Path::new("Makefile"), &exts));
}

#[test]
fn test_empty_extension_list_accepts_all() {
    assert!(has_extension(Path::new("Makefile"), &[]));
}
