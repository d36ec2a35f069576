//! Load `.parlint.toml` (CLI only). Lib callers configure through [`Opts`] directly.

use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::Opts;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ParlintToml {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    checker: CheckerSection,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    paths: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    extensions: Option<Vec<String>>,
    jobs: Option<NonZeroUsize>,
    cache: Option<String>,
    no_cache: Option<bool>,
    timeout: Option<u64>,
    verbose: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct CheckerSection {
    program: Option<String>,
    args: Option<Vec<String>>,
    success_marker: Option<String>,
    error_pattern: Option<String>,
}

impl ParlintToml {
    pub(crate) fn verbose(&self) -> Option<bool> {
        self.settings.verbose
    }
}

/// Load the config file at `path`. Returns None if missing or unreadable; parse errors are logged.
pub(crate) fn load_parlint_toml(path: &Path) -> Option<ParlintToml> {
    let s = std::fs::read_to_string(path).ok()?;
    toml::from_str(&s)
        .map_err(|e| log::warn!("{}: {}", path.display(), e))
        .ok()
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($sec:expr, $opts:expr, $sec_field:ident => $opts_field:ident) => {
        if let Some(v) = $sec.$sec_field.clone() {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI flags.
pub(crate) fn apply_file_to_opts(file: &ParlintToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref paths) = s.paths {
        opts.paths = paths.iter().map(PathBuf::from).collect();
    }
    apply_file_opt!(s, opts, exclude => exclude);
    apply_file_opt!(s, opts, extensions => extensions);
    apply_file_opt!(s, opts, jobs => process_limit);
    apply_file_opt!(s, opts, verbose => verbose);
    if let Some(ref p) = s.cache {
        opts.cache_path = Some(PathBuf::from(p));
    }
    if let Some(no_cache) = s.no_cache {
        opts.use_cache = !no_cache;
    }
    if let Some(secs) = s.timeout {
        opts.task_timeout = Some(Duration::from_secs(secs));
    }

    let c = &file.checker;
    apply_file_opt!(c, opts.checker, program => program);
    apply_file_opt!(c, opts.checker, args => args);
    if c.success_marker.is_some() {
        opts.checker.success_marker = c.success_marker.clone().filter(|m| !m.is_empty());
    }
    if c.error_pattern.is_some() {
        opts.checker.error_pattern = c.error_pattern.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_values_override_defaults() {
        let file: ParlintToml = toml::from_str(
            r#"
            [settings]
            exclude = ["vendor"]
            jobs = 8
            no_cache = true
            timeout = 30

            [checker]
            program = "/usr/bin/php8.3"
            success_marker = ""
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.exclude, vec!["vendor".to_string()]);
        assert_eq!(opts.process_limit.get(), 8);
        assert!(!opts.use_cache);
        assert_eq!(opts.task_timeout, Some(Duration::from_secs(30)));
        assert_eq!(opts.checker.program, "/usr/bin/php8.3");
        assert_eq!(opts.checker.success_marker, None);
        // untouched fields keep their defaults
        assert_eq!(opts.extensions, vec!["php".to_string()]);
    }

    #[test]
    fn zero_jobs_is_rejected() {
        let parsed: Result<ParlintToml, _> = toml::from_str("[settings]\njobs = 0\n");
        assert!(parsed.is_err());
    }
}
