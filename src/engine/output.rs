//! Checker output interpretation: pass/fail decision and diagnostic extraction.

use regex::Regex;
use std::sync::LazyLock;

use crate::CheckerConfig;
use crate::error::LintError;
use crate::utils::config::CheckerDefaults;

static PHP_ERROR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(CheckerDefaults::ERROR_PATTERN).expect("built-in error pattern compiles")
});

/// Decides whether a finished checker reported a failure and pulls line/message out of its output.
#[derive(Clone, Debug)]
pub struct OutputParser {
    pattern: Regex,
    success_marker: Option<String>,
}

impl Default for OutputParser {
    fn default() -> Self {
        Self {
            pattern: PHP_ERROR_PATTERN.clone(),
            success_marker: Some(CheckerDefaults::SUCCESS_MARKER.to_string()),
        }
    }
}

impl OutputParser {
    pub fn new(pattern: Option<&str>, success_marker: Option<String>) -> Result<Self, LintError> {
        let pattern = match pattern {
            Some(p) => Regex::new(p)?,
            None => PHP_ERROR_PATTERN.clone(),
        };
        Ok(Self {
            pattern,
            success_marker,
        })
    }

    pub fn from_config(config: &CheckerConfig) -> Result<Self, LintError> {
        Self::new(
            config.error_pattern.as_deref(),
            config.success_marker.clone(),
        )
    }

    /// A run failed if the checker exited unsuccessfully, or if a success marker is configured
    /// and missing from the output.
    pub fn is_failure(&self, exit_ok: bool, output: &str) -> bool {
        if !exit_ok {
            return true;
        }
        match &self.success_marker {
            Some(marker) => !output.contains(marker.as_str()),
            None => false,
        }
    }

    /// Extract `(line, message)`. Without a match the message is the trimmed raw output.
    pub fn parse(&self, output: &str) -> (Option<u32>, String) {
        let raw = output.trim();
        let Some(caps) = self.pattern.captures(raw) else {
            return (None, raw.to_string());
        };
        let line = caps.name("line").and_then(|m| m.as_str().parse().ok());
        let message = caps
            .name("message")
            .map(|m| m.as_str().trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| raw.to_string());
        (line, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn php_parse_error_is_split_into_line_and_message() {
        let out = "PHP Parse error:  syntax error, unexpected end of file in /srv/app/a.php on line 7\n\
                   Errors parsing /srv/app/a.php\n";
        let (line, msg) = OutputParser::default().parse(out);
        assert_eq!(line, Some(7));
        assert_eq!(msg, "unexpected end of file");
    }

    #[test]
    fn display_errors_variant_without_php_prefix() {
        let out = "\nParse error: syntax error, unexpected '}' in b.php on line 12\nErrors parsing b.php";
        let (line, msg) = OutputParser::default().parse(out);
        assert_eq!(line, Some(12));
        assert_eq!(msg, "unexpected '}'");
    }

    #[test]
    fn fatal_error_keeps_full_message() {
        let out = "PHP Fatal error:  Cannot redeclare foo() in /x/c.php on line 4";
        let (line, msg) = OutputParser::default().parse(out);
        assert_eq!(line, Some(4));
        assert_eq!(msg, "Cannot redeclare foo()");
    }

    #[test]
    fn unparseable_output_falls_back_to_raw_text() {
        let (line, msg) = OutputParser::default().parse("  Segmentation fault\n");
        assert_eq!(line, None);
        assert_eq!(msg, "Segmentation fault");
    }

    #[test]
    fn failure_needs_bad_exit_or_missing_marker() {
        let p = OutputParser::default();
        assert!(!p.is_failure(true, "No syntax errors detected in a.php"));
        assert!(p.is_failure(true, "Errors parsing a.php"));
        assert!(p.is_failure(false, "No syntax errors detected in a.php"));

        let exit_only = OutputParser::new(None, None).unwrap();
        assert!(!exit_only.is_failure(true, ""));
        assert!(exit_only.is_failure(false, ""));
    }

    #[test]
    fn custom_pattern_groups() {
        let p = OutputParser::new(Some(r"(?m)^(?P<line>\d+):(?P<message>.*)$"), None).unwrap();
        assert_eq!(p.parse("3: missing semicolon"), (Some(3), "missing semicolon".into()));
    }

    #[test]
    fn invalid_custom_pattern_is_rejected() {
        assert!(matches!(
            OutputParser::new(Some("(unclosed"), None),
            Err(LintError::Pattern(_))
        ));
    }
}
