//! Load balancer path-pattern conditions
//!
//! A pattern is matched against the whole request path, case-sensitively.
//! `*` matches any run of characters (including none and line breaks) and `?`
//! matches exactly one character; everything else is literal.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

/// Longest pattern the load balancer accepts
pub const MAX_PATTERN_LEN: usize = 128;

static ALLOWED_PATTERN_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[A-Za-z0-9_\-.$/~"'@:+&*?]+$"#).expect("Invalid regex in ALLOWED_PATTERN_CHARS")
});

/// Errors for path patterns that the load balancer would refuse
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("path pattern is empty")]
    Empty,

    #[error("path pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    #[error("path pattern `{0}` is longer than {max} characters", max = MAX_PATTERN_LEN)]
    TooLong(String),

    #[error("path pattern `{0}` contains characters outside the allowed set")]
    InvalidCharacters(String),

    #[error("path pattern `{0}` cannot be compiled: {1}")]
    Compile(String, String),
}

/// Check a pattern against the provider's syntax rules without compiling it.
pub fn check_syntax(raw: &str) -> Result<(), PatternError> {
    if raw.is_empty() {
        return Err(PatternError::Empty);
    }
    if !raw.starts_with('/') {
        return Err(PatternError::MissingLeadingSlash(raw.to_string()));
    }
    if raw.len() > MAX_PATTERN_LEN {
        return Err(PatternError::TooLong(raw.to_string()));
    }
    if !ALLOWED_PATTERN_CHARS.is_match(raw) {
        return Err(PatternError::InvalidCharacters(raw.to_string()));
    }
    Ok(())
}

/// Whether the pattern matches every request path
pub fn is_catch_all(raw: &str) -> bool {
    raw == "/*" || raw == "*"
}

/// A compiled path pattern
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile a pattern. Syntax is not checked here; see [`check_syntax`].
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        let mut translated = String::with_capacity(raw.len() + 8);
        translated.push_str("(?s)^");
        let mut literal = String::new();
        for c in raw.chars() {
            match c {
                '*' | '?' => {
                    translated.push_str(&regex::escape(&literal));
                    literal.clear();
                    translated.push_str(if c == '*' { ".*" } else { "." });
                }
                _ => literal.push(c),
            }
        }
        translated.push_str(&regex::escape(&literal));
        translated.push('$');

        let regex = Regex::new(&translated)
            .map_err(|e| PatternError::Compile(raw.to_string(), e.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

impl PartialEq for PathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}
