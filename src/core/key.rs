//! core::key
//!
//! Validated option keys.
//!
//! # Normalization
//!
//! Keys are dot-separated paths (`display.width`). Construction
//! lowercases the raw text, so two spellings that differ only in case
//! name the same option everywhere in the registry.
//!
//! # Validation
//!
//! Every segment of a key must be a valid identifier after lowercasing:
//! it starts with a letter or underscore, continues with letters, digits,
//! or underscores, and is not a Rust keyword. Invalid keys cannot be
//! represented, preventing malformed paths from ever reaching the
//! namespace tree.

use thiserror::Error;

/// Errors from option key validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("option key cannot be empty")]
    Empty,

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("'{0}' is a rust keyword")]
    KeywordSegment(String),
}

/// Keywords that cannot appear as key segments.
///
/// Covers the strict and reserved keyword sets. Contextual keywords
/// (`union`, `macro_rules`) are allowed.
const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const",
    "continue", "crate", "do", "dyn", "else", "enum", "extern", "false",
    "final", "fn", "for", "if", "impl", "in", "let", "loop", "macro",
    "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try",
    "type", "typeof", "unsafe", "unsized", "use", "virtual", "where",
    "while", "yield",
];

/// A validated, lowercase-normalized option key.
///
/// # Example
///
/// ```
/// use knobwork::core::key::OptionKey;
///
/// let key = OptionKey::parse("Display.Width").unwrap();
/// assert_eq!(key.as_str(), "display.width");
/// assert_eq!(key.segments().collect::<Vec<_>>(), ["display", "width"]);
///
/// // Invalid constructions fail at creation time
/// assert!(OptionKey::parse("").is_err());
/// assert!(OptionKey::parse("display..width").is_err());
/// assert!(OptionKey::parse("display.2d").is_err());
/// assert!(OptionKey::parse("loop.count").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionKey(String);

impl OptionKey {
    /// Parse and normalize a raw key.
    ///
    /// # Errors
    ///
    /// Returns `KeyError::Empty` for an empty key,
    /// `KeyError::InvalidIdentifier` if any segment violates the
    /// identifier grammar, and `KeyError::KeywordSegment` if any segment
    /// is a Rust keyword.
    pub fn parse(raw: &str) -> Result<Self, KeyError> {
        if raw.is_empty() {
            return Err(KeyError::Empty);
        }

        let normalized = raw.to_ascii_lowercase();
        for segment in normalized.split('.') {
            Self::validate_segment(segment)?;
        }

        Ok(Self(normalized))
    }

    /// Validate one dot-separated segment against the identifier grammar.
    fn validate_segment(segment: &str) -> Result<(), KeyError> {
        let mut chars = segment.chars();
        let valid_start = match chars.next() {
            Some(c) => c.is_ascii_lowercase() || c == '_',
            None => false,
        };
        if !valid_start || !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(KeyError::InvalidIdentifier(segment.to_string()));
        }

        if KEYWORDS.contains(&segment) {
            return Err(KeyError::KeywordSegment(segment.to_string()));
        }

        Ok(())
    }

    /// Get the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterate over the dot-separated segments of the key.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl TryFrom<String> for OptionKey {
    type Error = KeyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<OptionKey> for String {
    fn from(key: OptionKey) -> Self {
        key.0
    }
}

impl AsRef<str> for OptionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
