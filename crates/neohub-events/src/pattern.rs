//! Subscription patterns and event-name matching.
//!
//! Event names and patterns are delimiter-separated segment lists
//! (`SmartContract.RuntimeLog`). A `*` segment matches exactly one segment
//! at that position and a pattern consisting of `*` alone matches every
//! event name. There is no multi-segment operator: apart from the universal
//! pattern, a match requires equal segment counts.

use std::fmt;

use crate::error::{HubError, HubResult};

/// Single-segment wildcard token. On its own it is the universal pattern.
pub const WILDCARD: &str = "*";

/// Default segment delimiter.
pub const DEFAULT_DELIMITER: char = '.';

/// A validated subscription pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pattern {
    raw: String,
    delimiter: char,
}

impl Pattern {
    /// Parse a pattern using the default `.` delimiter.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidPattern`] if the pattern is empty or has
    /// an empty segment.
    pub fn new(raw: impl Into<String>) -> HubResult<Self> {
        Self::with_delimiter(raw, DEFAULT_DELIMITER)
    }

    /// Parse a pattern split on `delimiter`.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::InvalidDelimiter`] if `delimiter` cannot separate
    /// segments, or [`HubError::InvalidPattern`] if the pattern is empty or
    /// has an empty segment (leading, trailing or doubled delimiter).
    pub fn with_delimiter(raw: impl Into<String>, delimiter: char) -> HubResult<Self> {
        validate_delimiter(delimiter)?;
        let raw = raw.into();

        if raw.is_empty() {
            return Err(HubError::InvalidPattern {
                pattern: raw,
                reason: "pattern is empty".to_owned(),
            });
        }

        if raw.split(delimiter).any(str::is_empty) {
            return Err(HubError::InvalidPattern {
                reason: format!("pattern contains an empty segment (delimiter '{delimiter}')"),
                pattern: raw,
            });
        }

        Ok(Self { raw, delimiter })
    }

    /// The pattern exactly as it was registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Delimiter this pattern was parsed with.
    #[must_use]
    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Whether this is the match-everything pattern.
    #[must_use]
    pub fn is_universal(&self) -> bool {
        self.raw == WILDCARD
    }

    /// Whether any segment is a wildcard.
    #[must_use]
    pub fn has_wildcard(&self) -> bool {
        self.raw.split(self.delimiter).any(|s| s == WILDCARD)
    }

    /// Check an event name against this pattern.
    ///
    /// With `wildcard` disabled the pattern only matches an identical name.
    #[must_use]
    pub fn matches(&self, event_name: &str, wildcard: bool) -> bool {
        if wildcard {
            matches_with_delimiter(&self.raw, event_name, self.delimiter)
        } else {
            self.raw == event_name
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl AsRef<str> for Pattern {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

/// Check that `delimiter` can separate segments.
///
/// The wildcard character, whitespace and control characters are rejected.
///
/// # Errors
///
/// Returns [`HubError::InvalidDelimiter`] naming the offending character.
pub fn validate_delimiter(delimiter: char) -> HubResult<()> {
    let reason = if delimiter == '*' {
        "the wildcard character cannot be a delimiter"
    } else if delimiter.is_whitespace() {
        "whitespace cannot be a delimiter"
    } else if delimiter.is_control() {
        "control characters cannot be delimiters"
    } else {
        return Ok(());
    };

    Err(HubError::InvalidDelimiter {
        delimiter,
        reason: reason.to_owned(),
    })
}

/// Check if an event name matches a pattern split on `.`.
///
/// # Examples
///
/// ```
/// use neohub_events::pattern::matches;
///
/// assert!(matches("SmartContract.*", "SmartContract.RuntimeLog"));
/// assert!(matches("*", "SmartContract.Execution.Fail"));
/// assert!(!matches("SmartContract.*", "SmartContract.Execution.Fail"));
/// ```
#[must_use]
pub fn matches(pattern: &str, event_name: &str) -> bool {
    matches_with_delimiter(pattern, event_name, DEFAULT_DELIMITER)
}

/// Check if an event name matches a pattern split on `delimiter`.
///
/// A `*` segment never matches an empty name segment, so `a.*` does not
/// match `a.`. The universal pattern still matches every name.
#[must_use]
pub fn matches_with_delimiter(pattern: &str, event_name: &str, delimiter: char) -> bool {
    if pattern == WILDCARD {
        return true;
    }

    let pattern_parts: Vec<&str> = pattern.split(delimiter).collect();
    let name_parts: Vec<&str> = event_name.split(delimiter).collect();

    if pattern_parts.len() != name_parts.len() {
        return false;
    }

    pattern_parts
        .iter()
        .zip(name_parts.iter())
        .all(|(p, n)| (*p == WILDCARD && !n.is_empty()) || p == n)
}
