//! Glob-style pattern matching for policy domains, resources, and routes.
//!
//! Patterns are matched segment-by-segment over `/`- and `:`-delimited
//! tokens; no regex engine is involved.
//!
//! Rules:
//! - `*` as the whole pattern matches any value.
//! - a `*` segment matches exactly one token, except in final position
//!   where it matches one or more remaining tokens.
//! - a `:name` segment matches exactly one token of any content.
//! - any other segment must match the corresponding token exactly.
//!
//! Examples: `region:*` matches `region:east`; `/account/*/self` matches
//! `/account/v1/self`; `/donation/*` matches `/donation/v1/list` but not
//! `/donation`.

/// Returns true when `value` matches the glob-style `pattern`.
pub fn matches(value: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }

    let value_tokens: Vec<&str> = tokenize(value);
    let pattern_tokens: Vec<&str> = tokenize(pattern);

    match_tokens(&value_tokens, &pattern_tokens)
}

/// A pre-parsed pattern for repeated matching (e.g. public-route lists).
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
}

impl Pattern {
    /// Compiles a pattern string.
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            raw: pattern.into(),
        }
    }

    /// Returns the original pattern string.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Matches a value against this pattern.
    pub fn matches(&self, value: &str) -> bool {
        matches(value, &self.raw)
    }
}

fn tokenize(input: &str) -> Vec<&str> {
    input.split(['/', ':']).collect()
}

fn match_tokens(value: &[&str], pattern: &[&str]) -> bool {
    let last = pattern.len().saturating_sub(1);

    for (i, seg) in pattern.iter().enumerate() {
        if *seg == "*" && i == last {
            // Trailing wildcard swallows one or more remaining tokens.
            return value.len() > i;
        }

        let Some(token) = value.get(i) else {
            return false;
        };

        if *seg == "*" || (seg.len() > 1 && seg.starts_with(':')) {
            continue;
        }

        if seg != token {
            return false;
        }
    }

    value.len() == pattern.len()
}
