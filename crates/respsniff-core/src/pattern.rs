//! Case-insensitive URL glob matching.

use glob::{MatchOptions, Pattern};
use tracing::warn;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// A single compiled URL pattern.
///
/// `*` matches any run of characters (slashes included), `?` any single
/// character, `[...]` a character class. Patterns that do not compile
/// (an unclosed `[`) are matched literally.
#[derive(Debug, Clone)]
pub struct UrlPattern {
    source: String,
    compiled: Pattern,
}

impl UrlPattern {
    pub fn new(pattern: &str) -> Self {
        let source = pattern.to_lowercase();
        let normalized = collapse_stars(&source);
        let compiled = Pattern::new(&normalized).unwrap_or_else(|e| {
            warn!("URL pattern {:?} is not a valid glob ({}), matching literally", pattern, e);
            // The escaped form always compiles.
            Pattern::new(&Pattern::escape(&source)).unwrap_or_default()
        });
        Self { source, compiled }
    }

    /// The lower-cased pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, url: &str) -> bool {
        self.compiled.matches_with(&url.to_lowercase(), MATCH_OPTIONS)
    }
}

/// `**` has path-component semantics in `glob`; for URLs it means the same as `*`.
fn collapse_stars(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut prev_star = false;
    for c in pattern.chars() {
        if c == '*' && prev_star {
            continue;
        }
        prev_star = c == '*';
        out.push(c);
    }
    out
}

/// Ordered set of URL patterns; a URL matches if any pattern does.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<UrlPattern>,
}

impl PatternSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, pattern: &str) {
        self.patterns.push(UrlPattern::new(pattern));
    }

    pub fn extend<I, S>(&mut self, patterns: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for p in patterns {
            self.add(p.as_ref());
        }
    }

    /// An empty set matches nothing.
    pub fn matches(&self, url: &str) -> bool {
        let url = url.to_lowercase();
        self.patterns
            .iter()
            .any(|p| p.compiled.matches_with(&url, MATCH_OPTIONS))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(UrlPattern::as_str)
    }
}

#[cfg(test)]
#[path = "pattern_tests.rs"]
mod tests;
