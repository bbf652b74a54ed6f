//! Wildcard name filters.

use glob::Pattern;

use crate::{Error, Result};

/// A set of shell-style wildcard patterns.
///
/// A name is selected when it matches any pattern. Names without
/// wildcard metacharacters match only themselves.
#[derive(Debug, Clone, Default)]
pub struct NameFilter {
    patterns: Vec<Pattern>,
}

impl NameFilter {
    /// Build a filter from wildcard patterns.
    pub fn patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| {
                let p = p.as_ref();
                Pattern::new(p).map_err(|e| Error::InvalidPattern {
                    pattern: p.to_owned(),
                    message: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    /// Build a filter that matches the given names literally.
    pub fn exact<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = names
            .into_iter()
            .filter_map(|name| Pattern::new(&Pattern::escape(name.as_ref())).ok())
            .collect();
        Self { patterns }
    }

    /// Returns true if `name` matches any pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(name))
    }

    /// Returns true if the filter has no patterns and therefore selects nothing.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// The source text of every pattern.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Pattern::as_str)
    }
}
