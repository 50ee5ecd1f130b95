//! Path resolution for property controls.
//!
//! A control declares its identifier in one of two ways, chosen once per
//! control group by [`AddressingMode`]:
//!
//! - **Nested**: the identifier is a full dotted path such as `smtp.host`.
//!   Its segments describe where the value lands in a nested tree.
//! - **Flat**: the identifier is a bare name such as `priority`. The
//!   enclosing prefix (`rules.r1.`) is prepended to form the flat key
//!   `rules.r1.priority`; the result is never split again.

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Addressing convention used by a control group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressingMode {
    /// Dotted paths collected into a nested tree.
    #[default]
    Nested,
    /// Prefix + name keys collected into a flat map.
    Flat,
}

/// Join a prefix and a name with exactly one separator between them.
///
/// An empty prefix yields the name unchanged, and a prefix that already ends
/// with the separator is not doubled.
///
/// ```rust
/// use proptree::path::join;
///
/// assert_eq!(join("", "host"), "host");
/// assert_eq!(join("rules.r1", "priority"), "rules.r1.priority");
/// assert_eq!(join("rules.r1.", "priority"), "rules.r1.priority");
/// ```
pub fn join(prefix: &str, name: &str) -> String {
    let name = name.trim_start_matches(SEPARATOR);
    let prefix = prefix.trim_end_matches(SEPARATOR);
    if prefix.is_empty() {
        return name.to_string();
    }
    if name.is_empty() {
        return prefix.to_string();
    }
    format!("{prefix}{SEPARATOR}{name}")
}

/// Whether `name` can be used as a single path segment.
pub fn is_segment(name: &str) -> bool {
    !name.is_empty() && !name.contains(SEPARATOR)
}

/// Resolves declared control identifiers into canonical keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PathResolver {
    mode: AddressingMode,
}

impl PathResolver {
    /// Create a resolver for the given addressing mode.
    pub fn new(mode: AddressingMode) -> Self {
        Self { mode }
    }

    /// The addressing mode of this resolver.
    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    /// Resolve a declared identifier into its canonical key.
    ///
    /// In nested mode the declared path is already global and `prefix` is
    /// ignored. In flat mode the key is `prefix` joined with the name.
    pub fn resolve(&self, declared: &str, prefix: &str) -> String {
        match self.mode {
            AddressingMode::Nested => declared.to_string(),
            AddressingMode::Flat => join(prefix, declared),
        }
    }

    /// Segments of a resolved key, outermost first.
    ///
    /// Flat keys are a single segment: they are stored verbatim.
    pub fn segments<'a>(&self, key: &'a str) -> Vec<&'a str> {
        match self.mode {
            AddressingMode::Nested => key.split(SEPARATOR).collect(),
            AddressingMode::Flat => vec![key],
        }
    }

    /// Root a template-relative control path under a new item prefix.
    ///
    /// Only nested paths carry their prefix; flat names are left as-is since
    /// their prefix lives on the enclosing item.
    pub fn rebase(&self, declared: &str, item_prefix: &str) -> String {
        match self.mode {
            AddressingMode::Nested => join(item_prefix, declared),
            AddressingMode::Flat => declared.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_without_leading_separator() {
        assert_eq!(join("", "name"), "name");
        assert_eq!(join("", ".name"), "name");
        assert_eq!(join("top", ""), "top");
        assert_eq!(join("top.foo", ".host"), "top.foo.host");
    }

    #[test]
    fn test_flat_resolution() {
        let r = PathResolver::new(AddressingMode::Flat);
        assert_eq!(r.resolve("priority", "rules.r1."), "rules.r1.priority");
        assert_eq!(r.resolve("priority", ""), "priority");
        assert_eq!(r.segments("rules.r1.priority"), vec!["rules.r1.priority"]);
    }

    #[test]
    fn test_nested_resolution() {
        let r = PathResolver::new(AddressingMode::Nested);
        assert_eq!(r.resolve("a.b.c", "ignored"), "a.b.c");
        assert_eq!(r.segments("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(r.rebase("host", "top.foo"), "top.foo.host");
    }

    #[test]
    fn test_segment_names() {
        assert!(is_segment("rule1"));
        assert!(!is_segment("a.b"));
        assert!(!is_segment(""));
    }
}
