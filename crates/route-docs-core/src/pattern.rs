//! Path patterns with `{name}` placeholders.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A parsed route path such as `/users/{id}/posts`.
///
/// Placeholders occupy a whole segment and are written `{ident}` where
/// `ident` is ASCII alphanumeric or `_`. Patterns compare case-sensitively.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PathPattern {
    raw: String,
    #[serde(skip)]
    segments: Vec<Segment>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Segment {
    Literal(String),
    Param(String),
}

impl PathPattern {
    /// Parse a pattern.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] when the pattern is empty, does not
    /// start with `/`, has empty segments, or contains a malformed or
    /// repeated placeholder.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| Error::InvalidPattern {
            pattern: raw.to_string(),
            reason: reason.to_string(),
        };

        if raw.is_empty() {
            return Err(invalid("pattern is empty"));
        }
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(invalid("pattern must start with '/'"));
        };
        if rest.is_empty() {
            return Ok(Self {
                raw: raw.to_string(),
                segments: Vec::new(),
            });
        }

        let mut segments = Vec::new();
        for part in rest.split('/') {
            if part.is_empty() {
                return Err(invalid("empty path segment"));
            }
            if !part.contains(['{', '}']) {
                segments.push(Segment::Literal(part.to_string()));
                continue;
            }
            let name = part
                .strip_prefix('{')
                .and_then(|p| p.strip_suffix('}'))
                .ok_or_else(|| invalid("placeholder must span a whole segment"))?;
            if name.is_empty() {
                return Err(invalid("placeholder name is empty"));
            }
            if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                return Err(invalid("placeholder name must be alphanumeric or '_'"));
            }
            if segments
                .iter()
                .any(|s| matches!(s, Segment::Param(existing) if existing == name))
            {
                return Err(invalid("placeholder name is repeated"));
            }
            segments.push(Segment::Param(name.to_string()));
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Placeholder names in path order.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Number of literal segments; more literals means a more specific route.
    #[must_use]
    pub fn specificity(&self) -> usize {
        self.segments
            .iter()
            .filter(|s| matches!(s, Segment::Literal(_)))
            .count()
    }

    /// Match a concrete request path, returning the captured placeholders.
    ///
    /// A single trailing `/` on the request path is ignored.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<BTreeMap<String, String>> {
        let rest = path.strip_prefix('/')?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let parts: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split('/').collect()
        };
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut captured = BTreeMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(lit) if lit == part => {}
                Segment::Param(name) if !part.is_empty() => {
                    captured.insert(name.clone(), part.to_string());
                }
                _ => return None,
            }
        }
        Some(captured)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl TryFrom<String> for PathPattern {
    type Error = Error;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<PathPattern> for String {
    fn from(pattern: PathPattern) -> Self {
        pattern.raw
    }
}
