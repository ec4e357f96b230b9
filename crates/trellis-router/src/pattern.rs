//! Route pattern parsing.
//!
//! Patterns are `/`-separated. Empty segments are dropped, so `//a/b/` and
//! `/a/b` describe the same route. A segment beginning with `:` captures
//! exactly one path component; a segment beginning with `*` captures every
//! remaining component and is always the last segment.

use std::collections::HashSet;
use std::fmt;

use crate::error::PatternError;

/// The kind of a pattern segment.
///
/// The ordering is the matching precedence used by the trie: literal
/// children are tried before parameter children, which are tried before
/// wildcard children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SegmentKind {
    /// Matches one component with identical text.
    Literal,
    /// Matches any single component (`:name`).
    Param,
    /// Matches all remaining components (`*name`).
    Wildcard,
}

/// One `/`-delimited component of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Literal text, e.g. `users`.
    Literal(String),
    /// Named single-component capture, e.g. `:id`.
    Param(String),
    /// Named rest-of-path capture, e.g. `*filepath`.
    Wildcard(String),
}

impl Segment {
    /// Classifies a raw, non-empty pattern component.
    #[must_use]
    pub fn from_part(part: &str) -> Self {
        if let Some(name) = part.strip_prefix(':') {
            Self::Param(name.to_string())
        } else if let Some(name) = part.strip_prefix('*') {
            Self::Wildcard(name.to_string())
        } else {
            Self::Literal(part.to_string())
        }
    }

    /// Returns the segment kind.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        match self {
            Self::Literal(_) => SegmentKind::Literal,
            Self::Param(_) => SegmentKind::Param,
            Self::Wildcard(_) => SegmentKind::Wildcard,
        }
    }

    /// Returns the capture name for parameter and wildcard segments.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Param(name) | Self::Wildcard(name) => Some(name),
        }
    }

    /// Returns true for parameter and wildcard segments.
    #[must_use]
    pub fn is_wild(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.write_str(text),
            Self::Param(name) => write!(f, ":{name}"),
            Self::Wildcard(name) => write!(f, "*{name}"),
        }
    }
}

/// Splits a pattern into segments without validating it.
///
/// Parsing stops after the first wildcard segment; anything following it is
/// discarded.
///
/// ```
/// use trellis_router::{parse_pattern, Segment};
///
/// let segments = parse_pattern("/static/*filepath/ignored");
/// assert_eq!(
///     segments,
///     vec![
///         Segment::Literal("static".to_string()),
///         Segment::Wildcard("filepath".to_string()),
///     ]
/// );
/// ```
#[must_use]
pub fn parse_pattern(pattern: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    for part in pattern.split('/').filter(|s| !s.is_empty()) {
        let segment = Segment::from_part(part);
        let terminal = segment.kind() == SegmentKind::Wildcard;
        segments.push(segment);
        if terminal {
            break;
        }
    }
    segments
}

/// Splits a request path into its non-empty components.
///
/// Every component is literal text; a component such as `:id` in a request
/// path is not a capture.
#[must_use]
pub fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// A validated route pattern.
///
/// Unlike [`parse_pattern`], [`Pattern::parse`] rejects wildcards that are
/// not last, captures without a name, and capture names used twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// Parses and validates a pattern.
    ///
    /// ```
    /// use trellis_router::{Pattern, PatternError};
    ///
    /// assert!(Pattern::parse("/hello/:name").is_ok());
    /// assert!(matches!(
    ///     Pattern::parse("/files/*path/extra"),
    ///     Err(PatternError::WildcardNotLast { .. })
    /// ));
    /// ```
    pub fn parse(pattern: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        let mut names = HashSet::new();
        let mut parts = pattern.split('/').filter(|s| !s.is_empty()).peekable();

        while let Some(part) = parts.next() {
            let segment = Segment::from_part(part);

            if let Some(name) = segment.name() {
                if name.is_empty() {
                    return Err(PatternError::EmptyName {
                        pattern: pattern.to_string(),
                        segment: part.to_string(),
                    });
                }
                if !names.insert(name.to_string()) {
                    return Err(PatternError::DuplicateName {
                        pattern: pattern.to_string(),
                        name: name.to_string(),
                    });
                }
            }

            if segment.kind() == SegmentKind::Wildcard && parts.peek().is_some() {
                return Err(PatternError::WildcardNotLast {
                    pattern: pattern.to_string(),
                    segment: part.to_string(),
                });
            }

            segments.push(segment);
        }

        Ok(Self {
            raw: pattern.to_string(),
            segments,
        })
    }

    /// Returns the pattern exactly as registered.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the capture names in order of appearance.
    pub fn capture_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(Segment::name)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
