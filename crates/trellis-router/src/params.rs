//! Values captured by `:name` and `*name` segments.

use std::fmt;

use smallvec::SmallVec;

/// Most patterns capture at most this many values; more spill to the heap.
const INLINE_CAPTURES: usize = 4;

/// One named value taken from a request path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capture {
    name: String,
    value: String,
}

impl Capture {
    /// The segment's capture name, without the `:` or `*`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The matched text. For a wildcard this is the remaining path joined
    /// with `/`, and may be empty.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Captures for one matched route, in pattern order.
///
/// ```rust
/// use trellis_router::Params;
///
/// let mut params = Params::new();
/// params.push("lang", "rust");
/// params.push("filepath", "css/a.css");
///
/// assert_eq!(params.get("lang"), Some("rust"));
/// assert_eq!(params.get("filepath"), Some("css/a.css"));
/// assert_eq!(params.to_string(), "lang=rust, filepath=css/a.css");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    captures: SmallVec<[Capture; INLINE_CAPTURES]>,
}

impl Params {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a capture. Pattern validation guarantees names are unique
    /// within a route.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.captures.push(Capture {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Looks up a capture by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.captures
            .iter()
            .find(|capture| capture.name == name)
            .map(Capture::value)
    }

    /// Returns true if `name` was captured, even with an empty value.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.captures.iter().any(|capture| capture.name == name)
    }

    /// Returns true if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.captures.is_empty()
    }

    /// Number of captures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.captures.len()
    }

    /// Iterates over `(name, value)` pairs in pattern order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.captures
            .iter()
            .map(|capture| (capture.name(), capture.value()))
    }
}

impl<'a> IntoIterator for &'a Params {
    type Item = &'a Capture;
    type IntoIter = std::slice::Iter<'a, Capture>;

    fn into_iter(self) -> Self::IntoIter {
        self.captures.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.push(name, value);
        }
        params
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.get("anything"), None);
        assert_eq!(params.to_string(), "");
    }

    #[test]
    fn test_pattern_order_is_kept() {
        let params: Params = [("org", "acme"), ("repo", "trellis"), ("path", "")]
            .into_iter()
            .collect();

        let names: Vec<_> = (&params).into_iter().map(Capture::name).collect();
        assert_eq!(names, ["org", "repo", "path"]);
    }

    #[test]
    fn test_empty_wildcard_value_is_captured() {
        let mut params = Params::new();
        params.push("filepath", "");

        assert!(params.contains("filepath"));
        assert_eq!(params.get("filepath"), Some(""));
        assert!(!params.contains("name"));
    }

    #[test]
    fn test_many_captures() {
        let params: Params = (0..10)
            .map(|i| (format!("p{i}"), format!("v{i}")))
            .collect();

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("p7"), Some("v7"));
        assert_eq!(params.iter().last(), Some(("p9", "v9")));
    }
}
