//! Per-method route table.
//!
//! This module provides [`Router`], which owns one segment trie per HTTP
//! method plus a flat `(method, pattern) -> handler` table.

use std::collections::HashMap;

use http::Method;

use crate::error::PatternError;
use crate::node::Node;
use crate::params::Params;
use crate::pattern::{parse_pattern, split_path, Pattern, Segment};

/// A successful lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a, H> {
    /// The registered pattern that matched.
    pub pattern: &'a str,
    /// Values captured from the request path.
    pub params: Params,
    /// The handler stored for the pattern.
    pub handler: &'a H,
}

/// A method-aware segment trie router, generic over the handler type.
///
/// # Example
///
/// ```rust
/// use trellis_router::Router;
/// use http::Method;
///
/// let mut router = Router::new();
/// router.add_route(Method::GET, "/hello/:name", "hello").unwrap();
/// router.add_route(Method::GET, "/assets/*filepath", "assets").unwrap();
///
/// let found = router.get_route(&Method::GET, "/hello/world").unwrap();
/// assert_eq!(*found.handler, "hello");
/// assert_eq!(found.params.get("name"), Some("world"));
///
/// let found = router.get_route(&Method::GET, "/assets").unwrap();
/// assert_eq!(found.params.get("filepath"), Some(""));
///
/// assert!(router.get_route(&Method::POST, "/hello/world").is_none());
/// ```
///
/// # Route Priority
///
/// At every level literal segments are tried first, then a parameter, then
/// a wildcard. When a more specific branch fails deeper down, the search
/// backs out and tries the next candidate, so `/a/b/c` still reaches
/// `/a/:x/c` when `/a/b/d` is also registered.
#[derive(Debug, Clone)]
pub struct Router<H> {
    roots: HashMap<Method, Node>,
    handlers: HashMap<Method, HashMap<String, H>>,
}

impl<H> Default for Router<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> Router<H> {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self {
            roots: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Registers `handler` for `method` and `pattern`.
    ///
    /// Registering the same method and pattern again replaces the handler.
    /// A pattern that ends on an existing terminal under different capture
    /// names (for example `/u/:name` after `/u/:id`) takes that terminal
    /// over, and the old pattern's handler is dropped.
    pub fn add_route(&mut self, method: Method, pattern: &str, handler: H) -> Result<(), PatternError> {
        let parsed = Pattern::parse(pattern)?;

        let root = self.roots.entry(method.clone()).or_default();
        let displaced = root.insert(parsed.as_str(), parsed.segments());

        let table = self.handlers.entry(method).or_default();
        if let Some(stale) = displaced {
            table.remove(&stale);
        }
        table.insert(parsed.as_str().to_string(), handler);
        Ok(())
    }

    /// Resolves a request path for `method`.
    #[must_use]
    pub fn get_route(&self, method: &Method, path: &str) -> Option<RouteMatch<'_, H>> {
        let parts = split_path(path);
        let node = self.roots.get(method)?.search(&parts)?;
        let pattern = node.pattern()?;
        let handler = self.handlers.get(method)?.get(pattern)?;

        Some(RouteMatch {
            pattern,
            params: bind_params(pattern, &parts),
            handler,
        })
    }

    /// Returns every terminal node registered for `method`, in pre-order.
    #[must_use]
    pub fn get_routes(&self, method: &Method) -> Vec<&Node> {
        self.roots
            .get(method)
            .map(|root| root.travel().collect())
            .unwrap_or_default()
    }

    /// Returns the methods that have at least one route.
    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.handlers
            .iter()
            .filter(|(_, table)| !table.is_empty())
            .map(|(method, _)| method)
    }

    /// Returns the number of registered (method, pattern) routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Pairs the segments of `pattern` with the request segments by position.
///
/// A `*name` segment takes the rest of the request joined with `/`, which is
/// empty when the request ends where the wildcard begins.
fn bind_params(pattern: &str, parts: &[&str]) -> Params {
    let mut params = Params::new();
    for (index, segment) in parse_pattern(pattern).iter().enumerate() {
        match segment {
            Segment::Literal(_) => {}
            Segment::Param(name) => {
                if let Some(value) = parts.get(index) {
                    params.push(name.as_str(), *value);
                }
            }
            Segment::Wildcard(name) => {
                let rest = parts.get(index..).unwrap_or_default();
                params.push(name.as_str(), rest.join("/"));
                break;
            }
        }
    }
    params
}
