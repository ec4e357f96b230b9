//! Segment trie node.
//!
//! Every node stands for one pattern segment. A node whose `pattern` is set
//! terminates a registered route; intermediate nodes carry no pattern.
//! Children are kept ordered by [`SegmentKind`] so that a search tries
//! literal children first, then the parameter child, then the wildcard
//! child, backtracking when a branch dead-ends.

use std::fmt;

use crate::pattern::{Segment, SegmentKind};

/// A node in the per-method segment trie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    /// Raw segment text, e.g. `users`, `:id` or `*filepath`.
    part: String,

    /// Kind of segment this node matches.
    kind: SegmentKind,

    /// Full registered pattern, present only on route terminals.
    pattern: Option<String>,

    /// Children ordered literal, parameter, wildcard.
    children: Vec<Node>,
}

impl Node {
    /// Creates an empty root node.
    #[must_use]
    pub fn root() -> Self {
        Self {
            part: String::new(),
            kind: SegmentKind::Literal,
            pattern: None,
            children: Vec::new(),
        }
    }

    fn from_segment(segment: &Segment) -> Self {
        Self {
            part: segment.to_string(),
            kind: segment.kind(),
            pattern: None,
            children: Vec::new(),
        }
    }

    /// Returns the raw segment text.
    #[must_use]
    pub fn part(&self) -> &str {
        &self.part
    }

    /// Returns the segment kind.
    #[must_use]
    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Returns the registered pattern if this node terminates a route.
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Returns true if this node terminates a route.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.pattern.is_some()
    }

    /// Returns the children in match order.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Inserts `segments` below this node and marks the last node with
    /// `pattern`.
    ///
    /// Returns the pattern previously stored at that terminal when it
    /// differs from `pattern`, e.g. inserting `/u/:name` over `/u/:id`
    /// returns `Some("/u/:id")`.
    pub fn insert(&mut self, pattern: &str, segments: &[Segment]) -> Option<String> {
        let mut node = self;
        for segment in segments {
            let index = match node.reusable_child(segment) {
                Some(index) => index,
                None => node.push_child(Self::from_segment(segment)),
            };
            node = &mut node.children[index];
        }

        match node.pattern.replace(pattern.to_string()) {
            Some(previous) if previous != pattern => Some(previous),
            _ => None,
        }
    }

    /// Finds the child that an inserted segment should descend into.
    fn reusable_child(&self, segment: &Segment) -> Option<usize> {
        self.children.iter().position(|child| match segment {
            Segment::Literal(text) => child.kind == SegmentKind::Literal && child.part == *text,
            Segment::Param(_) => child.kind == SegmentKind::Param,
            Segment::Wildcard(_) => child.kind == SegmentKind::Wildcard,
        })
    }

    /// Places a child after every sibling of the same or lower precedence.
    fn push_child(&mut self, child: Self) -> usize {
        let index = self
            .children
            .iter()
            .position(|existing| existing.kind > child.kind)
            .unwrap_or(self.children.len());
        self.children.insert(index, child);
        index
    }

    /// Returns true if this node can consume the request segment `part`.
    fn accepts(&self, part: &str) -> bool {
        self.kind != SegmentKind::Literal || self.part == part
    }

    /// Searches for the terminal node matching the request segments.
    ///
    /// The first successful branch in child order wins.
    #[must_use]
    pub fn search(&self, parts: &[&str]) -> Option<&Self> {
        self.search_from(parts, 0)
    }

    fn search_from(&self, parts: &[&str], height: usize) -> Option<&Self> {
        if self.kind == SegmentKind::Wildcard && self.is_terminal() {
            return Some(self);
        }

        let Some(part) = parts.get(height) else {
            if self.is_terminal() {
                return Some(self);
            }
            // A trailing wildcard also matches nothing at all.
            return self
                .children
                .iter()
                .find(|child| child.kind == SegmentKind::Wildcard && child.is_terminal());
        };

        self.children
            .iter()
            .filter(|child| child.accepts(part))
            .find_map(|child| child.search_from(parts, height + 1))
    }

    /// Returns a pre-order iterator over every terminal node below and
    /// including this one.
    pub fn travel(&self) -> Travel<'_> {
        Travel { stack: vec![self] }
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            SegmentKind::Literal => "literal",
            SegmentKind::Param => "param",
            SegmentKind::Wildcard => "wildcard",
        };
        write!(
            f,
            "node{{pattern={}, part={}, kind={}}}",
            self.pattern.as_deref().unwrap_or(""),
            self.part,
            kind
        )
    }
}

/// Lazy pre-order walk over terminal nodes, created by [`Node::travel`].
#[derive(Debug)]
pub struct Travel<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Travel<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(node) = self.stack.pop() {
            self.stack.extend(node.children.iter().rev());
            if node.is_terminal() {
                return Some(node);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{parse_pattern, split_path};

    fn trie(patterns: &[&str]) -> Node {
        let mut root = Node::root();
        for pattern in patterns {
            root.insert(pattern, &parse_pattern(pattern));
        }
        root
    }

    fn find<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.search(&split_path(path)).and_then(Node::pattern)
    }

    #[test]
    fn test_root_pattern() {
        let root = trie(&["/"]);
        assert_eq!(find(&root, "/"), Some("/"));
        assert_eq!(find(&root, "/x"), None);
    }

    #[test]
    fn test_literal_match() {
        let root = trie(&["/users", "/users/list"]);
        assert_eq!(find(&root, "/users"), Some("/users"));
        assert_eq!(find(&root, "/users/list"), Some("/users/list"));
        assert_eq!(find(&root, "/users/other"), None);
    }

    #[test]
    fn test_intermediate_nodes_are_not_terminal() {
        let root = trie(&["/a/b/c"]);
        assert_eq!(find(&root, "/a"), None);
        assert_eq!(find(&root, "/a/b"), None);
        assert_eq!(find(&root, "/a/b/c"), Some("/a/b/c"));
    }

    #[test]
    fn test_param_match() {
        let root = trie(&["/hello/:name"]);
        assert_eq!(find(&root, "/hello/world"), Some("/hello/:name"));
        assert_eq!(find(&root, "/hello"), None);
        assert_eq!(find(&root, "/hello/a/b"), None);
    }

    #[test]
    fn test_literal_preferred_over_param() {
        let root = trie(&["/hello/:name", "/hello/me"]);
        assert_eq!(find(&root, "/hello/me"), Some("/hello/me"));
        assert_eq!(find(&root, "/hello/you"), Some("/hello/:name"));
    }

    #[test]
    fn test_children_ordered_by_precedence() {
        let root = trie(&["/x/*rest", "/x/:id", "/x/b", "/x/a"]);
        let kinds: Vec<_> = root.children()[0]
            .children()
            .iter()
            .map(|c| (c.kind(), c.part().to_string()))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (SegmentKind::Literal, "b".to_string()),
                (SegmentKind::Literal, "a".to_string()),
                (SegmentKind::Param, ":id".to_string()),
                (SegmentKind::Wildcard, "*rest".to_string()),
            ]
        );
    }

    #[test]
    fn test_backtracks_out_of_literal_branch() {
        let root = trie(&["/a/b/d", "/a/:x/c"]);
        assert_eq!(find(&root, "/a/b/c"), Some("/a/:x/c"));
        assert_eq!(find(&root, "/a/b/d"), Some("/a/b/d"));
    }

    #[test]
    fn test_wildcard_consumes_remaining() {
        let root = trie(&["/assets/*filepath"]);
        assert_eq!(find(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets/x"), Some("/assets/*filepath"));
    }

    #[test]
    fn test_wildcard_matches_empty_remainder() {
        let root = trie(&["/assets/*filepath"]);
        assert_eq!(find(&root, "/assets"), Some("/assets/*filepath"));
        assert_eq!(find(&root, "/assets/"), Some("/assets/*filepath"));
    }

    #[test]
    fn test_terminal_preferred_over_empty_wildcard() {
        let root = trie(&["/assets", "/assets/*filepath"]);
        assert_eq!(find(&root, "/assets"), Some("/assets"));
    }

    #[test]
    fn test_request_markers_are_literal_text() {
        let root = trie(&["/a/b"]);
        assert_eq!(find(&root, "/a/:b"), None);
        assert_eq!(find(&root, "/:a/b"), None);
    }

    #[test]
    fn test_insert_reuses_param_child() {
        let mut root = trie(&["/u/:id/posts"]);
        let displaced = root.insert("/u/:name", &parse_pattern("/u/:name"));
        assert_eq!(displaced, None);
        assert_eq!(root.children()[0].children().len(), 1);
    }

    #[test]
    fn test_insert_returns_displaced_pattern() {
        let mut root = trie(&["/u/:id"]);
        let displaced = root.insert("/u/:name", &parse_pattern("/u/:name"));
        assert_eq!(displaced.as_deref(), Some("/u/:id"));
        assert_eq!(find(&root, "/u/7"), Some("/u/:name"));

        assert_eq!(root.insert("/u/:name", &parse_pattern("/u/:name")), None);
    }

    #[test]
    fn test_literal_never_reuses_param_node() {
        let root = trie(&["/:lang/doc", "/p/intro"]);
        assert_eq!(find(&root, "/p/intro"), Some("/p/intro"));
        assert_eq!(find(&root, "/p/doc"), Some("/:lang/doc"));
    }

    #[test]
    fn test_travel_lists_terminals_in_preorder() {
        let root = trie(&["/", "/a/:b", "/a/c", "/d/*e"]);
        let patterns: Vec<_> = root.travel().filter_map(Node::pattern).collect();
        assert_eq!(patterns, vec!["/", "/a/c", "/a/:b", "/d/*e"]);

        // Each call walks the trie afresh.
        assert_eq!(root.travel().count(), 4);
        assert_eq!(root.travel().count(), 4);
    }

    #[test]
    fn test_display() {
        let root = trie(&["/p/:lang"]);
        let node = &root.children()[0].children()[0];
        assert_eq!(node.to_string(), "node{pattern=/p/:lang, part=:lang, kind=param}");
    }
}
