//! Segment trie router for Trellis.
//!
//! Patterns are split on `/` into literal, parameter and wildcard segments
//! and stored in one trie per HTTP method. Lookup is a backtracking
//! depth-first search that prefers literal children, then parameters, then
//! wildcards.
//!
//! # Pattern syntax
//!
//! - `users` matches the component `users` exactly
//! - `:name` matches any single component and captures it as `name`
//! - `*name` matches all remaining components, joined by `/`, possibly
//!   empty; it must be the last segment
//!
//! # Example
//!
//! ```rust
//! use trellis_router::Router;
//! use http::Method;
//!
//! let mut router = Router::new();
//! router.add_route(Method::GET, "/", "index").unwrap();
//! router.add_route(Method::GET, "/p/:lang/doc", "doc").unwrap();
//! router.add_route(Method::GET, "/static/*filepath", "static").unwrap();
//!
//! let found = router.get_route(&Method::GET, "/p/rust/doc").unwrap();
//! assert_eq!(found.pattern, "/p/:lang/doc");
//! assert_eq!(found.params.get("lang"), Some("rust"));
//! ```
//!
//! # Architecture
//!
//! ```text
//!                 (root, GET)
//!                      │
//!              ┌───────┴────────┐
//!              │                │
//!             "p"           "static"
//!              │                │
//!           ":lang"        "*filepath"
//!              │          [/static/*filepath]
//!            "doc"
//!      [/p/:lang/doc]
//! ```

mod error;
mod node;
mod params;
mod pattern;
mod router;

pub use error::PatternError;
pub use node::{Node, Travel};
pub use params::{Capture, Params};
pub use pattern::{parse_pattern, split_path, Pattern, Segment, SegmentKind};
pub use router::{RouteMatch, Router};
