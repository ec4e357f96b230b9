//! Route groups.
//!
//! A group is a path prefix plus the middleware registered on it. Groups
//! nest: a child's prefix is its parent's prefix followed by its own. All
//! groups live in one flat list on the [`Engine`], in creation order, and
//! every route they register goes into the engine's single router.
//!
//! Middleware is not copied into child groups. At request time every group
//! whose prefix starts the request path contributes its middleware, so a
//! child group's requests pick up the parent's middleware as well.

use http::Method;

use crate::engine::Engine;
use crate::error::RouteResult;
use crate::handler::{handler_fn, HandlerFunc};
use crate::context::Context;

/// Index of a group in its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GroupId(usize);

impl GroupId {
    /// The engine's root group, whose prefix is empty.
    pub const ROOT: Self = Self(0);

    pub(crate) const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the position of the group in registration order.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Stored state of one group.
pub(crate) struct GroupData {
    pub(crate) prefix: String,
    pub(crate) middlewares: Vec<HandlerFunc>,
    pub(crate) parent: Option<GroupId>,
}

impl GroupData {
    pub(crate) fn root() -> Self {
        Self {
            prefix: String::new(),
            middlewares: Vec::new(),
            parent: None,
        }
    }
}

impl std::fmt::Debug for GroupData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroupData")
            .field("prefix", &self.prefix)
            .field("middlewares", &self.middlewares.len())
            .field("parent", &self.parent)
            .finish()
    }
}

/// Registration handle for one group of an [`Engine`].
///
/// ```rust
/// use http::StatusCode;
/// use trellis_core::Engine;
///
/// let mut engine = Engine::new();
/// {
///     let mut v1 = engine.group("/v1");
///     v1.get("/hello", |ctx| ctx.string(StatusCode::OK, "v1"))?;
///
///     let mut admin = v1.group("/admin");
///     assert_eq!(admin.prefix(), "/v1/admin");
///     admin.post("/reset", |ctx| ctx.status(StatusCode::NO_CONTENT))?;
/// }
/// assert_eq!(engine.router().len(), 2);
/// # Ok::<(), trellis_core::RouteError>(())
/// ```
pub struct Group<'e> {
    engine: &'e mut Engine,
    id: GroupId,
}

impl<'e> Group<'e> {
    pub(crate) fn new(engine: &'e mut Engine, id: GroupId) -> Self {
        Self { engine, id }
    }

    /// Returns this group's id.
    #[must_use]
    pub fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the full prefix, including every ancestor's prefix.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.engine.group_data(self.id).prefix
    }

    /// Returns the group this one was created from.
    #[must_use]
    pub fn parent(&self) -> Option<GroupId> {
        self.engine.group_data(self.id).parent
    }

    /// Creates a nested group under this one.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let id = self.engine.push_group(prefix, self.id);
        Group::new(self.engine, id)
    }

    /// Appends a middleware to this group.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.engine
            .group_data_mut(self.id)
            .middlewares
            .push(handler_fn(middleware));
        self
    }

    /// Registers `handler` for `method` at this group's prefix followed by
    /// `pattern`.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        let full = format!("{}{}", self.prefix(), pattern);
        self.engine.register(method, &full, handler_fn(handler))?;
        Ok(self)
    }

    /// Registers a `GET` route.
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::GET, pattern, handler)
    }

    /// Registers a `POST` route.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::POST, pattern, handler)
    }

    /// Registers a `PUT` route.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::PUT, pattern, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, pattern, handler)
    }

    /// Registers a `DELETE` route.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// Registers a `HEAD` route.
    pub fn head<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::HEAD, pattern, handler)
    }

    /// Registers an `OPTIONS` route.
    pub fn options<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::OPTIONS, pattern, handler)
    }
}

impl std::fmt::Debug for Group<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Group")
            .field("id", &self.id)
            .field("prefix", &self.prefix())
            .finish_non_exhaustive()
    }
}
