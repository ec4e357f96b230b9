//! Engine: route registration and request dispatch.
//!
//! [`Engine`] is the mutable builder. Routes, groups and middleware can
//! only be added to it. [`Engine::seal`] consumes the builder and returns a
//! [`SealedEngine`], which is immutable, `Send + Sync`, and only resolves
//! and dispatches requests.

use std::borrow::Cow;
use std::sync::Arc;

use bytes::Bytes;
use http::{Method, Request, StatusCode};
use percent_encoding::percent_decode_str;
use tracing::{debug, info};
use trellis_router::{Params, Router};

use crate::context::Context;
use crate::error::RouteResult;
use crate::group::{Group, GroupData, GroupId};
use crate::handler::{handler_fn, HandlerFunc};
use crate::response::ResponseWriter;

/// Route table under construction.
///
/// The engine owns a root group with an empty prefix; its verb helpers,
/// [`Engine::use_middleware`] and [`Engine::group`] act on that group.
///
/// ```rust
/// use http::StatusCode;
/// use trellis_core::Engine;
///
/// let mut engine = Engine::new();
/// engine
///     .get("/", |ctx| ctx.html(StatusCode::OK, "<h1>Hello</h1>"))?
///     .get("/hello/:name", |ctx| {
///         let name = ctx.param("name").unwrap_or_default().to_string();
///         ctx.string(StatusCode::OK, format!("hello {name}"));
///     })?;
///
/// let engine = engine.seal();
/// assert!(engine.resolve(&http::Method::GET, "/hello/you").pattern.is_some());
/// # Ok::<(), trellis_core::RouteError>(())
/// ```
pub struct Engine {
    router: Router<HandlerFunc>,
    groups: Vec<GroupData>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Creates an engine with no routes and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self {
            router: Router::new(),
            groups: vec![GroupData::root()],
        }
    }

    /// Returns a handle to the root group.
    pub fn root(&mut self) -> Group<'_> {
        Group::new(self, GroupId::ROOT)
    }

    /// Creates a group directly under the root.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        let id = self.push_group(prefix, GroupId::ROOT);
        Group::new(self, id)
    }

    /// Appends a middleware that applies to every request.
    pub fn use_middleware<F>(&mut self, middleware: F) -> &mut Self
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.root().use_middleware(middleware);
        self
    }

    /// Registers `handler` for `method` and `pattern`.
    pub fn add_route<F>(&mut self, method: Method, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.root().add_route(method, pattern, handler)?;
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

    /// Registers a `DELETE` route.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::DELETE, pattern, handler)
    }

    /// Registers a `PATCH` route.
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> RouteResult<&mut Self>
    where
        F: Fn(&mut Context<'_>) + Send + Sync + 'static,
    {
        self.add_route(Method::PATCH, pattern, handler)
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

    /// Returns the router built so far.
    #[must_use]
    pub fn router(&self) -> &Router<HandlerFunc> {
        &self.router
    }

    /// Returns the number of groups, including the root.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Finishes registration.
    #[must_use]
    pub fn seal(self) -> SealedEngine {
        info!(
            routes = self.router.len(),
            groups = self.groups.len(),
            "engine sealed"
        );
        SealedEngine {
            router: self.router,
            groups: self.groups,
            not_found: handler_fn(not_found),
        }
    }

    pub(crate) fn push_group(&mut self, prefix: &str, parent: GroupId) -> GroupId {
        let prefix = format!("{}{}", self.group_data(parent).prefix, prefix);
        self.groups.push(GroupData {
            prefix,
            middlewares: Vec::new(),
            parent: Some(parent),
        });
        GroupId::new(self.groups.len() - 1)
    }

    pub(crate) fn group_data(&self, id: GroupId) -> &GroupData {
        &self.groups[id.index()]
    }

    pub(crate) fn group_data_mut(&mut self, id: GroupId) -> &mut GroupData {
        &mut self.groups[id.index()]
    }

    pub(crate) fn register(&mut self, method: Method, pattern: &str, handler: HandlerFunc) -> RouteResult<()> {
        let label = method.clone();
        self.router.add_route(method, pattern, handler)?;
        info!("Route {:>4} - {}", label.as_str(), pattern);
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("routes", &self.router.len())
            .field("groups", &self.groups)
            .finish()
    }
}

/// The handler chain resolved for one request.
pub struct Resolution {
    /// Middleware of every matching group, then the endpoint or the
    /// not-found handler.
    pub handlers: Vec<HandlerFunc>,
    /// Values captured from the path.
    pub params: Params,
    /// The matched pattern, `None` when no route matched.
    pub pattern: Option<String>,
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolution")
            .field("handlers", &self.handlers.len())
            .field("params", &self.params)
            .field("pattern", &self.pattern)
            .finish()
    }
}

/// Read-only engine produced by [`Engine::seal`].
pub struct SealedEngine {
    router: Router<HandlerFunc>,
    groups: Vec<GroupData>,
    not_found: HandlerFunc,
}

impl SealedEngine {
    /// Builds the handler chain for `method` and `path`.
    ///
    /// Middleware comes from every group whose prefix is a string prefix of
    /// `path`, in group creation order.
    #[must_use]
    pub fn resolve(&self, method: &Method, path: &str) -> Resolution {
        let mut handlers: Vec<HandlerFunc> = self
            .groups
            .iter()
            .filter(|group| path.starts_with(group.prefix.as_str()))
            .flat_map(|group| group.middlewares.iter().cloned())
            .collect();

        match self.router.get_route(method, path) {
            Some(found) => {
                handlers.push(Arc::clone(found.handler));
                Resolution {
                    handlers,
                    params: found.params,
                    pattern: Some(found.pattern.to_string()),
                }
            }
            None => {
                debug!(method = %method, path, "no route matched");
                handlers.push(Arc::clone(&self.not_found));
                Resolution {
                    handlers,
                    params: Params::new(),
                    pattern: None,
                }
            }
        }
    }

    /// Resolves `request` and runs its chain, writing into `writer`.
    ///
    /// The URI path is percent-decoded first, so routing, captured values
    /// and [`Context::path`] all see `/hello/Jürgen` for
    /// `/hello/J%C3%BCrgen`. Escapes that do not form UTF-8 become U+FFFD.
    ///
    /// A panic raised by a handler propagates out of this call unless a
    /// recovery middleware earlier in the chain catches it.
    pub fn dispatch(&self, request: &Request<Bytes>, writer: &mut dyn ResponseWriter) {
        let path = decode_path(request.uri().path());
        let Resolution { handlers, params, .. } = self.resolve(request.method(), &path);
        Context::new(request, writer, params, handlers)
            .with_path(&path)
            .next();
    }

    /// Returns the router.
    #[must_use]
    pub fn router(&self) -> &Router<HandlerFunc> {
        &self.router
    }
}

impl std::fmt::Debug for SealedEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SealedEngine")
            .field("routes", &self.router.len())
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}

fn decode_path(raw: &str) -> Cow<'_, str> {
    percent_decode_str(raw).decode_utf8_lossy()
}

fn not_found(ctx: &mut Context<'_>) {
    let body = format!("404 NOT FOUND: {}", ctx.path());
    ctx.string(StatusCode::NOT_FOUND, body);
}
