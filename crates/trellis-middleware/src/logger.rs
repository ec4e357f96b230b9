//! Request logging middleware.
//!
//! Runs the rest of the chain, then emits one `info` event per request with
//! the method, URI, final status and handling time.

use std::time::Instant;

use http::StatusCode;
use tracing::info;
use trellis_core::Context;

/// Logs every request after the chain below it has completed.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger;

impl Logger {
    /// Creates the middleware.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Runs the chain and logs the outcome.
    pub fn handle(&self, ctx: &mut Context<'_>) {
        let start = Instant::now();
        ctx.next();

        let elapsed = start.elapsed();
        let status = ctx.status_code().unwrap_or(StatusCode::OK).as_u16();
        let uri = ctx.request().uri();
        info!(
            http.method = %ctx.method(),
            http.path = %uri,
            http.status_code = status,
            duration_ms = elapsed.as_secs_f64() * 1000.0,
            "[{}] {} in {:?}",
            status,
            uri,
            elapsed
        );
    }
}

/// Returns a [`Logger`] ready to pass to `use_middleware`.
pub fn logger() -> impl Fn(&mut Context<'_>) + Send + Sync + 'static {
    let logger = Logger::new();
    move |ctx| logger.handle(ctx)
}
