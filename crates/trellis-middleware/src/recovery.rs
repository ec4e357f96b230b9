//! Panic recovery middleware.
//!
//! [`Recovery`] runs the rest of the chain inside
//! [`std::panic::catch_unwind`]. When a later handler panics, the panic is
//! logged at `error` level together with the backtrace captured at the
//! panic site, and the request is failed with
//! `500 {"message": "Internal Server Error"}`.
//!
//! The backtrace comes from a process-wide panic hook that is installed the
//! first time a [`Recovery`] is created. The hook runs for every panic in
//! the process, including threads no [`Recovery`] guards. It records a
//! backtrace for the panicking thread and then calls whichever hook was
//! installed before it, so existing panic reporting keeps working.
//!
//! Capture goes through [`Backtrace::capture`], so `RUST_BACKTRACE` (or
//! `RUST_LIB_BACKTRACE`) decides whether a panic pays for a stack walk.
//! With both unset the log carries a note instead of frames.

use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use http::StatusCode;
use tracing::error;
use trellis_core::Context;

/// Body message sent when a panic is recovered.
pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

static INSTALL_HOOK: Once = Once::new();

thread_local! {
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

fn install_hook() {
    INSTALL_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let trace = render_trace(&Backtrace::capture());
            PANIC_TRACE.with(|slot| *slot.borrow_mut() = Some(trace));
            previous(info);
        }));
    });
}

fn render_trace(trace: &Backtrace) -> String {
    match trace.status() {
        BacktraceStatus::Captured => trace.to_string(),
        _ => "<not captured; set RUST_BACKTRACE=1 to record frames>".to_string(),
    }
}

fn take_trace() -> Option<String> {
    PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Converts panics raised later in the chain into a 500 response.
///
/// Install it before any middleware whose panics should be contained,
/// usually first.
#[derive(Debug, Clone, Copy)]
pub struct Recovery {
    _private: (),
}

impl Default for Recovery {
    fn default() -> Self {
        Self::new()
    }
}

impl Recovery {
    /// Creates the middleware, installing the panic hook on first use.
    #[must_use]
    pub fn new() -> Self {
        install_hook();
        Self { _private: () }
    }

    /// Runs the chain, recovering from any panic inside it.
    pub fn handle(&self, ctx: &mut Context<'_>) {
        // Drop a trace left behind by a panic nobody caught.
        take_trace();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| ctx.next()));
        let Err(payload) = outcome else {
            return;
        };

        let message = panic_message(payload.as_ref());
        let trace = take_trace().unwrap_or_default();
        error!(
            error = %message,
            http.method = %ctx.method(),
            http.path = %ctx.path(),
            "recovered from panic: {}\nbacktrace:\n{}",
            message,
            trace
        );
        ctx.fail(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_SERVER_ERROR);
    }
}

/// Returns a [`Recovery`] ready to pass to `use_middleware`.
pub fn recovery() -> impl Fn(&mut Context<'_>) + Send + Sync + 'static {
    let recovery = Recovery::new();
    move |ctx| recovery.handle(ctx)
}
