//! Graceful shutdown.
//!
//! The accept loop and every connection task hold a clone of the same
//! [`ShutdownSignal`]. Each accepted connection also holds a
//! [`ConnectionToken`], so the server can tell when the last one closes.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, Notify};

/// One-shot stop flag that can be awaited.
///
/// ```rust
/// use trellis_server::ShutdownSignal;
///
/// let signal = ShutdownSignal::new();
/// signal.clone().trigger();
/// assert!(signal.is_triggered());
/// ```
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    fired: Arc<AtomicBool>,
    wake: broadcast::Sender<()>,
}

impl ShutdownSignal {
    /// A signal that has not fired.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            wake: broadcast::channel(1).0,
        }
    }

    /// Fires the signal. Only the first call wakes waiters.
    pub fn trigger(&self) {
        if !self.fired.swap(true, Ordering::AcqRel) {
            // Nobody waiting yet.
            let _ = self.wake.send(());
        }
    }

    /// Whether [`trigger`](Self::trigger) has been called on any clone.
    #[must_use]
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Waits for the signal. Returns at once if it already fired.
    pub async fn recv(&self) {
        // Subscribe before checking the flag so a concurrent trigger is seen.
        let mut wake = self.wake.subscribe();
        if !self.is_triggered() {
            let _ = wake.recv().await;
        }
    }

    /// A signal fired by the process receiving SIGTERM or SIGINT, or
    /// Ctrl+C on platforms without Unix signals.
    ///
    /// Spawns a watcher task, so it needs a running Tokio runtime.
    #[must_use]
    pub fn from_os_signals() -> Self {
        let signal = Self::new();
        let watcher = signal.clone();
        tokio::spawn(async move {
            let name = os_stop_request().await;
            tracing::info!(signal = name, "stop requested, draining connections");
            watcher.trigger();
        });
        signal
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves with the name of whichever stop signal arrives first.
async fn os_stop_request() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let term = signal(SignalKind::terminate());
        let int = signal(SignalKind::interrupt());
        match (term, int) {
            (Ok(mut term), Ok(mut int)) => {
                return tokio::select! {
                    _ = term.recv() => "SIGTERM",
                    _ = int.recv() => "SIGINT",
                };
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "unix signal handlers unavailable, using ctrl_c");
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "cannot listen for ctrl_c; only an explicit trigger will stop the server");
        std::future::pending::<()>().await;
    }
    "ctrl_c"
}

/// Live count of open connections.
///
/// ```rust
/// use trellis_server::ConnectionTracker;
///
/// let tracker = ConnectionTracker::new();
/// let token = tracker.track();
/// assert_eq!(tracker.count(), 1);
/// drop(token);
/// assert_eq!(tracker.count(), 0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    shared: Arc<Counter>,
}

#[derive(Debug, Default)]
struct Counter {
    open: AtomicUsize,
    idle: Notify,
}

impl ConnectionTracker {
    /// A tracker with nothing open.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one more connection until the token is dropped.
    #[must_use]
    pub fn track(&self) -> ConnectionToken {
        self.shared.open.fetch_add(1, Ordering::AcqRel);
        ConnectionToken {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Connections currently open.
    #[must_use]
    pub fn count(&self) -> usize {
        self.shared.open.load(Ordering::Acquire)
    }

    /// Waits until the count reaches zero.
    pub async fn drained(&self) {
        loop {
            let idle = self.shared.idle.notified();
            if self.count() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Keeps one connection counted by its [`ConnectionTracker`].
#[derive(Debug)]
pub struct ConnectionToken {
    shared: Arc<Counter>,
}

impl Drop for ConnectionToken {
    fn drop(&mut self) {
        if self.shared.open.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.shared.idle.notify_waiters();
        }
    }
}
