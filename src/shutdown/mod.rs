//! Process shutdown coordination.
//!
//! Two things end the server: an OS signal (graceful, exit 0) and an
//! escalation raised by a request handler that hit an unrecoverable
//! database error (abrupt, exit 1). In the latter case `main` tears the
//! server down and leaves restarting to whatever supervises the process.

use tokio::signal;
use tokio::sync::broadcast;

/// Why a handler asked for the process to go down.
#[derive(Debug, Clone)]
pub struct Escalation {
    pub reason: String,
}

/// Cloneable handle used by handlers to escalate and by `main` to listen.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: broadcast::Sender<Escalation>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Subscribe before serving so no escalation is missed.
    pub fn subscribe(&self) -> broadcast::Receiver<Escalation> {
        self.tx.subscribe()
    }

    /// Ask for process termination.
    ///
    /// Returns `false` if nobody is listening, in which case the caller is
    /// on its own.
    pub fn escalate(&self, reason: impl Into<String>) -> bool {
        let reason = reason.into();
        tracing::error!(reason = %reason, "Escalating fatal error to process shutdown");
        self.tx.send(Escalation { reason }).is_ok()
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_escalation_reaches_subscriber() {
        let handle = ShutdownHandle::new();
        let mut rx = handle.subscribe();

        assert!(handle.clone().escalate("auth failed"));

        let escalation = rx.recv().await.unwrap();
        assert_eq!(escalation.reason, "auth failed");
    }

    #[test]
    fn test_escalation_without_listener() {
        let handle = ShutdownHandle::default();
        assert!(!handle.escalate("nobody home"));
    }
}
