//! Connection prober with a fixed retry budget.
//!
//! A service container routinely comes up before its database accepts
//! connections. The prober absorbs that window by retrying "not ready"
//! failures a bounded number of times, and gives up immediately on anything
//! else so the process can be restarted.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::classify::{classify, FailureKind};
use super::connector::{Connector, DatabaseConnection};
use crate::config::{DatabaseParams, ProbeConfig};

/// Result of a probe that did not hit a fatal error.
pub enum ProbeOutcome {
    /// A live connection; the caller owns it and must close it.
    Connected(Box<dyn DatabaseConnection>),
    /// Every attempt failed with a transient error.
    Exhausted { attempts: u32 },
}

impl fmt::Debug for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Connected(_) => f.write_str("Connected"),
            ProbeOutcome::Exhausted { attempts } => {
                f.debug_struct("Exhausted").field("attempts", attempts).finish()
            }
        }
    }
}

/// A connection failure that retrying cannot fix.
///
/// Callers are expected to escalate this to a process restart.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Unexpected connection error: {0}")]
    Fatal(String),
}

#[derive(Debug)]
enum AttemptError {
    Transient(String),
    Fatal(String),
}

pub struct ConnectionProber {
    connector: Arc<dyn Connector>,
    config: ProbeConfig,
}

impl ConnectionProber {
    pub fn new(connector: Arc<dyn Connector>, config: ProbeConfig) -> Self {
        Self { connector, config }
    }

    /// Try to open a connection, retrying transient failures.
    ///
    /// Returns as soon as one attempt succeeds. After each transient failure
    /// the budget is decremented and, if anything is left, the task sleeps
    /// for `retry_delay_seconds`. A fatal failure ends the probe at once.
    #[tracing::instrument(name = "acquire_connection", skip(self, params), fields(host = ?params.host, database = ?params.database))]
    pub async fn acquire_connection(
        &self,
        params: &DatabaseParams,
    ) -> Result<ProbeOutcome, ProbeError> {
        let mut retries = self.config.max_attempts;

        while retries > 0 {
            match self.attempt(params).await {
                Ok(conn) => return Ok(ProbeOutcome::Connected(conn)),
                Err(AttemptError::Transient(detail)) => {
                    retries -= 1;
                    tracing::warn!(
                        kind = FailureKind::Transient.as_str(),
                        attempts_left = retries,
                        error = %detail,
                        "Database not ready, retrying"
                    );
                    if retries > 0 {
                        tokio::time::sleep(self.config.retry_delay()).await;
                    }
                }
                Err(AttemptError::Fatal(detail)) => {
                    tracing::error!(
                        kind = FailureKind::Fatal.as_str(),
                        error = %detail,
                        "Unexpected connection error"
                    );
                    return Err(ProbeError::Fatal(detail));
                }
            }
        }

        tracing::error!(
            attempts = self.config.max_attempts,
            "Could not connect to database after all retries"
        );
        Ok(ProbeOutcome::Exhausted {
            attempts: self.config.max_attempts,
        })
    }

    async fn attempt(
        &self,
        params: &DatabaseParams,
    ) -> Result<Box<dyn DatabaseConnection>, AttemptError> {
        let timeout = self.config.connect_timeout();
        let result = if timeout.is_zero() {
            self.connector.connect(params).await
        } else {
            match tokio::time::timeout(timeout, self.connector.connect(params)).await {
                Ok(result) => result,
                Err(_) => return Err(AttemptError::Transient(timed_out(timeout))),
            }
        };

        result.map_err(|e| match classify(&e) {
            FailureKind::Transient => AttemptError::Transient(e.to_string()),
            FailureKind::Fatal => AttemptError::Fatal(e.to_string()),
        })
    }
}

fn timed_out(timeout: Duration) -> String {
    format!("connection attempt timed out after {}s", timeout.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::io;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::Instant;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Accept,
        Refuse,
        Reject,
        Hang,
    }

    struct ScriptedConnector {
        steps: Mutex<VecDeque<Step>>,
        attempts: AtomicU32,
    }

    impl ScriptedConnector {
        fn new(steps: &[Step]) -> Arc<Self> {
            Arc::new(Self {
                steps: Mutex::new(steps.iter().copied().collect()),
                attempts: AtomicU32::new(0),
            })
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    struct NoopConnection;

    #[async_trait]
    impl DatabaseConnection for NoopConnection {
        async fn close(self: Box<Self>) -> Result<(), sqlx::Error> {
            Ok(())
        }
    }

    #[async_trait]
    impl Connector for ScriptedConnector {
        async fn connect(
            &self,
            _params: &DatabaseParams,
        ) -> Result<Box<dyn DatabaseConnection>, sqlx::Error> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            let step = self.steps.lock().unwrap().pop_front().unwrap_or(Step::Refuse);
            match step {
                Step::Accept => Ok(Box::new(NoopConnection)),
                Step::Refuse => Err(sqlx::Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionRefused,
                    "connection refused",
                ))),
                Step::Reject => Err(sqlx::Error::Configuration("invalid port".into())),
                Step::Hang => std::future::pending().await,
            }
        }
    }

    fn prober(connector: Arc<ScriptedConnector>) -> ConnectionProber {
        ConnectionProber::new(connector, ProbeConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success_uses_one_attempt() {
        let connector = ScriptedConnector::new(&[Step::Accept]);
        let start = Instant::now();

        let outcome = prober(connector.clone())
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Connected(_)));
        assert_eq!(connector.attempts(), 1);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_then_success() {
        let connector =
            ScriptedConnector::new(&[Step::Refuse, Step::Refuse, Step::Refuse, Step::Accept]);
        let start = Instant::now();

        let outcome = prober(connector.clone())
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Connected(_)));
        assert_eq!(connector.attempts(), 4);
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_after_five_attempts() {
        let connector = ScriptedConnector::new(&[Step::Refuse; 5]);
        let start = Instant::now();

        let outcome = prober(connector.clone())
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Exhausted { attempts: 5 }));
        assert_eq!(connector.attempts(), 5);
        // no sleep after the final attempt
        assert!(start.elapsed() >= Duration::from_secs(20));
        assert!(start.elapsed() < Duration::from_secs(25));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_stops_immediately() {
        let connector = ScriptedConnector::new(&[Step::Refuse, Step::Reject, Step::Accept]);

        let err = prober(connector.clone())
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProbeError::Fatal(_)));
        assert!(err.to_string().contains("invalid port"));
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_attempt_times_out_as_transient() {
        let connector = ScriptedConnector::new(&[Step::Hang, Step::Accept]);
        let start = Instant::now();

        let outcome = prober(connector.clone())
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Connected(_)));
        assert_eq!(connector.attempts(), 2);
        // 10s connect timeout plus 5s retry delay
        assert!(start.elapsed() >= Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_budget() {
        let connector = ScriptedConnector::new(&[]);
        let config = ProbeConfig {
            max_attempts: 2,
            retry_delay_seconds: 1,
            connect_timeout_seconds: 0,
        };

        let outcome = ConnectionProber::new(connector.clone(), config)
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Exhausted { attempts: 2 }));
        assert_eq!(connector.attempts(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_budget_never_connects() {
        let connector = ScriptedConnector::new(&[Step::Accept]);
        let config = ProbeConfig {
            max_attempts: 0,
            ..ProbeConfig::default()
        };

        let outcome = ConnectionProber::new(connector.clone(), config)
            .acquire_connection(&DatabaseParams::default())
            .await
            .unwrap();

        assert!(matches!(outcome, ProbeOutcome::Exhausted { attempts: 0 }));
        assert_eq!(connector.attempts(), 0);
    }
}
