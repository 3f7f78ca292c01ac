//! Database connectivity check.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::config::DatabaseParams;
use crate::error::{AppError, Result};
use crate::postgres::{ConnectionProber, ProbeError, ProbeOutcome};
use crate::server::AppState;

#[derive(Debug, Serialize)]
pub struct DbHealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

enum Verification {
    Healthy,
    Failed(AppError),
    Fatal(ProbeError),
}

/// `GET /db-health`
///
/// Opens a fresh connection with the `DB_*` environment as it is right now,
/// closes it again, and reports whether both steps worked. Transient
/// failures are retried inside the prober, so a slow-starting database makes
/// this request slow rather than failed.
///
/// A fatal connection error produces no response: the error is escalated and
/// the process shuts down while the request is still pending.
pub async fn db_health(State(state): State<AppState>) -> Result<Json<DbHealthResponse>> {
    let params = DatabaseParams::from_env();
    let prober = state.prober.clone();

    // Run on its own task so a client hanging up does not cut the probe short.
    let verification = tokio::spawn(async move { verify(&prober, &params).await })
        .await
        .map_err(|e| AppError::Internal(format!("Health probe task failed: {e}")))?;

    match verification {
        Verification::Healthy => Ok(Json(DbHealthResponse {
            status: "ok",
            message: "Database connection successful",
        })),
        Verification::Failed(err) => Err(err),
        Verification::Fatal(err) => {
            if !state.shutdown.escalate(err.to_string()) {
                tracing::error!("No shutdown listener registered, fatal error not escalated");
            }
            std::future::pending().await
        }
    }
}

async fn verify(prober: &ConnectionProber, params: &DatabaseParams) -> Verification {
    let conn = match prober.acquire_connection(params).await {
        Ok(ProbeOutcome::Connected(conn)) => conn,
        Ok(ProbeOutcome::Exhausted { .. }) => {
            return Verification::Failed(AppError::DatabaseUnavailable)
        }
        Err(err) => return Verification::Fatal(err),
    };

    match conn.close().await {
        Ok(()) => Verification::Healthy,
        Err(e) => Verification::Failed(AppError::VerificationFailed(e.to_string())),
    }
}
