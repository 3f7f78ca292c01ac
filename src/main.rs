use std::future::IntoFuture;

use anyhow::{anyhow, Result};
use tokio::net::TcpListener;

use news_api::config::Settings;
use news_api::server::{create_app, AppState};
use news_api::shutdown::shutdown_signal;
use news_api::telemetry::init_telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let settings = Settings::new()?;

    // Initialize tracing
    let _telemetry = init_telemetry(&settings.otel)?;
    tracing::info!(
        max_attempts = settings.probe.max_attempts,
        retry_delay_seconds = settings.probe.retry_delay_seconds,
        "Configuration loaded"
    );

    // Create application state
    let state = AppState::new(&settings);
    let mut escalations = state.shutdown.subscribe();

    // Create Axum app
    let app = create_app(state);

    // Start server
    let addr = settings.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .into_future();

    tokio::select! {
        result = server => {
            result?;
            tracing::info!("Server shutdown complete");
            Ok(())
        }
        escalation = escalations.recv() => {
            // Returning from main shuts the runtime down, which tears down
            // the spawned connection tasks, including the one that escalated.
            let reason = match escalation {
                Ok(escalation) => escalation.reason,
                Err(e) => format!("escalation channel failed: {e}"),
            };
            tracing::error!(reason = %reason, "Fatal database error, terminating process");
            Err(anyhow!("fatal database error: {reason}"))
        }
    }
}
