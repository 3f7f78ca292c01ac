use std::sync::Arc;

use crate::config::Settings;
use crate::postgres::{ConnectionProber, Connector, PgConnector};
use crate::shutdown::ShutdownHandle;

#[derive(Clone)]
pub struct AppState {
    pub prober: Arc<ConnectionProber>,
    pub shutdown: ShutdownHandle,
}

impl AppState {
    pub fn new(settings: &Settings) -> Self {
        Self::with_connector(settings, Arc::new(PgConnector::new()))
    }

    /// Build state around a custom connector, e.g. a scripted one in tests.
    pub fn with_connector(settings: &Settings, connector: Arc<dyn Connector>) -> Self {
        let prober = Arc::new(ConnectionProber::new(connector, settings.probe.clone()));

        Self {
            prober,
            shutdown: ShutdownHandle::new(),
        }
    }
}
