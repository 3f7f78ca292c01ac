//! Database connector abstraction and its PostgreSQL implementation.

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::Connection;

use crate::config::DatabaseParams;

/// A single open database connection handed out by a [`Connector`].
///
/// The holder owns it exclusively and is expected to call [`close`] before
/// letting go of it.
///
/// [`close`]: DatabaseConnection::close
#[async_trait]
pub trait DatabaseConnection: Send {
    /// Terminate the connection, reporting any error raised while doing so.
    async fn close(self: Box<Self>) -> Result<(), sqlx::Error>;
}

/// Opens fresh, unpooled connections.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(
        &self,
        params: &DatabaseParams,
    ) -> Result<Box<dyn DatabaseConnection>, sqlx::Error>;
}

/// Connects to PostgreSQL with `sqlx`.
///
/// Only the parameters that are present are applied on top of
/// [`PgConnectOptions::new`], which falls back to the usual libpq
/// environment (`PGHOST`, `PGPORT`, ...) and defaults for the rest.
#[derive(Debug, Default, Clone)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }

    fn connect_options(params: &DatabaseParams) -> PgConnectOptions {
        let mut options = PgConnectOptions::new();
        if let Some(host) = &params.host {
            options = options.host(host);
        }
        if let Some(database) = &params.database {
            options = options.database(database);
        }
        if let Some(user) = &params.user {
            options = options.username(user);
        }
        if let Some(password) = &params.password {
            options = options.password(password);
        }
        options
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(
        &self,
        params: &DatabaseParams,
    ) -> Result<Box<dyn DatabaseConnection>, sqlx::Error> {
        let options = Self::connect_options(params);
        let conn = PgConnection::connect_with(&options).await?;

        tracing::debug!(
            host = params.host.as_deref().unwrap_or_default(),
            database = params.database.as_deref().unwrap_or_default(),
            "PostgreSQL connection opened"
        );

        Ok(Box::new(PgProbeConnection { inner: conn }))
    }
}

struct PgProbeConnection {
    inner: PgConnection,
}

#[async_trait]
impl DatabaseConnection for PgProbeConnection {
    async fn close(self: Box<Self>) -> Result<(), sqlx::Error> {
        self.inner.close().await?;
        tracing::debug!("PostgreSQL connection closed");
        Ok(())
    }
}
