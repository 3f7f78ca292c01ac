//! PostgreSQL connectivity probing.
//!
//! Opens one fresh connection per probe; there is no pool.

mod classify;
mod connector;
mod probe;

pub use classify::{classify, classify_sqlstate, FailureKind};
pub use connector::{Connector, DatabaseConnection, PgConnector};
pub use probe::{ConnectionProber, ProbeError, ProbeOutcome};
