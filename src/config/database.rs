//! Database connection parameters sourced from the process environment.

use std::fmt;

pub const DB_HOST: &str = "DB_HOST";
pub const DB_NAME: &str = "DB_NAME";
pub const DB_USER: &str = "DB_USER";
pub const DB_PASS: &str = "DB_PASS";

/// Connection parameters for a single probe.
///
/// Values are taken as-is: nothing is validated or defaulted here, an unset
/// variable stays `None` and is left for the driver to deal with.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct DatabaseParams {
    pub host: Option<String>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl DatabaseParams {
    /// Read `DB_HOST`, `DB_NAME`, `DB_USER` and `DB_PASS` from the current
    /// process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            host: lookup(DB_HOST),
            database: lookup(DB_NAME),
            user: lookup(DB_USER),
            password: lookup(DB_PASS),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for DatabaseParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseParams")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
