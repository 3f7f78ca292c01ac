//! Sorting connection failures into "not ready yet" and "broken".

use std::io;

/// How a failed connection attempt should be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server is not accepting connections yet; retry after a delay.
    Transient,
    /// Anything else; retrying will not help.
    Fatal,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Transient => "transient",
            FailureKind::Fatal => "fatal",
        }
    }
}

/// SQLSTATE codes a starting, stopping or saturated server answers with.
const TRANSIENT_SQLSTATES: &[&str] = &[
    "57P03", // cannot_connect_now: the database system is starting up
    "57P01", // admin_shutdown
    "53300", // too_many_connections
];

pub fn classify(err: &sqlx::Error) -> FailureKind {
    match err {
        sqlx::Error::Io(e) => classify_io(e),
        sqlx::Error::PoolTimedOut => FailureKind::Transient,
        sqlx::Error::Database(db) => match db.code() {
            Some(code) => classify_sqlstate(&code),
            None => FailureKind::Fatal,
        },
        _ => FailureKind::Fatal,
    }
}

pub fn classify_sqlstate(code: &str) -> FailureKind {
    if TRANSIENT_SQLSTATES.contains(&code) {
        FailureKind::Transient
    } else {
        FailureKind::Fatal
    }
}

/// Resolver messages for a host name that does not resolve (yet). sqlx
/// surfaces these as uncategorized I/O errors, so only the text identifies them.
const NAME_RESOLUTION_MARKERS: &[&str] = &[
    "failed to lookup address",
    "Name or service not known",
    "Temporary failure in name resolution",
    "nodename nor servname provided",
    "No such host is known",
];

fn classify_io(err: &io::Error) -> FailureKind {
    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted
        | io::ErrorKind::NotConnected
        | io::ErrorKind::AddrNotAvailable
        | io::ErrorKind::TimedOut
        | io::ErrorKind::UnexpectedEof
        | io::ErrorKind::BrokenPipe => FailureKind::Transient,
        _ if is_name_resolution_failure(err) => FailureKind::Transient,
        _ => FailureKind::Fatal,
    }
}

fn is_name_resolution_failure(err: &io::Error) -> bool {
    let message = err.to_string();
    NAME_RESOLUTION_MARKERS
        .iter()
        .any(|marker| message.contains(marker))
}
