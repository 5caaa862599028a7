//! The module contains the error the engine can throw.
//!
//! The errors the transfer coordinator cares about are:
//!
//! - [`KeyNotFound`] thrown when a referenced item does not exist.
//! - [`Conflict`] thrown when the database could not serialize concurrent
//!   transactions and the retry budget is exhausted.
//! - [`Database`] for every other storage failure.
//!
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Conflict`]: EngineError::Conflict
//!  [`Database`]: EngineError::Database
use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Insufficient funds: {0}")]
    InsufficientFunds(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Currency mismatch: {0}")]
    CurrencyMismatch(String),
    #[error("Transaction conflict: {0}")]
    Conflict(String),
    #[error("Deadline exceeded: {0}")]
    Timeout(String),
    #[error("Password error: {0}")]
    Password(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

/// Coarse classification used by the retry policy and by transports.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Invalid,
    Internal,
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::KeyNotFound(_) => ErrorKind::NotFound,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InsufficientFunds(_)
            | Self::ExistingKey(_)
            | Self::InvalidAmount(_)
            | Self::InvalidInput(_)
            | Self::CurrencyMismatch(_) => ErrorKind::Invalid,
            Self::Timeout(_) | Self::Password(_) => ErrorKind::Internal,
            Self::Database(err) if is_serialization_failure(err) => ErrorKind::Conflict,
            Self::Database(_) => ErrorKind::Internal,
        }
    }

    /// Map a constraint violation raised by an insert into a domain error,
    /// leaving every other database error untouched.
    pub(crate) fn from_insert(err: DbErr, what: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::ExistingKey(what.to_string()),
            Some(SqlErr::ForeignKeyConstraintViolation(_)) => {
                Self::KeyNotFound(format!("{what}: referenced row"))
            }
            _ => Self::Database(err),
        }
    }
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InsufficientFunds(a), Self::InsufficientFunds(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (Self::InvalidAmount(a), Self::InvalidAmount(b)) => a == b,
            (Self::InvalidInput(a), Self::InvalidInput(b)) => a == b,
            (Self::CurrencyMismatch(a), Self::CurrencyMismatch(b)) => a == b,
            (Self::Conflict(a), Self::Conflict(b)) => a == b,
            (Self::Timeout(a), Self::Timeout(b)) => a == b,
            (Self::Password(a), Self::Password(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

/// SQLSTATE / vendor codes meaning "the engine could not order these
/// transactions, run it again".
///
/// - Postgres: `40001` serialization_failure, `40P01` deadlock_detected.
/// - SQLite: `5` BUSY, `6` LOCKED, `517` BUSY_SNAPSHOT.
const RETRYABLE_CODES: &[&str] = &["40001", "40P01", "5", "6", "517"];

fn database_code(err: &DbErr) -> Option<String> {
    let runtime = match err {
        DbErr::Exec(runtime) | DbErr::Query(runtime) | DbErr::Conn(runtime) => runtime,
        _ => return None,
    };
    match runtime {
        RuntimeErr::SqlxError(sqlx_err) => sqlx_err
            .as_database_error()
            .and_then(|db_err| db_err.code())
            .map(|code| code.into_owned()),
        _ => None,
    }
}

/// Whether a database error is a transient serialization failure.
pub fn is_serialization_failure(err: &DbErr) -> bool {
    if let Some(code) = database_code(err) {
        return RETRYABLE_CODES.contains(&code.as_str());
    }
    // Errors that lost their driver code on the way up (e.g. commit
    // failures surfaced as plain strings).
    let lower = err.to_string().to_lowercase();
    lower.contains("could not serialize access")
        || lower.contains("deadlock detected")
        || lower.contains("database is locked")
        || lower.contains("database table is locked")
}
