//! Module for the error management
use crate::serde_helpers::DateFormat;
use rusqlite::ErrorCode;
use thiserror::Error;

/// An error that can occur when encoding, decoding or persisting GTFS data.
#[derive(Error, Debug)]
pub enum Error {
    /// The time is not given in the HH:MM:SS format
    #[error("'{0}' is not a valid time; HH:MM:SS format is expected.")]
    InvalidTime(String),
    /// The date does not match the expected format
    #[error("'{value}' is not a valid date; {format} format is expected.")]
    InvalidDate {
        /// The text that could not be parsed
        value: String,
        /// The format that was expected
        format: DateFormat,
    },
    /// A stored code has no matching enumeration case
    #[error("'{code}' is not a valid {kind}")]
    Decode {
        /// Name of the enumeration
        kind: &'static str,
        /// The unknown code, as text
        code: String,
    },
    /// A table could not be dropped or created
    #[error("impossible to create table '{table}'")]
    Schema {
        /// The table being created
        table: String,
        /// The initial error by the store
        #[source]
        source: rusqlite::Error,
    },
    /// NOT NULL, uniqueness or foreign key constraint failed
    #[error("constraint violation")]
    ConstraintViolation(#[source] rusqlite::Error),
    /// The table has no column with this name in the configured schema
    #[error("table '{table}' has no column '{column}'")]
    UnknownColumn {
        /// The queried table
        table: &'static str,
        /// The requested column
        column: String,
    },
    /// A maintenance operation requiring autocommit mode was called inside a transaction
    #[error("operation not allowed while a transaction is open")]
    TransactionInProgress,
    /// Any other failure of the underlying store
    #[error(transparent)]
    Store(rusqlite::Error),
}

impl Error {
    pub(crate) fn decode(kind: &'static str, code: impl ToString) -> Self {
        Error::Decode {
            kind,
            code: code.to_string(),
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(e: rusqlite::Error) -> Self {
        match e {
            // Decoding errors raised by our `FromSql` impls come back wrapped by rusqlite
            rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => {
                match source.downcast::<Error>() {
                    Ok(inner) => *inner,
                    Err(source) => {
                        Error::Store(rusqlite::Error::FromSqlConversionFailure(idx, ty, source))
                    }
                }
            }
            rusqlite::Error::SqliteFailure(ref failure, _)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                Error::ConstraintViolation(e)
            }
            e => Error::Store(e),
        }
    }
}
