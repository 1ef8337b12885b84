use std::path::PathBuf;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Input rejected at the form boundary. Never persisted.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ValidationError {
    #[error("category cannot be empty")]
    EmptyCategory,

    #[error("category is {len} characters long, the limit is {max}")]
    CategoryTooLong { len: usize, max: usize },

    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(Decimal),

    #[error("amount {amount} is larger than the limit of {max}")]
    AmountTooLarge { amount: Decimal, max: Decimal },

    #[error("'{0}' is not a valid amount")]
    InvalidAmount(String),

    #[error("type must be 'Income' or 'Expense', got '{0}'")]
    UnknownType(String),

    #[error("'{0}' is not a valid date, expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("{0} is in the future")]
    FutureDate(NaiveDate),

    #[error("start date {start} is after end date {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
}

/// The backing file could not be read, written or understood.
#[derive(Debug, Error)]
pub(crate) enum StorageError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("missing '{0}' column in header")]
    MissingColumn(&'static str),

    #[error("line {line}: {reason}")]
    Corrupt { line: u64, reason: String },
}

impl StorageError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Why adding a record failed.
#[derive(Debug, Error)]
pub(crate) enum AppendError {
    #[error("invalid transaction: {0}")]
    Validation(#[from] ValidationError),

    #[error("could not save transaction: {0}")]
    Storage(#[from] StorageError),
}
