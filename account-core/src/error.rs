//! Error types for account operations

use rust_decimal::Decimal;
use thiserror::Error;

/// Result type for account operations
pub type Result<T> = std::result::Result<T, Error>;

/// Account operation errors
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid argument (non-positive amount, empty name or identifier)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation on an account that was never created
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Duplicate account creation
    #[error("Account already exists: {0}")]
    AlreadyExists(String),

    /// Withdrawal exceeds the current balance; no entry created
    #[error("Insufficient funds: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Balance at the time of the request (unchanged)
        balance: Decimal,
        /// Requested withdrawal magnitude
        requested: Decimal,
    },

    /// Conditional write raced an out-of-band writer (retryable)
    #[error("Write conflict: {0}")]
    Conflict(String),

    /// Storage error (RocksDB)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    /// Concurrency error (actor mailbox or response channel closed)
    #[error("Concurrency error: {0}")]
    Mailbox(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rocksdb::Error> for Error {
    fn from(err: rocksdb::Error) -> Self {
        Error::Storage(err.to_string())
    }
}

impl Error {
    /// Whether the failed operation left no partial write and may be retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(_) | Error::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_funds_message() {
        let err = Error::InsufficientFunds {
            balance: Decimal::new(20000, 2),
            requested: Decimal::new(50000, 2),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: balance 200.00, requested 500.00"
        );
    }

    #[test]
    fn test_retryable_classification() {
        assert!(Error::Conflict("raced".to_string()).is_retryable());
        assert!(Error::Storage("down".to_string()).is_retryable());
        assert!(!Error::AlreadyExists("acct-1".to_string()).is_retryable());
        assert!(!Error::InvalidArgument("bad".to_string()).is_retryable());
    }
}
