//! Error types for the ledger server
//!
//! This module defines all error types that can occur while accepting,
//! queueing, and executing requests.
//!
//! # Error Categories
//!
//! - **Rejected Input**: malformed request or out-of-range account. Reported to
//!   the operator; the request never gets an id and is never logged.
//! - **Store Errors**: the account store cannot be created. Fatal at startup.
//! - **File Errors**: I/O and CSV failures on the log or balance files.
//! - **Internal Errors**: queue misuse after shutdown, panicked workers.
//!
//! Insufficient funds is deliberately absent: an aborted transfer is a normal
//! outcome (see [`Outcome`](super::Outcome)), not an error.

use thiserror::Error;

use super::account::{AccountId, Balance};

/// Main error type for the ledger server
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// First token is not a recognized request keyword
    #[error("unknown command '{command}'")]
    UnknownCommand {
        /// The unrecognized keyword
        command: String,
    },

    /// `CHECK` without an account
    #[error("CHECK requires an account id")]
    MissingAccount,

    /// A token that should be an integer is not one
    #[error("'{token}' is not a valid number")]
    InvalidNumber {
        /// The offending token
        token: String,
    },

    /// Account id outside `1..=num_accounts`
    #[error("account {account} is out of range (valid: 1-{num_accounts})")]
    AccountOutOfRange {
        /// The requested account
        account: i64,
        /// Configured number of accounts
        num_accounts: u32,
    },

    /// Trailing token after a complete request
    #[error("unexpected token '{token}'")]
    UnexpectedToken {
        /// The first surplus token
        token: String,
    },

    /// `TRANS` with an account lacking its amount
    #[error("TRANS requires account/amount pairs")]
    UnpairedOperand,

    /// `TRANS` with no pairs at all
    #[error("TRANS requires at least one account/amount pair")]
    EmptyTransfer,

    /// More pairs than allowed under the reject policy
    #[error("TRANS accepts at most {max} account/amount pairs, got {pairs}")]
    TooManyOperands {
        /// Pairs supplied
        pairs: usize,
        /// Configured maximum
        max: usize,
    },

    /// Summed deltas of a repeated account overflow
    #[error("combined amount for account {account} overflows")]
    AmountOverflow {
        /// Account whose deltas were being summed
        account: AccountId,
    },

    /// The account store could not be created
    ///
    /// This is a fatal error that prevents the server from starting.
    #[error("account store unavailable: {reason}")]
    StoreUnavailable {
        /// Why initialization failed
        reason: String,
    },

    /// I/O error on the request log or a balance file
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// Malformed balance CSV
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Command offered after the queue stopped accepting work
    #[error("command queue is closed")]
    QueueClosed,

    /// A worker thread panicked before it finished draining
    #[error("worker {worker} panicked")]
    WorkerPanicked {
        /// Index of the failed worker
        worker: usize,
    },
}

impl LedgerError {
    /// Whether this error rejects operator input rather than failing the server
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            LedgerError::UnknownCommand { .. }
                | LedgerError::MissingAccount
                | LedgerError::InvalidNumber { .. }
                | LedgerError::AccountOutOfRange { .. }
                | LedgerError::UnexpectedToken { .. }
                | LedgerError::UnpairedOperand
                | LedgerError::EmptyTransfer
                | LedgerError::TooManyOperands { .. }
                | LedgerError::AmountOverflow { .. }
        )
    }
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to LedgerError
impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    pub fn unknown_command(command: &str) -> Self {
        LedgerError::UnknownCommand {
            command: command.to_string(),
        }
    }

    pub fn invalid_number(token: &str) -> Self {
        LedgerError::InvalidNumber {
            token: token.to_string(),
        }
    }

    pub fn account_out_of_range(account: i64, num_accounts: u32) -> Self {
        LedgerError::AccountOutOfRange {
            account,
            num_accounts,
        }
    }

    pub fn unexpected_token(token: &str) -> Self {
        LedgerError::UnexpectedToken {
            token: token.to_string(),
        }
    }

    pub fn amount_overflow(account: AccountId) -> Self {
        LedgerError::AmountOverflow { account }
    }

    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        LedgerError::StoreUnavailable {
            reason: reason.into(),
        }
    }

    /// Create a StoreUnavailable error for a negative starting balance
    pub fn negative_balance(account: AccountId, balance: Balance) -> Self {
        Self::store_unavailable(format!(
            "account {account} cannot start with negative balance {balance}"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::unknown_command(
        LedgerError::unknown_command("DEPOSIT"),
        "unknown command 'DEPOSIT'"
    )]
    #[case::missing_account(LedgerError::MissingAccount, "CHECK requires an account id")]
    #[case::invalid_number(LedgerError::invalid_number("abc"), "'abc' is not a valid number")]
    #[case::out_of_range(
        LedgerError::account_out_of_range(0, 10),
        "account 0 is out of range (valid: 1-10)"
    )]
    #[case::too_many(
        LedgerError::TooManyOperands { pairs: 11, max: 10 },
        "TRANS accepts at most 10 account/amount pairs, got 11"
    )]
    #[case::store_unavailable(
        LedgerError::store_unavailable("no accounts"),
        "account store unavailable: no accounts"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(3), message: "bad row".to_string() },
        "CSV parse error at line 3: bad row"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "bad row".to_string() },
        "CSV parse error: bad row"
    )]
    #[case::worker_panicked(LedgerError::WorkerPanicked { worker: 2 }, "worker 2 panicked")]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::unknown_command(LedgerError::unknown_command("X"), true)]
    #[case::out_of_range(LedgerError::account_out_of_range(11, 10), true)]
    #[case::unpaired(LedgerError::UnpairedOperand, true)]
    #[case::overflow(LedgerError::amount_overflow(1), true)]
    #[case::store(LedgerError::store_unavailable("x"), false)]
    #[case::queue_closed(LedgerError::QueueClosed, false)]
    #[case::io(LedgerError::IoError { message: "x".to_string() }, false)]
    fn test_is_rejection(#[case] error: LedgerError, #[case] expected: bool) {
        assert_eq!(error.is_rejection(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }
}
