//! Command-related types for the ledger server
//!
//! This module defines the parsed requests coming from the operator, the
//! queued commands handed to workers, and the operand list of a transfer.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use super::account::{AccountId, Balance};
use super::error::LedgerError;

/// Request identifier
///
/// Assigned by the producer at acceptance time, starting at 1.
pub type RequestId = u64;

/// Wall-clock instant with microsecond resolution
///
/// Displays as `<seconds>.<microseconds>` with the microseconds zero-padded
/// to six digits, which is the format of the request log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Timestamp {
    /// Whole seconds since the Unix epoch
    pub secs: u64,

    /// Sub-second part, always below 1_000_000
    pub micros: u32,
}

impl Timestamp {
    /// Capture the current time
    pub fn now() -> Self {
        let elapsed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Timestamp {
            secs: elapsed.as_secs(),
            micros: elapsed.subsec_micros(),
        }
    }

    pub fn new(secs: u64, micros: u32) -> Self {
        debug_assert!(micros < 1_000_000);
        Timestamp { secs, micros }
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:06}", self.secs, self.micros)
    }
}

/// One account/delta pair of a transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferOperand {
    /// Account the delta applies to
    pub account: AccountId,

    /// Signed amount added to the account balance
    pub delta: Balance,
}

/// Normalized operand list of a transfer
///
/// The only way to build one is [`TransferOperands::from_pairs`], which sorts
/// the pairs ascending by account and folds repeated accounts into a single
/// operand carrying the sum of their deltas. Every executor therefore locks a
/// transfer's accounts in strictly increasing order, which rules out cyclic
/// waits between concurrent transfers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferOperands(Vec<TransferOperand>);

impl TransferOperands {
    /// Normalize raw `(account, delta)` pairs in command-line order
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::AmountOverflow`] if the summed deltas of a
    /// repeated account do not fit in a [`Balance`].
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (AccountId, Balance)>,
    ) -> Result<Self, LedgerError> {
        let mut pairs: Vec<(AccountId, Balance)> = pairs.into_iter().collect();
        pairs.sort_by_key(|(account, _)| *account);

        let mut operands: Vec<TransferOperand> = Vec::with_capacity(pairs.len());
        for (account, delta) in pairs {
            match operands.last_mut() {
                Some(last) if last.account == account => {
                    last.delta = last
                        .delta
                        .checked_add(delta)
                        .ok_or_else(|| LedgerError::amount_overflow(account))?;
                }
                _ => operands.push(TransferOperand { account, delta }),
            }
        }

        Ok(TransferOperands(operands))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransferOperand> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[TransferOperand] {
        &self.0
    }

    /// Number of distinct accounts touched
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Work a command asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    /// Read one account balance
    Check(AccountId),

    /// Apply all deltas atomically, or none of them
    Transfer(TransferOperands),
}

/// A validated, identified unit of work
///
/// Created by the producer once a request passes validation, moved into the
/// queue, and consumed by exactly one worker. Fields are read-only after
/// construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    id: RequestId,
    kind: CommandKind,
    arrival: Timestamp,
}

impl Command {
    pub fn new(id: RequestId, kind: CommandKind, arrival: Timestamp) -> Self {
        Command { id, kind, arrival }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn kind(&self) -> &CommandKind {
        &self.kind
    }

    /// Time the command was accepted and enqueued
    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }
}

/// A parsed line of operator input
///
/// Only `Check` and `Transfer` become [`Command`]s; the rest are handled by
/// the input loop itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Check(AccountId),
    Transfer(TransferOperands),
    /// Stop accepting work and shut down after draining
    End,
    /// Print the help text
    Help,
    /// Blank line
    Empty,
}
