//! Transaction execution against the account store
//!
//! This module provides the `TransactionExecutor` struct, which runs one
//! command at a time on behalf of a worker and turns it into a log record.
//!
//! # Locking Protocol
//!
//! - **Check**: lock the single account, read, take the completion time,
//!   release.
//! - **Transfer**: lock every distinct account in ascending id order, decide
//!   commit or abort with all locks held, write staged balances on commit,
//!   then release everything.
//!
//! Every transfer requests its locks in the same global order, so no cycle of
//! workers waiting on each other can form. The ascending, deduplicated order
//! is guaranteed by [`TransferOperands`], so the executor only asserts it.
//!
//! # Atomicity
//!
//! Balances are staged in memory and written back only when no account would
//! go negative. An aborted transfer leaves every account untouched, and no
//! reader can observe staged values because all locks are held until the
//! writes finish.

use std::sync::Arc;

use tracing::debug;

use super::traits::{AccountStore, BalanceSlot};
use crate::types::{
    AccountId, Balance, Command, CommandKind, LogRecord, Outcome, Timestamp, TransferOperands,
};

/// Executes checks and transfers under the per-account locking discipline
#[derive(Debug)]
pub struct TransactionExecutor<S> {
    store: Arc<S>,
}

impl<S> Clone for TransactionExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: AccountStore> TransactionExecutor<S> {
    /// Create an executor operating on the given store
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Run a command to completion and build its log record
    ///
    /// Blocks for as long as it takes to acquire the accounts involved.
    pub fn execute(&self, command: &Command) -> LogRecord {
        let (outcome, end) = match command.kind() {
            CommandKind::Check(account) => {
                let (balance, end) = self.check_balance(*account);
                (Outcome::Balance(balance), end)
            }
            CommandKind::Transfer(operands) => {
                let outcome = self.transfer(operands);
                (outcome, Timestamp::now())
            }
        };

        debug!(id = command.id(), ?outcome, "command executed");

        LogRecord {
            id: command.id(),
            outcome,
            start: command.arrival(),
            end,
        }
    }

    /// Read one balance under its lock
    ///
    /// The completion time is taken before the lock is released.
    pub fn check_balance(&self, account: AccountId) -> (Balance, Timestamp) {
        let slot = self.store.lock(account);
        let balance = slot.read();
        let end = Timestamp::now();
        drop(slot);

        (balance, end)
    }

    /// Apply a transfer atomically
    ///
    /// # Returns
    ///
    /// * `Outcome::Committed` if every account stays non-negative
    /// * `Outcome::InsufficientFunds(account)` naming the lowest account that
    ///   would go negative (or overflow); nothing is written in that case
    pub fn transfer(&self, operands: &TransferOperands) -> Outcome {
        debug_assert!(
            operands
                .as_slice()
                .windows(2)
                .all(|pair| pair[0].account < pair[1].account),
            "transfer operands must be strictly ascending"
        );

        // Acquire in ascending order, one at a time
        let mut slots: Vec<S::Slot<'_>> = operands
            .iter()
            .map(|operand| self.store.lock(operand.account))
            .collect();

        let mut staged: Vec<Balance> = Vec::with_capacity(slots.len());
        let mut insufficient = None;
        for (operand, slot) in operands.iter().zip(&slots) {
            match slot.read().checked_add(operand.delta) {
                Some(predicted) if predicted >= 0 => staged.push(predicted),
                _ => {
                    insufficient = Some(operand.account);
                    break;
                }
            }
        }

        let outcome = match insufficient {
            Some(account) => Outcome::InsufficientFunds(account),
            None => {
                for (slot, balance) in slots.iter_mut().zip(staged) {
                    slot.write(balance);
                }
                Outcome::Committed
            }
        };

        drop(slots);
        outcome
    }
}
