//! Core traits for account storage
//!
//! The executor never touches balances directly; it goes through an
//! [`AccountStore`], which hands out one exclusive slot per account. Holding
//! the slot is holding the account lock, so a balance can only be read or
//! written while its lock is held.

use crate::types::{AccountId, Balance};

/// Exclusive access to one account balance
///
/// Dropping the slot releases the account lock.
pub trait BalanceSlot {
    /// Current balance of the locked account
    fn read(&self) -> Balance;

    /// Replace the balance of the locked account
    fn write(&mut self, balance: Balance);
}

/// Trait for a fixed-size set of independently lockable accounts
///
/// Implementations must be shareable across worker threads. Accounts are
/// addressed `1..=num_accounts()`.
pub trait AccountStore: Send + Sync {
    /// Guard type returned by [`AccountStore::lock`]
    type Slot<'a>: BalanceSlot
    where
        Self: 'a;

    /// Number of accounts in the store
    fn num_accounts(&self) -> u32;

    /// Block until the account's lock is acquired
    ///
    /// # Panics
    ///
    /// Panics if `account` is outside `1..=num_accounts()`. Requests are
    /// validated before they are queued, so this only fires on a bug.
    fn lock(&self, account: AccountId) -> Self::Slot<'_>;
}
