//! Account-related types for the ledger server
//!
//! This module defines the identifiers and the balance snapshot used when
//! loading, inspecting, and dumping account state.

use serde::{Deserialize, Serialize};

/// Account identifier
///
/// Valid identifiers are `1..=N` where `N` is the configured account count.
pub type AccountId = u32;

/// Account balance in whole integer units
pub type Balance = i64;

/// Point-in-time view of one account
///
/// Accounts themselves live inside the store behind their own lock; this is
/// a detached copy taken while the lock was held. It is also the row format
/// of the balance CSV files (`account,balance`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID (1-based)
    pub account: AccountId,

    /// Balance observed under the account lock
    pub balance: Balance,
}

impl Account {
    /// Create a snapshot for the given account and balance
    pub fn new(account: AccountId, balance: Balance) -> Self {
        Account { account, balance }
    }
}
