//! In-memory account store
//!
//! This module provides the `Bank` struct, the volatile backend holding every
//! account balance for the lifetime of the process.
//!
//! # Design
//!
//! Each account is a separate `parking_lot::Mutex<Balance>`, so the lock and
//! the balance it protects are one value. No two accounts share a lock, and
//! there is no store-wide lock: transfers over disjoint accounts run fully in
//! parallel.
//!
//! # Thread Safety
//!
//! `Bank` is `Send + Sync` and is shared between workers through an `Arc`.
//! Lock ordering across several accounts is the caller's responsibility; see
//! [`TransactionExecutor`](super::TransactionExecutor).

use parking_lot::{Mutex, MutexGuard};

use super::traits::{AccountStore, BalanceSlot};
use crate::types::{Account, AccountId, Balance, LedgerError};

/// Fixed array of independently locked account balances
#[derive(Debug)]
pub struct Bank {
    /// Balance of account `i + 1` lives at index `i`
    accounts: Vec<Mutex<Balance>>,
}

/// Held lock on one `Bank` account
#[derive(Debug)]
pub struct AccountGuard<'a> {
    balance: MutexGuard<'a, Balance>,
}

impl BalanceSlot for AccountGuard<'_> {
    fn read(&self) -> Balance {
        *self.balance
    }

    fn write(&mut self, balance: Balance) {
        *self.balance = balance;
    }
}

impl Bank {
    /// Create `num_accounts` accounts, all starting at `initial_balance`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StoreUnavailable` if `num_accounts` is zero or
    /// `initial_balance` is negative.
    pub fn initialize(num_accounts: u32, initial_balance: Balance) -> Result<Self, LedgerError> {
        Self::with_presets(num_accounts, initial_balance, &[])
    }

    /// Create the store, then override individual starting balances
    ///
    /// Later presets for the same account win.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::StoreUnavailable` if `num_accounts` is zero, a
    /// preset names an account outside `1..=num_accounts`, or any starting
    /// balance is negative.
    pub fn with_presets(
        num_accounts: u32,
        initial_balance: Balance,
        presets: &[Account],
    ) -> Result<Self, LedgerError> {
        if num_accounts == 0 {
            return Err(LedgerError::store_unavailable(
                "at least one account is required",
            ));
        }
        if initial_balance < 0 {
            return Err(LedgerError::store_unavailable(format!(
                "initial balance {initial_balance} is negative"
            )));
        }

        let mut balances = vec![initial_balance; num_accounts as usize];
        for preset in presets {
            if preset.account == 0 || preset.account > num_accounts {
                return Err(LedgerError::store_unavailable(format!(
                    "preset account {} is out of range (valid: 1-{num_accounts})",
                    preset.account
                )));
            }
            if preset.balance < 0 {
                return Err(LedgerError::negative_balance(
                    preset.account,
                    preset.balance,
                ));
            }
            balances[(preset.account - 1) as usize] = preset.balance;
        }

        Ok(Bank {
            accounts: balances.into_iter().map(Mutex::new).collect(),
        })
    }

    /// Consistent copy of every balance
    ///
    /// Locks all accounts in ascending order and holds them together, so the
    /// snapshot never shows a transfer half-applied.
    pub fn snapshot(&self) -> Vec<Account> {
        let guards: Vec<_> = (1..=self.num_accounts())
            .map(|account| (account, self.lock(account)))
            .collect();

        guards
            .iter()
            .map(|(account, guard)| Account::new(*account, guard.read()))
            .collect()
    }

    /// Sum of all balances, taken from a consistent snapshot
    pub fn total_balance(&self) -> i128 {
        self.snapshot()
            .iter()
            .map(|account| i128::from(account.balance))
            .sum()
    }
}

impl AccountStore for Bank {
    type Slot<'a> = AccountGuard<'a>;

    fn num_accounts(&self) -> u32 {
        self.accounts.len() as u32
    }

    fn lock(&self, account: AccountId) -> AccountGuard<'_> {
        assert!(
            account >= 1 && account <= self.num_accounts(),
            "account {account} outside 1-{}",
            self.num_accounts()
        );
        AccountGuard {
            balance: self.accounts[(account - 1) as usize].lock(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_initialize_sets_every_balance() {
        let bank = Bank::initialize(3, 25).unwrap();

        assert_eq!(bank.num_accounts(), 3);
        assert_eq!(
            bank.snapshot(),
            vec![Account::new(1, 25), Account::new(2, 25), Account::new(3, 25)]
        );
    }

    #[test]
    fn test_initialize_zero_accounts_fails() {
        let result = Bank::initialize(0, 0);
        assert!(matches!(result, Err(LedgerError::StoreUnavailable { .. })));
    }

    #[test]
    fn test_presets_override_initial_balance() {
        let presets = [Account::new(2, 100), Account::new(3, 7), Account::new(2, 50)];
        let bank = Bank::with_presets(3, 1, &presets).unwrap();

        assert_eq!(
            bank.snapshot(),
            vec![Account::new(1, 1), Account::new(2, 50), Account::new(3, 7)]
        );
    }

    #[rstest]
    #[case::zero_account(Account::new(0, 10))]
    #[case::past_end(Account::new(4, 10))]
    #[case::negative_balance(Account::new(2, -1))]
    fn test_invalid_preset_fails(#[case] preset: Account) {
        let result = Bank::with_presets(3, 0, &[preset]);
        assert!(matches!(result, Err(LedgerError::StoreUnavailable { .. })));
    }

    #[test]
    fn test_negative_initial_balance_fails() {
        let result = Bank::initialize(2, -5);
        assert!(matches!(result, Err(LedgerError::StoreUnavailable { .. })));
    }

    #[test]
    fn test_slot_write_is_visible_after_release() {
        let bank = Bank::initialize(2, 0).unwrap();

        {
            let mut slot = bank.lock(2);
            slot.write(slot.read() + 40);
        }

        assert_eq!(bank.lock(2).read(), 40);
        assert_eq!(bank.lock(1).read(), 0);
        assert_eq!(bank.total_balance(), 40);
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn test_lock_out_of_range_panics() {
        let bank = Bank::initialize(2, 0).unwrap();
        let _slot = bank.lock(3);
    }
}
