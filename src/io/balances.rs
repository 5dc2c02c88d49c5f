//! Balance CSV files
//!
//! Starting balances can be preloaded from, and final balances dumped to, a
//! CSV file with the columns `account,balance`. Reading trims whitespace
//! around fields; writing sorts rows by account for deterministic output.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::types::{Account, LedgerError};

/// Read preset balances from a CSV file
///
/// # Errors
///
/// * `LedgerError::IoError` if the file cannot be opened
/// * `LedgerError::ParseError` on the first malformed row
pub fn load_balances(path: &Path) -> Result<Vec<Account>, LedgerError> {
    let file = File::open(path).map_err(|e| LedgerError::IoError {
        message: format!("failed to open balances '{}': {}", path.display(), e),
    })?;

    read_balances(file)
}

/// Read preset balances from any CSV source
pub fn read_balances(source: impl std::io::Read) -> Result<Vec<Account>, LedgerError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    reader
        .deserialize::<Account>()
        .map(|row| row.map_err(LedgerError::from))
        .collect()
}

/// Write balances as CSV, sorted by account
pub fn write_balances(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut sorted = accounts.to_vec();
    sorted.sort_by_key(|account| account.account);

    let mut writer = csv::Writer::from_writer(output);
    for account in &sorted {
        writer.serialize(account)?;
    }
    writer.flush()?;

    Ok(())
}

/// Create (or truncate) `path` and write balances into it
pub fn write_balances_file(path: &Path, accounts: &[Account]) -> Result<(), LedgerError> {
    let mut file = File::create(path).map_err(|e| LedgerError::IoError {
        message: format!("failed to create balances '{}': {}", path.display(), e),
    })?;

    write_balances(accounts, &mut file)
}
