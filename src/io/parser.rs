//! Request parsing and validation
//!
//! Turns one line of operator input into a [`Request`]. Everything that can be
//! checked without touching the accounts is checked here, so a request that
//! reaches the queue is always executable:
//!
//! - `CHECK <acct>`: exactly one account id in `1..=num_accounts`
//! - `TRANS <acct> <amt> [<acct> <amt> ...]`: one or more pairs, every account
//!   in range, every amount a signed integer
//! - `END`, `HELP`: control requests, trailing tokens ignored
//!
//! Keywords are case-sensitive and must match a whole token.

use clap::ValueEnum;
use tracing::warn;

use crate::types::{AccountId, Balance, LedgerError, Request, TransferOperands};

/// Maximum number of account/amount pairs in one transfer
pub const MAX_TRANSFER_PAIRS: usize = 10;

/// What to do with a transfer naming more than [`MAX_TRANSFER_PAIRS`] pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransferCapPolicy {
    /// Keep the first pairs and drop the rest
    #[default]
    Truncate,
    /// Reject the whole request
    Reject,
}

/// Parse and validate one input line
///
/// # Arguments
///
/// * `line` - Raw operator input, with or without the trailing newline
/// * `num_accounts` - Number of accounts in the store
/// * `policy` - Handling of transfers over the pair limit
///
/// # Errors
///
/// Returns a rejection (`LedgerError::is_rejection`) describing the first
/// problem found.
pub fn parse_request(
    line: &str,
    num_accounts: u32,
    policy: TransferCapPolicy,
) -> Result<Request, LedgerError> {
    let mut tokens = line.split_whitespace();
    let Some(keyword) = tokens.next() else {
        return Ok(Request::Empty);
    };

    match keyword {
        "CHECK" => {
            let account = tokens.next().ok_or(LedgerError::MissingAccount)?;
            let account = parse_account(account, num_accounts)?;
            if let Some(extra) = tokens.next() {
                return Err(LedgerError::unexpected_token(extra));
            }
            Ok(Request::Check(account))
        }
        "TRANS" => {
            let operands: Vec<&str> = tokens.collect();
            parse_transfer(&operands, num_accounts, policy).map(Request::Transfer)
        }
        "END" => Ok(Request::End),
        "HELP" => Ok(Request::Help),
        other => Err(LedgerError::unknown_command(other)),
    }
}

fn parse_transfer(
    tokens: &[&str],
    num_accounts: u32,
    policy: TransferCapPolicy,
) -> Result<TransferOperands, LedgerError> {
    if tokens.is_empty() {
        return Err(LedgerError::EmptyTransfer);
    }
    if tokens.len() % 2 != 0 {
        return Err(LedgerError::UnpairedOperand);
    }

    let pairs = tokens.len() / 2;
    let kept = if pairs > MAX_TRANSFER_PAIRS {
        match policy {
            TransferCapPolicy::Reject => {
                return Err(LedgerError::TooManyOperands {
                    pairs,
                    max: MAX_TRANSFER_PAIRS,
                })
            }
            TransferCapPolicy::Truncate => {
                warn!(
                    pairs,
                    dropped = pairs - MAX_TRANSFER_PAIRS,
                    "transfer truncated to {MAX_TRANSFER_PAIRS} pairs"
                );
                &tokens[..MAX_TRANSFER_PAIRS * 2]
            }
        }
    } else {
        tokens
    };

    let parsed = kept
        .chunks_exact(2)
        .map(|pair| {
            let account = parse_account(pair[0], num_accounts)?;
            let delta = parse_amount(pair[1])?;
            Ok((account, delta))
        })
        .collect::<Result<Vec<_>, LedgerError>>()?;

    TransferOperands::from_pairs(parsed)
}

fn parse_account(token: &str, num_accounts: u32) -> Result<AccountId, LedgerError> {
    let value: i64 = token
        .parse()
        .map_err(|_| LedgerError::invalid_number(token))?;

    match AccountId::try_from(value) {
        Ok(account) if (1..=num_accounts).contains(&account) => Ok(account),
        _ => Err(LedgerError::account_out_of_range(value, num_accounts)),
    }
}

fn parse_amount(token: &str) -> Result<Balance, LedgerError> {
    token
        .parse()
        .map_err(|_| LedgerError::invalid_number(token))
}
