use crate::io::TransferCapPolicy;
use crate::server::ServerConfig;
use clap::Parser;
use std::path::PathBuf;

/// Concurrent in-memory ledger server
#[derive(Parser, Debug)]
#[command(name = "appserver")]
#[command(about = "Serve balance checks and multi-account transfers from a worker pool", long_about = None)]
pub struct CliArgs {
    /// Number of worker threads executing requests
    #[arg(
        value_name = "WORKERS",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of worker threads (at least 1)"
    )]
    pub workers: u32,

    /// Number of accounts, numbered from 1
    #[arg(
        value_name = "ACCOUNTS",
        value_parser = clap::value_parser!(u32).range(1..),
        help = "Number of accounts (at least 1)"
    )]
    pub accounts: u32,

    /// Request log location
    #[arg(value_name = "LOG_FILE", help = "Path of the request log (appended to)")]
    pub log_file: PathBuf,

    /// Starting balance for every account not listed in --balances
    #[arg(
        long = "initial-balance",
        value_name = "AMOUNT",
        default_value_t = 0,
        allow_negative_numbers = true,
        help = "Starting balance of every account (default: 0, must not be negative)"
    )]
    pub initial_balance: i64,

    /// CSV of starting balances
    #[arg(
        long = "balances",
        value_name = "PATH",
        help = "CSV file with 'account,balance' rows to preload"
    )]
    pub balances: Option<PathBuf>,

    /// CSV written with final balances at shutdown
    #[arg(
        long = "final-balances",
        value_name = "PATH",
        help = "Write every account's final balance to this CSV file on exit"
    )]
    pub final_balances: Option<PathBuf>,

    /// Handling of transfers with more pairs than allowed
    #[arg(
        long = "transfer-cap",
        value_name = "POLICY",
        default_value = "truncate",
        help = "Transfers over 10 pairs: 'truncate' keeps the first 10, 'reject' refuses them"
    )]
    pub transfer_cap: TransferCapPolicy,
}

impl CliArgs {
    /// Build the server configuration from the parsed arguments
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            num_workers: self.workers,
            num_accounts: self.accounts,
            log_file: self.log_file.clone(),
            initial_balance: self.initial_balance,
            balances: self.balances.clone(),
            final_balances: self.final_balances.clone(),
            transfer_cap: self.transfer_cap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_positional_arguments() {
        let parsed = CliArgs::try_parse_from(["appserver", "4", "100", "out.log"]).unwrap();

        assert_eq!(parsed.workers, 4);
        assert_eq!(parsed.accounts, 100);
        assert_eq!(parsed.log_file, PathBuf::from("out.log"));
        assert_eq!(parsed.initial_balance, 0);
        assert_eq!(parsed.balances, None);
        assert_eq!(parsed.final_balances, None);
        assert_eq!(parsed.transfer_cap, TransferCapPolicy::Truncate);
    }

    #[rstest]
    #[case::truncate("truncate", TransferCapPolicy::Truncate)]
    #[case::reject("reject", TransferCapPolicy::Reject)]
    fn test_transfer_cap_parsing(#[case] value: &str, #[case] expected: TransferCapPolicy) {
        let parsed =
            CliArgs::try_parse_from(["appserver", "1", "1", "out.log", "--transfer-cap", value])
                .unwrap();
        assert_eq!(parsed.transfer_cap, expected);
    }

    #[test]
    fn test_server_config_conversion() {
        let parsed = CliArgs::try_parse_from([
            "appserver",
            "2",
            "10",
            "out.log",
            "--initial-balance",
            "500",
            "--balances",
            "start.csv",
            "--final-balances",
            "end.csv",
        ])
        .unwrap();
        let config = parsed.to_server_config();

        assert_eq!(config.num_workers, 2);
        assert_eq!(config.num_accounts, 10);
        assert_eq!(config.initial_balance, 500);
        assert_eq!(config.balances, Some(PathBuf::from("start.csv")));
        assert_eq!(config.final_balances, Some(PathBuf::from("end.csv")));
    }

    #[test]
    fn test_negative_initial_balance_is_parsed() {
        // Refused later by the bank, not by the argument parser
        let parsed =
            CliArgs::try_parse_from(["appserver", "1", "1", "out.log", "--initial-balance", "-5"])
                .unwrap();
        assert_eq!(parsed.initial_balance, -5);
    }

    #[rstest]
    #[case::missing_all(&["appserver"])]
    #[case::missing_log(&["appserver", "1", "10"])]
    #[case::zero_workers(&["appserver", "0", "10", "out.log"])]
    #[case::zero_accounts(&["appserver", "1", "0", "out.log"])]
    #[case::negative_workers(&["appserver", "-1", "10", "out.log"])]
    #[case::word_accounts(&["appserver", "1", "ten", "out.log"])]
    #[case::invalid_policy(&["appserver", "1", "10", "out.log", "--transfer-cap", "drop"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        let result = CliArgs::try_parse_from(args);
        assert!(result.is_err());
    }
}
