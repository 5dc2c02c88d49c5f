//! Interactive ledger server
//!
//! This module wires the components together and runs the producer side:
//! it reads operator requests line by line, validates them, assigns request
//! ids, and hands commands to the worker pool.
//!
//! # Architecture
//!
//! ```text
//! Server::run
//!     ├── Bank                 (accounts, optionally preloaded from CSV)
//!     ├── RequestLogger        (append-only request log)
//!     ├── CommandQueue         (producer -> workers)
//!     └── WorkerPool           (N threads, TransactionExecutor<Bank>)
//! ```
//!
//! # Shutdown
//!
//! `END` or end of input stops intake. The pool is then shut down, which
//! closes the queue and waits until every accepted command has been executed
//! and logged. Only after that is the final balance file written and the
//! goodbye message printed.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::core::{Bank, CommandQueue, TransactionExecutor, WorkerPool};
use crate::io::{
    load_balances, parse_request, write_balances_file, RequestLogger, TransferCapPolicy,
};
use crate::types::{Balance, Command, CommandKind, LedgerError, Request, RequestId, Timestamp};

/// Printed before every read
pub const PROMPT: &str = "> ";

/// Response to `HELP`
pub const HELP_TEXT: &str = "~ Help Desk ~\n\
CHECK <accountid>\n   Returns: <requestID> BAL <balance>\n\
TRANS <acct1> <amount1> <acct2> <amount2> ...\n   \
Returns: <requestID> OK on success or <requestID> ISF <acctid> on first failed account\n\
HELP\n   Returns: this information\n\
END\n   Finishes queued requests and exits\n";

/// Startup configuration of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Number of worker threads (at least 1)
    pub num_workers: u32,
    /// Number of accounts (at least 1)
    pub num_accounts: u32,
    /// Request log location
    pub log_file: PathBuf,
    /// Starting balance of every account not listed in `balances`
    pub initial_balance: Balance,
    /// Optional CSV of starting balances
    pub balances: Option<PathBuf>,
    /// Optional CSV written with the final balances after shutdown
    pub final_balances: Option<PathBuf>,
    /// Handling of transfers over the pair limit
    pub transfer_cap: TransferCapPolicy,
}

impl ServerConfig {
    /// Configuration with zero starting balances and no balance files
    pub fn new(num_workers: u32, num_accounts: u32, log_file: impl Into<PathBuf>) -> Self {
        Self {
            num_workers,
            num_accounts,
            log_file: log_file.into(),
            initial_balance: 0,
            balances: None,
            final_balances: None,
            transfer_cap: TransferCapPolicy::default(),
        }
    }
}

/// Counters for one server session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ServerReport {
    /// Requests that received an id
    pub accepted: u64,
    /// Requests turned away by validation
    pub rejected: u64,
    /// Commands executed by the pool
    pub executed: u64,
    /// Records appended to the request log
    pub logged: u64,
}

/// The ledger server
#[derive(Debug, Clone)]
pub struct Server {
    config: ServerConfig,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run a full session: start up, serve `input`, drain, and shut down
    ///
    /// # Arguments
    ///
    /// * `input` - Source of operator requests, one per line
    /// * `output` - Destination for prompts, request ids, and messages
    ///
    /// # Errors
    ///
    /// * `LedgerError::StoreUnavailable` if the accounts cannot be created;
    ///   nothing is read from `input` in that case
    /// * `LedgerError::IoError` / `LedgerError::ParseError` for log or
    ///   balance file failures
    /// * `LedgerError::WorkerPanicked` if a worker died
    pub fn run<R: BufRead>(
        &self,
        input: R,
        output: &mut dyn Write,
    ) -> Result<ServerReport, LedgerError> {
        let config = &self.config;

        let presets = match &config.balances {
            Some(path) => load_balances(path)?,
            None => Vec::new(),
        };
        let bank = Arc::new(Bank::with_presets(
            config.num_accounts,
            config.initial_balance,
            &presets,
        )?);
        let logger = Arc::new(RequestLogger::create(&config.log_file)?);
        let queue = Arc::new(CommandQueue::new());

        let log_location = absolute_path(&config.log_file);
        info!(
            workers = config.num_workers,
            accounts = config.num_accounts,
            log = %log_location.display(),
            presets = presets.len(),
            "starting ledger server"
        );

        let pool = WorkerPool::start(
            config.num_workers as usize,
            Arc::clone(&queue),
            TransactionExecutor::new(Arc::clone(&bank)),
            Arc::clone(&logger),
        )?;

        // The pool must be joined even if talking to the operator fails
        let intake = self
            .print_banner(output, &log_location)
            .and_then(|()| self.accept_requests(input, output, &queue));
        let drained = pool.shutdown();
        let (accepted, rejected) = intake?;
        let pool_report = drained?;

        if let Some(path) = &config.final_balances {
            write_balances_file(path, &bank.snapshot())?;
            info!(path = %path.display(), "final balances written");
        }

        writeln!(output, "Cleaning up and exiting program, goodbye.")?;

        Ok(ServerReport {
            accepted,
            rejected,
            executed: pool_report.executed,
            logged: logger.records_written(),
        })
    }

    fn print_banner(
        &self,
        output: &mut dyn Write,
        log_location: &Path,
    ) -> Result<(), LedgerError> {
        writeln!(output, "Number of worker threads: {}", self.config.num_workers)?;
        writeln!(output, "Number of accounts: {}", self.config.num_accounts)?;
        writeln!(output, "Log location: {}", log_location.display())?;
        writeln!(output, "\nReady to accept input.")?;
        Ok(())
    }

    /// Producer loop; returns `(accepted, rejected)` once intake stops
    fn accept_requests<R: BufRead>(
        &self,
        mut input: R,
        output: &mut dyn Write,
        queue: &CommandQueue,
    ) -> Result<(u64, u64), LedgerError> {
        let mut next_id: RequestId = 1;
        let mut rejected = 0;
        let mut buffer = Vec::new();

        loop {
            write!(output, "{PROMPT}")?;
            output.flush()?;

            buffer.clear();
            if input.read_until(b'\n', &mut buffer)? == 0 {
                info!("input closed, shutting down");
                break;
            }
            let line = String::from_utf8_lossy(&buffer);

            let parsed = parse_request(&line, self.config.num_accounts, self.config.transfer_cap);
            let request = match parsed {
                Ok(request) => request,
                Err(e) => {
                    warn!(input = line.trim(), error = %e, "request rejected");
                    writeln!(
                        output,
                        "Invalid request: {e}. Supports CHECK, TRANS, END, and HELP."
                    )?;
                    rejected += 1;
                    continue;
                }
            };

            let kind = match request {
                Request::Check(account) => CommandKind::Check(account),
                Request::Transfer(operands) => CommandKind::Transfer(operands),
                Request::Help => {
                    output.write_all(HELP_TEXT.as_bytes())?;
                    continue;
                }
                Request::Empty => continue,
                Request::End => {
                    info!("END received, shutting down");
                    break;
                }
            };

            let id = next_id;
            next_id += 1;
            queue.enqueue(Command::new(id, kind, Timestamp::now()))?;
            writeln!(output, "ID {id}")?;
        }

        writeln!(output, "Waiting for all threads to finish...")?;
        Ok((next_id - 1, rejected))
    }
}

fn absolute_path(path: &Path) -> PathBuf {
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Account;
    use std::fs;
    use std::io::Cursor;
    use tempfile::TempDir;

    struct Session {
        dir: TempDir,
        config: ServerConfig,
    }

    impl Session {
        fn new(workers: u32, accounts: u32) -> Self {
            let dir = TempDir::new().unwrap();
            let config = ServerConfig::new(workers, accounts, dir.path().join("requests.log"));
            Self { dir, config }
        }

        fn run(&self, script: &str) -> (Result<ServerReport, LedgerError>, String) {
            let mut output = Vec::new();
            let result = Server::new(self.config.clone()).run(Cursor::new(script), &mut output);
            (result, String::from_utf8(output).unwrap())
        }

        /// Log lines without their timestamps, ordered by request id
        fn log(&self) -> Vec<String> {
            let content = fs::read_to_string(&self.config.log_file).unwrap_or_default();
            let mut lines: Vec<(RequestId, String)> = content
                .lines()
                .map(|line| {
                    let head = line.split(" TIME ").next().unwrap().to_string();
                    let id = head.split(' ').next().unwrap().parse().unwrap();
                    (id, head)
                })
                .collect();
            lines.sort();
            lines.into_iter().map(|(_, head)| head).collect()
        }
    }

    #[test]
    fn test_session_prints_banner_ids_and_goodbye() {
        let session = Session::new(2, 5);
        let (result, output) = session.run("CHECK 1\nTRANS 1 10 2 -5\nEND\n");

        let report = result.unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.executed, 2);
        assert_eq!(report.logged, 2);

        assert!(output.starts_with(
            "Number of worker threads: 2\nNumber of accounts: 5\nLog location: "
        ));
        assert!(output.contains("Ready to accept input."));
        assert!(output.contains("> ID 1\n> ID 2\n> Waiting for all threads to finish...\n"));
        assert!(output.ends_with("Cleaning up and exiting program, goodbye.\n"));
    }

    #[test]
    fn test_rejected_requests_do_not_consume_ids() {
        let session = Session::new(1, 3);
        let (result, output) = session.run("CHECK 0\nCHECK 2\nTRANS 4 1\nBOGUS\nCHECK 3\nEND\n");

        let report = result.unwrap();
        assert_eq!(report.accepted, 2);
        assert_eq!(report.rejected, 3);
        assert!(output.contains("ID 1\n"));
        assert!(output.contains("ID 2\n"));
        assert!(!output.contains("ID 3\n"));
        assert!(output.contains(
            "Invalid request: account 0 is out of range (valid: 1-3). Supports CHECK, TRANS, END, and HELP."
        ));

        assert_eq!(session.log(), vec!["1 BAL 0", "2 BAL 0"]);
    }

    #[test]
    fn test_single_worker_executes_in_order() {
        let mut session = Session::new(1, 3);
        session.config.initial_balance = 50;
        let script = "TRANS 1 -30 2 30\nCHECK 2\nTRANS 3 10 1 -25\nCHECK 1\nCHECK 3\nEND\n";
        let (result, _) = session.run(script);

        result.unwrap();
        assert_eq!(
            session.log(),
            vec!["1 OK", "2 BAL 80", "3 ISF 1", "4 BAL 20", "5 BAL 50"]
        );
    }

    #[test]
    fn test_end_of_input_drains_like_end() {
        let session = Session::new(4, 2);
        let script: String = (0..200).map(|i| format!("CHECK {}\n", i % 2 + 1)).collect();
        let (result, output) = session.run(&script);

        let report = result.unwrap();
        assert_eq!(report.accepted, 200);
        assert_eq!(report.executed, 200);
        assert_eq!(session.log().len(), 200);
        assert!(output.contains("Waiting for all threads to finish..."));
    }

    #[test]
    fn test_lines_after_end_are_ignored() {
        let session = Session::new(1, 2);
        let (result, _) = session.run("CHECK 1\nEND\nCHECK 2\n");

        assert_eq!(result.unwrap().accepted, 1);
        assert_eq!(session.log(), vec!["1 BAL 0"]);
    }

    #[test]
    fn test_help_and_blank_lines() {
        let session = Session::new(1, 2);
        let (result, output) = session.run("\nHELP\n   \nEND\n");

        let report = result.unwrap();
        assert_eq!(report, ServerReport::default());
        assert!(output.contains("~ Help Desk ~"));
        assert!(!output.contains("Invalid request"));
    }

    #[test]
    fn test_presets_and_final_balances() {
        let mut session = Session::new(2, 3);
        let presets = session.dir.path().join("presets.csv");
        let final_balances = session.dir.path().join("final.csv");
        fs::write(&presets, "account,balance\n1,100\n2,50\n").unwrap();
        session.config.balances = Some(presets);
        session.config.final_balances = Some(final_balances.clone());

        let (result, _) = session.run("TRANS 1 -30 2 30\nTRANS 3 -1 1 1\nEND\n");

        result.unwrap();
        assert_eq!(
            crate::io::load_balances(&final_balances).unwrap(),
            vec![Account::new(1, 70), Account::new(2, 80), Account::new(3, 0)]
        );
    }

    #[test]
    fn test_invalid_preset_fails_before_reading_input() {
        let mut session = Session::new(1, 2);
        let presets = session.dir.path().join("presets.csv");
        fs::write(&presets, "account,balance\n5,100\n").unwrap();
        session.config.balances = Some(presets);

        let (result, output) = session.run("CHECK 1\nEND\n");

        assert!(matches!(result, Err(LedgerError::StoreUnavailable { .. })));
        assert!(output.is_empty());
        assert!(!session.config.log_file.exists());
    }

    #[test]
    fn test_transfer_cap_policy_reject() {
        let mut session = Session::new(1, 12);
        session.config.transfer_cap = TransferCapPolicy::Reject;
        let pairs: String = (1..=11).map(|a| format!(" {a} 1")).collect();
        let (result, output) = session.run(&format!("TRANS{pairs}\nEND\n"));

        assert_eq!(result.unwrap().rejected, 1);
        assert!(output.contains("at most 10 account/amount pairs"));
    }
}
