//! Concurrent Ledger Server
//!
//! Interactive front end: reads requests from stdin, prints request ids and
//! messages to stdout, and appends every completed request to the log file.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- 4 1000 requests.log
//! cargo run -- 4 1000 requests.log --initial-balance 500
//! cargo run -- 8 1000 requests.log --balances start.csv --final-balances end.csv
//! RUST_LOG=debug cargo run -- 1 10 requests.log < script.txt
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (accounts could not be created, log not writable, etc.)
//! - 2: Invalid command-line arguments (reported by clap)

use ledger_appserver::cli;
use ledger_appserver::Server;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr so stdout stays the operator conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = cli::parse_args();
    let server = Server::new(args.to_server_config());

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    if let Err(e) = server.run(stdin.lock(), &mut stdout) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
