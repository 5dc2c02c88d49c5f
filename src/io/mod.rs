//! I/O module
//!
//! Handles everything that crosses the process boundary as text.
//!
//! # Components
//!
//! - `parser` - Operator request parsing and validation
//! - `request_log` - Append-only log of completed requests
//! - `balances` - Balance CSV loading and dumping

pub mod balances;
pub mod parser;
pub mod request_log;

pub use balances::{load_balances, read_balances, write_balances, write_balances_file};
pub use parser::{parse_request, TransferCapPolicy, MAX_TRANSFER_PAIRS};
pub use request_log::RequestLogger;
