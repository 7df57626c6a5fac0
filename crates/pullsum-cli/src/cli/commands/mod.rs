//! CLI command handlers, one file per command.

mod checksum;
mod fetch;
mod progress;
mod results;
mod retry;
mod setup;

pub use checksum::run_checksum;
pub use fetch::run_fetch;
pub use results::run_results;
pub use retry::run_retry;
