//! CLI command handlers. Each command is in its own file.

mod archive;
mod filter;
mod run;
mod status;

pub use archive::run_archive;
pub use filter::run_filter;
pub use run::run_probe;
pub use status::run_status;
