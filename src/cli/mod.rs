//! CLI module for recordfs
//!
//! Inspects and edits a database root without knowing any record schema.
//! Every record is handled as a `RawRecord` in a named collection:
//! - init: create the root and its lock file
//! - collections: list collections with their entry counts
//! - count / list / cat: read a collection
//! - put / rm / clear: write a collection

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{execute, load_config, run, run_command, Output};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{write_error, write_response};
