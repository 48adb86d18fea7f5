//! CLI argument definitions using clap
//!
//! Commands:
//! - recordfs init
//! - recordfs collections
//! - recordfs count <collection>
//! - recordfs list <collection>
//! - recordfs cat <collection> <id>
//! - recordfs put <collection> <id> [--overwrite]
//! - recordfs rm <collection> <id>
//! - recordfs clear <collection>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// recordfs - inspect a file-per-record database
#[derive(Parser, Debug)]
#[command(name = "recordfs")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database root directory (overrides the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Path to a JSON configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create the database root and lock file
    Init,

    /// List collections and their entry counts
    Collections,

    /// Count the entries of a collection
    Count {
        /// Collection directory name
        collection: String,
    },

    /// List the record identifiers of a collection
    List {
        /// Collection directory name
        collection: String,
    },

    /// Write a record's raw bytes to stdout
    Cat {
        /// Collection directory name
        collection: String,
        /// Record identifier
        id: String,
    },

    /// Store stdin as a record
    Put {
        /// Collection directory name
        collection: String,
        /// Record identifier
        id: String,
        /// Replace an existing record
        #[arg(long)]
        overwrite: bool,
    },

    /// Remove a record
    Rm {
        /// Collection directory name
        collection: String,
        /// Record identifier
        id: String,
    },

    /// Remove a whole collection
    Clear {
        /// Collection directory name
        collection: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
