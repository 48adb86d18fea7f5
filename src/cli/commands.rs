//! CLI command implementations
//!
//! Each command opens the database, binds `RawRecord` to the requested
//! collection and performs one store operation. Results are produced as an
//! `Output` so they can be checked without a terminal.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_stdin, write_bytes, write_response};
use crate::store::{Database, DatabaseConfig, RawRecord};

/// Result of one command
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// JSON data for the `{"status": "ok", "data": ...}` envelope
    Json(Value),
    /// Raw record bytes
    Bytes(Vec<u8>),
}

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    let config = load_config(cli.config.as_deref(), cli.root)?;
    run_command(&config, cli.command)
}

/// Run one command and write its output to stdout
pub fn run_command(config: &DatabaseConfig, cmd: Command) -> CliResult<()> {
    let input = if matches!(cmd, Command::Put { .. }) {
        read_stdin()?
    } else {
        Vec::new()
    };

    match execute(config, cmd, input.as_slice())? {
        Output::Json(data) => write_response(data),
        Output::Bytes(bytes) => write_bytes(&bytes),
    }
}

/// Resolve the configuration from an optional file and an optional root
/// override.
///
/// Without a config file, only warnings and errors are logged so that
/// command output stays readable.
pub fn load_config(config_path: Option<&Path>, root: Option<PathBuf>) -> CliResult<DatabaseConfig> {
    let mut config = match config_path {
        Some(path) => DatabaseConfig::load(path)?,
        None => DatabaseConfig {
            log_level: "warn".to_string(),
            ..DatabaseConfig::default()
        },
    };
    if let Some(root) = root {
        config.root = root;
    }
    config.validate()?;
    Ok(config)
}

/// Execute one command; `input` supplies the bytes for `put`.
pub fn execute<R: Read>(config: &DatabaseConfig, cmd: Command, mut input: R) -> CliResult<Output> {
    match cmd {
        Command::Init => init(config),
        Command::Collections => collections(config),
        Command::Count { collection } => {
            let db = open_collection(config, &collection)?;
            let count = db.count::<RawRecord>()?;
            Ok(Output::Json(json!({"collection": collection, "count": count})))
        }
        Command::List { collection } => {
            let db = open_collection(config, &collection)?;
            let mut ids: Vec<String> = db
                .all::<RawRecord>()?
                .into_iter()
                .map(|record| record.id)
                .collect();
            ids.sort();
            Ok(Output::Json(json!({"collection": collection, "ids": ids})))
        }
        Command::Cat { collection, id } => {
            let db = open_collection(config, &collection)?;
            match db.get::<RawRecord>(&id)? {
                Some(record) => Ok(Output::Bytes(record.bytes)),
                None => Err(CliError::not_found(&collection, &id)),
            }
        }
        Command::Put {
            collection,
            id,
            overwrite,
        } => {
            let mut bytes = Vec::new();
            input.read_to_end(&mut bytes)?;
            let size = bytes.len();

            let db = open_collection(config, &collection)?;
            db.add(&RawRecord::new(id.clone(), bytes), overwrite)?;
            Ok(Output::Json(
                json!({"collection": collection, "id": id, "bytes": size}),
            ))
        }
        Command::Rm { collection, id } => {
            let db = open_collection(config, &collection)?;
            let removed = db.remove::<RawRecord>(&id)?;
            Ok(Output::Json(
                json!({"collection": collection, "id": id, "removed": removed}),
            ))
        }
        Command::Clear { collection } => {
            let db = open_collection(config, &collection)?;
            let cleared = db.clear::<RawRecord>()?;
            Ok(Output::Json(json!({"collection": collection, "cleared": cleared})))
        }
    }
}

/// Create the root directory and the lock file
fn init(config: &DatabaseConfig) -> CliResult<Output> {
    let db = Database::with_config(config)?;

    // Taking the lock once creates the lock file
    let lock = db.process_lock();
    if lock.lock()? {
        lock.unlock()?;
    }

    Ok(Output::Json(json!({
        "initialized": true,
        "root": db.root().display().to_string(),
    })))
}

fn collections(config: &DatabaseConfig) -> CliResult<Output> {
    let mut db = Database::with_config(config)?;

    let mut listing = Vec::new();
    for name in db.collections()? {
        db.register::<RawRecord>(&name)?;
        let count = db.count::<RawRecord>()?;
        listing.push(json!({"collection": name, "count": count}));
    }
    Ok(Output::Json(json!({ "collections": listing })))
}

fn open_collection(config: &DatabaseConfig, collection: &str) -> CliResult<Database> {
    let mut db = Database::with_config(config)?;
    db.register::<RawRecord>(collection)?;
    Ok(db)
}
