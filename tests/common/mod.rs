//! Shared record types for integration tests
//!
//! User, Download and Setting records encoded as JSON. The store treats the
//! bytes as opaque; JSON keeps failures readable.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::path::Path;

use recordfs::{Database, Record};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub weight: f64,
}

impl User {
    pub fn new(id: u64, name: &str, weight: f64) -> Self {
        Self {
            id,
            name: name.to_string(),
            weight,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Download {
    pub id: u64,
    pub user_id: u64,
    pub url: String,
    pub size: u64,
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Setting {
    pub id: String,
    pub value: String,
    pub user_id: u64,
}

fn encode_json<T: Serialize, W: Write>(value: &T, writer: &mut W) -> io::Result<()> {
    serde_json::to_writer(writer, value).map_err(io::Error::from)
}

fn decode_json<T: for<'de> Deserialize<'de>, R: Read>(reader: &mut R) -> io::Result<T> {
    serde_json::from_reader(reader).map_err(io::Error::from)
}

impl Record for User {
    type Id = u64;
    const COLLECTION: &'static str = "types.User";

    fn id(&self) -> u64 {
        self.id
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        encode_json(self, writer)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        decode_json(reader)
    }
}

impl Record for Download {
    type Id = u64;
    const COLLECTION: &'static str = "types.Download";

    fn id(&self) -> u64 {
        self.id
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        encode_json(self, writer)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        decode_json(reader)
    }
}

impl Record for Setting {
    type Id = String;
    const COLLECTION: &'static str = "types.Setting";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        encode_json(self, writer)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        decode_json(reader)
    }
}

/// Opens a database in a fresh temporary directory with the usual
/// collection names registered.
pub fn open_temp_db() -> (TempDir, Database) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let db = open_db(temp.path());
    (temp, db)
}

pub fn open_db(root: &Path) -> Database {
    let mut db = Database::open(root).expect("Failed to open database");
    db.register::<User>("Users").unwrap();
    db.register::<Download>("Downloads").unwrap();
    db.register::<Setting>("Settings").unwrap();
    db
}
