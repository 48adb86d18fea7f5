//! Record and identifier traits
//!
//! The store never looks inside a record beyond its identifier. A record type
//! supplies:
//!
//! - a default collection (directory) name
//! - an identifier whose string form is used as the file name
//! - a byte encoding, written to and read from the record file
//!
//! Identifier string forms must round-trip: `from_file_name(to_file_name(id))`
//! returns an equal identifier. Integers render in decimal, strings verbatim.

use std::io::{self, Read, Write};

use super::errors::{StoreError, StoreResult};

/// A value that can serve as a record's file name.
pub trait RecordId: Clone {
    /// Canonical string form used as the file name.
    fn to_file_name(&self) -> String;

    /// Parses a file name back into an identifier.
    fn from_file_name(name: &str) -> Option<Self>;
}

macro_rules! integer_record_id {
    ($($t:ty),* $(,)?) => {
        $(
            impl RecordId for $t {
                fn to_file_name(&self) -> String {
                    self.to_string()
                }

                fn from_file_name(name: &str) -> Option<Self> {
                    name.parse().ok()
                }
            }
        )*
    };
}

integer_record_id!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl RecordId for String {
    fn to_file_name(&self) -> String {
        self.clone()
    }

    fn from_file_name(name: &str) -> Option<Self> {
        Some(name.to_string())
    }
}

/// A typed record stored as one file.
pub trait Record: Sized {
    /// Identifier type; unique within the collection.
    type Id: RecordId;

    /// Directory name used unless the type is registered under another name.
    const COLLECTION: &'static str;

    /// Returns this record's identifier.
    fn id(&self) -> Self::Id;

    /// Writes the record's encoded bytes.
    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()>;

    /// Reads a record back from its encoded bytes.
    fn decode<R: Read>(reader: &mut R) -> io::Result<Self>;

    /// Called after `decode` with the identifier taken from the file name.
    ///
    /// Types whose encoding already carries the identifier keep the default.
    fn restore_id(&mut self, _id: Self::Id) {}
}

/// Schema-agnostic record: a string identifier and opaque bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub id: String,
    pub bytes: Vec<u8>,
}

impl RawRecord {
    pub fn new(id: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            id: id.into(),
            bytes: bytes.into(),
        }
    }
}

impl Record for RawRecord {
    type Id = String;

    const COLLECTION: &'static str = "raw";

    fn id(&self) -> String {
        self.id.clone()
    }

    fn encode<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.bytes)
    }

    fn decode<R: Read>(reader: &mut R) -> io::Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self {
            id: String::new(),
            bytes,
        })
    }

    fn restore_id(&mut self, id: String) {
        self.id = id;
    }
}

/// Checks that `name` can be used as a single directory entry.
///
/// Rejects the empty string, `.`, `..`, and anything containing a path
/// separator or NUL.
pub fn validate_file_name(name: &str) -> StoreResult<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\0')
        || (cfg!(windows) && name.contains('\\'));
    if invalid {
        return Err(StoreError::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Renders an identifier as a validated file name.
pub fn file_name_of<I: RecordId>(id: &I) -> StoreResult<String> {
    let name = id.to_file_name();
    validate_file_name(&name)?;
    Ok(name)
}

/// Parses a directory entry name, accepting only canonical forms.
///
/// `007` is not the file of identifier `7`, so it yields `None`.
pub fn id_from_file_name<I: RecordId>(name: &str) -> Option<I> {
    I::from_file_name(name).filter(|id| id.to_file_name() == name)
}
