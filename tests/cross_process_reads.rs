//! Reads are not isolated from other processes
//!
//! Reads take only the in-process shared lock. While another process holds
//! the inter-process lock and is rewriting a record, a reader here is not
//! blocked and may see the file mid-write. These tests pin that behaviour so
//! a change to it is deliberate.

mod common;

use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use common::{open_db, open_temp_db, User};

#[test]
fn test_reads_proceed_while_other_process_holds_write_lock() {
    let (temp, writer) = open_temp_db();
    writer.add(&User::new(1, "James", 83.15), false).unwrap();

    let reader = open_db(temp.path());
    assert!(writer.process_lock().lock().unwrap());

    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || {
        let user = reader.get::<User>(&1).unwrap();
        let count = reader.count::<User>().unwrap();
        tx.send((user, count)).unwrap();
    });

    // The reader completes while the lock is still held
    let (user, count) = rx
        .recv_timeout(Duration::from_secs(5))
        .expect("read blocked on the inter-process lock");
    assert_eq!(user.unwrap().name, "James");
    assert_eq!(count, 1);

    writer.process_lock().unlock().unwrap();
    handle.join().unwrap();
}

#[test]
fn test_read_can_observe_partially_written_record() {
    let (temp, db) = open_temp_db();
    db.add(&User::new(1, "James", 83.15), false).unwrap();

    // Simulate another process caught mid-write: truncated record bytes
    let path = temp.path().join("Users").join("1");
    let full = fs::read(&path).unwrap();
    fs::write(&path, &full[..full.len() / 2]).unwrap();

    let err = db.get::<User>(&1).unwrap_err();
    assert_eq!(err.code(), "RECORDFS_DECODE_FAILURE");
    assert!(db.exists::<User>(&1).unwrap());
}
