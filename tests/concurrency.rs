//! Concurrency tests
//!
//! Threads of one process share a `Database` through an `Arc`. Separate
//! `Database` instances on the same root stand in for separate processes:
//! each takes the inter-process lock through its own descriptor.

mod common;

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use common::{open_db, open_temp_db, User};

const THREADS: u64 = 8;
const PER_THREAD: u64 = 50;

#[test]
fn test_disjoint_writers_lose_nothing() {
    let (_temp, db) = open_temp_db();
    let db = Arc::new(db);
    let barrier = Arc::new(Barrier::new(THREADS as usize));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let db = Arc::clone(&db);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let base = t * 1000;
                let mut kept = Vec::new();
                for i in 0..PER_THREAD {
                    let id = base + i;
                    db.add(&User::new(id, &format!("User#{}", id), i as f64), false)
                        .unwrap();

                    // Remove every third record again
                    if i % 3 == 0 {
                        assert!(db.remove::<User>(&id).unwrap());
                    } else {
                        kept.push(id);
                    }

                    let found = db.find_if(|u: &User| u.id == id).unwrap();
                    assert_eq!(found.is_some(), i % 3 != 0);
                }
                kept
            })
        })
        .collect();

    let mut expected = BTreeSet::new();
    for handle in handles {
        expected.extend(handle.join().unwrap());
    }

    assert_eq!(db.count::<User>().unwrap(), expected.len());
    let stored: BTreeSet<u64> = db.all::<User>().unwrap().into_iter().map(|u| u.id).collect();
    assert_eq!(stored, expected);
    assert_eq!(db.outstanding_locks(), 0);
}

#[test]
fn test_readers_never_see_partial_writes_in_process() {
    let (_temp, db) = open_temp_db();
    let db = Arc::new(db);
    let long_name = "x".repeat(64 * 1024);
    db.add(&User::new(1, &long_name, 1.0), false).unwrap();

    let writer = {
        let db = Arc::clone(&db);
        thread::spawn(move || {
            for i in 0..200 {
                let name = if i % 2 == 0 { "y" } else { "z" }.repeat(64 * 1024);
                db.update(&User::new(1, &name, i as f64)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let db = Arc::clone(&db);
            thread::spawn(move || {
                for _ in 0..200 {
                    // A torn file would fail to decode
                    let user = db.get::<User>(&1).unwrap().unwrap();
                    assert_eq!(user.name.len(), 64 * 1024);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(db.outstanding_locks(), 0);
}

#[test]
fn test_instances_on_same_root_serialize_writes() {
    let (temp, first) = open_temp_db();
    let second = Arc::new(open_db(temp.path()));

    assert!(first.process_lock().lock().unwrap());

    let written = Arc::new(AtomicBool::new(false));
    let handle = {
        let second = Arc::clone(&second);
        let written = Arc::clone(&written);
        thread::spawn(move || {
            second.add(&User::new(1, "blocked", 1.0), false).unwrap();
            written.store(true, Ordering::SeqCst);
        })
    };

    thread::sleep(Duration::from_millis(150));
    assert!(!written.load(Ordering::SeqCst), "write bypassed the inter-process lock");

    first.process_lock().unlock().unwrap();
    handle.join().unwrap();

    assert!(written.load(Ordering::SeqCst));
    assert_eq!(first.get::<User>(&1).unwrap().unwrap().name, "blocked");
}

#[test]
fn test_instances_on_same_root_interleave_without_loss() {
    let (temp, first) = open_temp_db();
    let first = Arc::new(first);
    let second = Arc::new(open_db(temp.path()));

    let spawn_writer = |db: Arc<recordfs::Database>, base: u64| {
        thread::spawn(move || {
            for i in 0..PER_THREAD {
                db.add(&User::new(base + i, "u", 1.0), false).unwrap();
            }
        })
    };

    let a = spawn_writer(Arc::clone(&first), 0);
    let b = spawn_writer(Arc::clone(&second), 10_000);
    a.join().unwrap();
    b.join().unwrap();

    assert_eq!(first.count::<User>().unwrap(), (2 * PER_THREAD) as usize);
    assert_eq!(second.count::<User>().unwrap(), (2 * PER_THREAD) as usize);
}
