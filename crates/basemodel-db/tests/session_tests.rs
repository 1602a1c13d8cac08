//! Unit-of-work semantics over a file-backed database.

use basemodel_db::{entity, Database, Entity};
use tempfile::TempDir;

entity! {
    pub struct LogEntry {
        pub message: String,
    }
}

fn file_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:///{}", dir.path().join("test.db").display());
    let db = Database::builder(url)
        .register::<LogEntry>()
        .build()
        .unwrap();
    (dir, db)
}

fn entry(message: &str) -> LogEntry {
    LogEntry {
        message: message.into(),
        ..Default::default()
    }
}

#[test]
fn add_is_invisible_to_other_sessions_until_commit() {
    let (_dir, db) = file_db();
    let writer = db.session().unwrap();
    let reader = db.session().unwrap();

    let pending = entry("pending").add(&writer).unwrap();
    assert!(pending.id().is_some());
    assert!(writer.in_transaction());
    assert_eq!(LogEntry::count(&writer).unwrap(), 1);
    assert_eq!(LogEntry::count(&reader).unwrap(), 0);

    writer.commit().unwrap();
    assert_eq!(LogEntry::count(&reader).unwrap(), 1);
}

#[test]
fn create_commits_unrelated_pending_writes() {
    let (_dir, db) = file_db();
    let session = db.session().unwrap();

    entry("first").add(&session).unwrap();
    entry("second").create(&session).unwrap();

    let other = db.session().unwrap();
    assert_eq!(LogEntry::count(&other).unwrap(), 2);
}

#[test]
fn dropping_session_discards_pending_writes() {
    let (_dir, db) = file_db();
    {
        let session = db.session().unwrap();
        entry("lost").add(&session).unwrap();
    }

    let session = db.session().unwrap();
    assert_eq!(LogEntry::count(&session).unwrap(), 0);
}

#[test]
fn explicit_rollback() {
    let (_dir, db) = file_db();
    let session = db.session().unwrap();

    entry("kept").create(&session).unwrap();
    entry("dropped").add(&session).unwrap();
    session.rollback().unwrap();

    let all = LogEntry::all(&session).unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].message, "kept");
}

#[test]
fn commit_without_writes_is_a_no_op() {
    let (_dir, db) = file_db();
    let session = db.session().unwrap();
    session.commit().unwrap();
    session.rollback().unwrap();
    assert!(!session.in_transaction());
}

#[test]
fn database_handle_moves_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Database>();

    let (_dir, db) = file_db();
    for i in 0..3 {
        let db = db.clone();
        std::thread::spawn(move || {
            let session = db.session().unwrap();
            entry(&format!("thread {i}")).create(&session).unwrap();
        })
        .join()
        .unwrap();
    }

    let session = db.session().unwrap();
    assert_eq!(LogEntry::count(&session).unwrap(), 3);
}
