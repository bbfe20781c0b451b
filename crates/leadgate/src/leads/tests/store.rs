use std::fs;

use tempfile::TempDir;

use super::common::*;
use crate::leads::domain::{SubmissionId, SubmissionPatch, SubmissionStatus};
use crate::leads::store::{JsonFileStore, StoreError, SubmissionStore};

fn temp_store() -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = JsonFileStore::open(dir.path().join("submissions.json")).expect("store opens");
    (dir, store)
}

fn seeded_store(records: Vec<crate::leads::domain::Submission>) -> (TempDir, JsonFileStore) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("submissions.json");
    fs::write(&path, serde_json::to_vec_pretty(&records).expect("encode")).expect("seed file");
    let store = JsonFileStore::open(path).expect("store opens");
    (dir, store)
}

#[test]
fn missing_file_reads_as_an_empty_store() {
    let (_dir, store) = temp_store();
    assert!(store.list().expect("list succeeds").is_empty());
}

#[test]
fn create_assigns_identity_and_survives_a_reopen() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("submissions.json");

    let store = JsonFileStore::open(&path).expect("store opens");
    let created = store.create(lead_fields()).expect("create succeeds");
    assert_eq!(created.status, SubmissionStatus::New);
    assert!(!created.id.0.is_empty());

    let reopened = JsonFileStore::open(&path).expect("store reopens");
    let records = reopened.list().expect("list succeeds");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0], created);
}

#[test]
fn list_returns_newest_first() {
    let older = stored(30);
    let newer = stored(1);
    let (_dir, store) = seeded_store(vec![older.clone(), newer.clone()]);

    let records = store.list().expect("list succeeds");
    assert_eq!(records[0].id, newer.id);
    assert_eq!(records[1].id, older.id);
}

#[test]
fn update_applies_a_patch_and_persists_it() {
    let record = stored(1);
    let (dir, store) = seeded_store(vec![record.clone()]);

    let updated = store
        .update(
            &record.id,
            SubmissionPatch::status(SubmissionStatus::Contacted),
        )
        .expect("update succeeds")
        .expect("record found");
    assert_eq!(updated.status, SubmissionStatus::Contacted);
    assert_eq!(updated.created_at, record.created_at);

    let reopened =
        JsonFileStore::open(dir.path().join("submissions.json")).expect("store reopens");
    let records = reopened.list().expect("list succeeds");
    assert_eq!(records[0].status, SubmissionStatus::Contacted);
}

#[test]
fn update_of_an_unknown_id_reports_not_found() {
    let (_dir, store) = temp_store();
    let outcome = store
        .update(
            &SubmissionId("missing".to_string()),
            SubmissionPatch::status(SubmissionStatus::Pending),
        )
        .expect("update succeeds");
    assert!(outcome.is_none());
}

#[test]
fn delete_is_idempotent() {
    let record = stored(1);
    let (_dir, store) = seeded_store(vec![record.clone()]);

    store.delete(&record.id).expect("first delete succeeds");
    assert!(store.list().expect("list succeeds").is_empty());

    store.delete(&record.id).expect("second delete is a no-op");
    assert!(store.list().expect("list succeeds").is_empty());
}

#[test]
fn delete_many_removes_only_the_existing_intersection() {
    let keep = stored(1);
    let gone_a = stored(2);
    let gone_b = stored(3);
    let (_dir, store) = seeded_store(vec![keep.clone(), gone_a.clone(), gone_b.clone()]);

    store
        .delete_many(&[
            gone_a.id.clone(),
            gone_b.id.clone(),
            SubmissionId("missing".to_string()),
        ])
        .expect("bulk delete succeeds");

    let records = store.list().expect("list succeeds");
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, keep.id);
}

#[test]
fn corrupt_file_surfaces_a_store_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("submissions.json");
    fs::write(&path, b"not json").expect("seed file");

    match JsonFileStore::open(path) {
        Err(StoreError::Corrupt(_)) => {}
        Err(other) => panic!("expected corrupt-store error, got {other:?}"),
        Ok(_) => panic!("corrupt file should not open"),
    }
}

#[test]
fn open_creates_missing_parent_directories_on_first_write() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("nested/data/submissions.json");

    let store = JsonFileStore::open(&path).expect("store opens");
    store.create(lead_fields()).expect("create succeeds");
    assert!(path.exists());
}
