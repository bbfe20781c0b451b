//! Durable storage for captured leads.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;

use super::domain::{LeadFields, Submission, SubmissionId, SubmissionPatch, SubmissionStatus};

/// Storage abstraction so the contact service can run against in-memory
/// doubles in tests as well as the file-backed production store.
pub trait SubmissionStore: Send + Sync {
    /// All records, newest first. An empty store yields an empty sequence.
    fn list(&self) -> Result<Vec<Submission>, StoreError>;
    /// Persist a validated field set; assigns the identifier and creation
    /// timestamp and starts the lifecycle at `new`. Durable before return.
    fn create(&self, fields: LeadFields) -> Result<Submission, StoreError>;
    /// Partial update. `None` for an unknown identifier.
    fn update(
        &self,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, StoreError>;
    /// Removing an unknown identifier is a no-op.
    fn delete(&self, id: &SubmissionId) -> Result<(), StoreError>;
    /// Per-id no-op semantics; partial existence is fine.
    fn delete_many(&self, ids: &[SubmissionId]) -> Result<(), StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("store holds invalid records: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// File-backed store keeping the whole collection as one JSON array,
/// rewritten wholesale on every mutation (matching the deployed site's
/// layout).
///
/// The in-process mutex serializes callers within one server. Separate
/// processes sharing the file still race on the read-modify-write cycle
/// (last writer wins); accepted limitation for this low-traffic tool.
pub struct JsonFileStore {
    path: PathBuf,
    records: Mutex<Vec<Submission>>,
}

impl JsonFileStore {
    /// Load the collection at `path`, treating a missing file as empty.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let records = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(err) => return Err(StoreError::Io(err)),
        };
        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn persist(&self, records: &[Submission]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_vec_pretty(records)?)?;
        Ok(())
    }
}

fn newest_first(mut records: Vec<Submission>) -> Vec<Submission> {
    records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    records
}

impl SubmissionStore for JsonFileStore {
    fn list(&self) -> Result<Vec<Submission>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(newest_first(guard.clone()))
    }

    fn create(&self, fields: LeadFields) -> Result<Submission, StoreError> {
        let submission = Submission {
            id: SubmissionId::random(),
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            company: fields.company,
            subject: fields.subject,
            message: fields.message,
            created_at: Utc::now(),
            status: SubmissionStatus::New,
        };

        let mut guard = self.records.lock().expect("store mutex poisoned");
        let mut next = guard.clone();
        next.push(submission.clone());
        self.persist(&next)?;
        *guard = next;
        Ok(submission)
    }

    fn update(
        &self,
        id: &SubmissionId,
        patch: SubmissionPatch,
    ) -> Result<Option<Submission>, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let mut next = guard.clone();
        let Some(record) = next.iter_mut().find(|record| record.id == *id) else {
            return Ok(None);
        };

        patch.apply(record);
        let updated = record.clone();
        self.persist(&next)?;
        *guard = next;
        Ok(Some(updated))
    }

    fn delete(&self, id: &SubmissionId) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if !guard.iter().any(|record| record.id == *id) {
            return Ok(());
        }

        let next: Vec<Submission> = guard
            .iter()
            .filter(|record| record.id != *id)
            .cloned()
            .collect();
        self.persist(&next)?;
        *guard = next;
        Ok(())
    }

    fn delete_many(&self, ids: &[SubmissionId]) -> Result<(), StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let next: Vec<Submission> = guard
            .iter()
            .filter(|record| !ids.contains(&record.id))
            .cloned()
            .collect();
        if next.len() == guard.len() {
            return Ok(());
        }

        self.persist(&next)?;
        *guard = next;
        Ok(())
    }
}
