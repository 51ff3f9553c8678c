use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::domain::{
    DocumentRequest, ListFilter, RequestId, RequestStatus, RequestUpdate, TimelineEntry,
    UpdateReceipt,
};

/// Storage abstraction so the service layer can be exercised in isolation.
pub trait RequestStore: Send + Sync {
    /// Persist a new record, enforcing uniqueness of the request code.
    fn insert(&self, record: DocumentRequest) -> Result<DocumentRequest, StoreError>;

    /// Point lookup by request code.
    fn fetch(&self, id: &RequestId) -> Result<Option<DocumentRequest>, StoreError>;

    /// First record matching the search rule, in the store's natural order.
    fn search(&self, term: &str) -> Result<Option<DocumentRequest>, StoreError>;

    /// All records passing the optional equality filters.
    fn list(&self, filter: &ListFilter) -> Result<Vec<DocumentRequest>, StoreError>;

    /// Merge non-lifecycle fields into a record and refresh `updated_at`.
    fn update_fields(
        &self,
        id: &RequestId,
        update: RequestUpdate,
    ) -> Result<UpdateReceipt, StoreError>;

    /// Set the status and append its ledger entry as one combined write.
    fn advance(
        &self,
        id: &RequestId,
        status: RequestStatus,
        entry: TimelineEntry,
    ) -> Result<DocumentRequest, StoreError>;

    /// Replace the ledger verbatim. Administrative override storage op.
    fn replace_timeline(
        &self,
        id: &RequestId,
        timeline: Vec<TimelineEntry>,
    ) -> Result<UpdateReceipt, StoreError>;
}

/// Error enumeration for persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request code '{0}' is already taken")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Search rule: exact code match, name substring, or exact email, all
/// case-insensitive.
fn matches_search(record: &DocumentRequest, term: &str) -> bool {
    if record.request_id.as_str().eq_ignore_ascii_case(term) {
        return true;
    }
    if record.applicant.email.eq_ignore_ascii_case(term) {
        return true;
    }
    record
        .applicant
        .name
        .to_lowercase()
        .contains(&term.to_lowercase())
}

/// Mutex-guarded store keeping records in insertion order.
#[derive(Default, Clone)]
pub struct InMemoryRequestStore {
    records: Arc<Mutex<Vec<DocumentRequest>>>,
}

impl RequestStore for InMemoryRequestStore {
    fn insert(&self, record: DocumentRequest) -> Result<DocumentRequest, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        if guard
            .iter()
            .any(|existing| existing.request_id == record.request_id)
        {
            return Err(StoreError::Conflict(record.request_id.0.clone()));
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<DocumentRequest>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard.iter().find(|record| &record.request_id == id).cloned())
    }

    fn search(&self, term: &str) -> Result<Option<DocumentRequest>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .find(|record| matches_search(record, term))
            .cloned())
    }

    fn list(&self, filter: &ListFilter) -> Result<Vec<DocumentRequest>, StoreError> {
        let guard = self.records.lock().expect("store mutex poisoned");
        Ok(guard
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }

    fn update_fields(
        &self,
        id: &RequestId,
        update: RequestUpdate,
    ) -> Result<UpdateReceipt, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.request_id == id)
            .ok_or(StoreError::NotFound)?;

        if let Some(document) = update.document {
            record.document = document;
        }
        if let Some(purpose) = update.purpose {
            record.purpose = purpose;
        }
        if let Some(expected) = update.expected_completion {
            record.expected_completion = expected;
        }
        record.updated_at = Utc::now();

        Ok(UpdateReceipt {
            matched: 1,
            modified: 1,
        })
    }

    fn advance(
        &self,
        id: &RequestId,
        status: RequestStatus,
        entry: TimelineEntry,
    ) -> Result<DocumentRequest, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.request_id == id)
            .ok_or(StoreError::NotFound)?;

        // Status, ledger entry, and updated_at change under one lock so a
        // reader never observes half of a transition.
        record.status = status;
        record.timeline.push(entry);
        record.updated_at = Utc::now();

        Ok(record.clone())
    }

    fn replace_timeline(
        &self,
        id: &RequestId,
        timeline: Vec<TimelineEntry>,
    ) -> Result<UpdateReceipt, StoreError> {
        let mut guard = self.records.lock().expect("store mutex poisoned");
        let record = guard
            .iter_mut()
            .find(|record| &record.request_id == id)
            .ok_or(StoreError::NotFound)?;

        record.timeline = timeline;
        record.updated_at = Utc::now();

        Ok(UpdateReceipt {
            matched: 1,
            modified: 1,
        })
    }
}
