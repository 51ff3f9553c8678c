use std::sync::Arc;

use chrono::Utc;
use moka::sync::Cache;
use tracing::{info, warn};

use super::domain::{
    DocumentRequest, ListFilter, RequestId, RequestStatus, RequestSubmission, RequestUpdate,
    TimelineEntry, UpdateReceipt, STEP_INITIAL_REVIEW, STEP_SUBMITTED,
};
use super::identifier;
use super::lifecycle::{TransitionError, TransitionPolicy};
use super::repository::{RequestStore, StoreError};

const RECORD_CACHE_CAPACITY: u64 = 1024;

/// Tunable intake and lifecycle policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestPolicy {
    /// Days promised for fulfillment, added to the submission date.
    pub completion_days: i64,
    /// Transition rules applied before any status write.
    pub transitions: TransitionPolicy,
    /// Attempts at minting a unique request code before giving up.
    pub id_attempts: u32,
}

impl Default for RequestPolicy {
    fn default() -> Self {
        Self {
            completion_days: 5,
            transitions: TransitionPolicy::default(),
            id_attempts: 5,
        }
    }
}

/// Service composing the identifier generator, transition policy, and store.
///
/// Every status and timeline write funnels through here; the store never
/// sees a status change without its matching ledger entry. Point reads go
/// through a bounded record cache that is refreshed or dropped on each
/// write, with the store remaining the source of truth.
pub struct DocumentRequestService<S> {
    store: Arc<S>,
    policy: RequestPolicy,
    cache: Cache<RequestId, DocumentRequest>,
}

impl<S> DocumentRequestService<S>
where
    S: RequestStore + 'static,
{
    pub fn new(store: Arc<S>, policy: RequestPolicy) -> Self {
        Self {
            store,
            policy,
            cache: Cache::new(RECORD_CACHE_CAPACITY),
        }
    }

    /// Accept a public submission and persist the seeded record.
    ///
    /// The record starts as `Pending` with the submission ledger entry
    /// completed and the initial review entry still open. Request codes are
    /// reminted on insert conflicts up to the policy's attempt limit.
    pub fn submit(
        &self,
        submission: RequestSubmission,
    ) -> Result<DocumentRequest, RequestServiceError> {
        validate(&submission)?;

        let now = Utc::now();
        let expected_completion =
            (now + chrono::Duration::days(self.policy.completion_days)).date_naive();

        let mut attempts = 0;
        loop {
            attempts += 1;
            let request_id = identifier::mint(&submission.document);
            let record = DocumentRequest {
                request_id: request_id.clone(),
                status: RequestStatus::Pending,
                document: submission.document.clone(),
                applicant: submission.applicant.clone(),
                purpose: submission.purpose.clone(),
                date_requested: now,
                expected_completion,
                timeline: vec![
                    TimelineEntry::completed(STEP_SUBMITTED, now),
                    TimelineEntry::pending(STEP_INITIAL_REVIEW),
                ],
                updated_at: now,
            };

            match self.store.insert(record) {
                Ok(stored) => {
                    info!(
                        request_id = %stored.request_id,
                        document = %stored.document,
                        "document request recorded"
                    );
                    self.cache.insert(stored.request_id.clone(), stored.clone());
                    return Ok(stored);
                }
                Err(StoreError::Conflict(code)) if attempts < self.policy.id_attempts => {
                    warn!(%code, attempts, "request code collision, reminting");
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Apply a status transition, appending its ledger entry atomically.
    pub fn advance(
        &self,
        id: &RequestId,
        label: &str,
    ) -> Result<DocumentRequest, RequestServiceError> {
        let next =
            RequestStatus::from_label(label).ok_or_else(|| TransitionError::UnknownStatus {
                label: label.to_string(),
            })?;

        let current = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        self.policy.transitions.authorize(current.status, next)?;

        let entry = TimelineEntry::completed(next.label(), Utc::now());
        let updated = self.store.advance(id, next, entry)?;
        self.cache.insert(updated.request_id.clone(), updated.clone());
        info!(
            request_id = %updated.request_id,
            status = next.label(),
            "document request advanced"
        );
        Ok(updated)
    }

    /// Fetch one record by request code, read-through cached.
    pub fn get(&self, id: &RequestId) -> Result<DocumentRequest, RequestServiceError> {
        if let Some(hit) = self.cache.get(id) {
            return Ok(hit);
        }
        let record = self.store.fetch(id)?.ok_or(StoreError::NotFound)?;
        self.cache.insert(record.request_id.clone(), record.clone());
        Ok(record)
    }

    /// Resolve a search term against request code, applicant name, or email.
    pub fn search(&self, term: &str) -> Result<Option<DocumentRequest>, RequestServiceError> {
        Ok(self.store.search(term)?)
    }

    /// List records, optionally narrowed by equality filters.
    pub fn list(&self, filter: &ListFilter) -> Result<Vec<DocumentRequest>, RequestServiceError> {
        Ok(self.store.list(filter)?)
    }

    /// Merge non-lifecycle fields into a record.
    pub fn update(
        &self,
        id: &RequestId,
        update: RequestUpdate,
    ) -> Result<UpdateReceipt, RequestServiceError> {
        let receipt = self.store.update_fields(id, update)?;
        self.cache.invalidate(id);
        Ok(receipt)
    }

    /// Replace a record's ledger verbatim, bypassing the transition rules.
    ///
    /// Administrative override only; the regular lifecycle never rewrites
    /// history, and callers are expected to keep status and ledger
    /// consistent themselves.
    pub fn overwrite_timeline(
        &self,
        id: &RequestId,
        timeline: Vec<TimelineEntry>,
    ) -> Result<UpdateReceipt, RequestServiceError> {
        let receipt = self.store.replace_timeline(id, timeline)?;
        self.cache.invalidate(id);
        warn!(request_id = %id, "timeline overwritten outside the lifecycle engine");
        Ok(receipt)
    }
}

fn validate(submission: &RequestSubmission) -> Result<(), ValidationError> {
    required("document", &submission.document)?;
    required("applicant.name", &submission.applicant.name)?;
    required("applicant.contact", &submission.applicant.contact)?;
    required("applicant.email", &submission.applicant.email)?;
    required("purpose", &submission.purpose)?;
    Ok(())
}

fn required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField { field });
    }
    Ok(())
}

/// Error raised when a submission is missing required data.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("required field '{field}' is missing or blank")]
    MissingField { field: &'static str },
}

/// Error raised by the request service.
#[derive(Debug, thiserror::Error)]
pub enum RequestServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
}
