use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::requests::domain::{
    Applicant, DocumentRequest, ListFilter, RequestId, RequestStatus, RequestSubmission,
    RequestUpdate, TimelineEntry, UpdateReceipt,
};
use crate::requests::lifecycle::TransitionPolicy;
use crate::requests::repository::{InMemoryRequestStore, RequestStore, StoreError};
use crate::requests::router::request_router;
use crate::requests::service::{DocumentRequestService, RequestPolicy};

pub(super) fn submission() -> RequestSubmission {
    RequestSubmission {
        document: "Barangay Clearance".to_string(),
        applicant: Applicant {
            name: "Jane Doe".to_string(),
            contact: "09170000000".to_string(),
            email: "jane@doe.com".to_string(),
        },
        purpose: "Employment".to_string(),
    }
}

pub(super) fn second_submission() -> RequestSubmission {
    RequestSubmission {
        document: "Certificate of Residency".to_string(),
        applicant: Applicant {
            name: "Juan Dela Cruz".to_string(),
            contact: "09180000000".to_string(),
            email: "juan@delacruz.ph".to_string(),
        },
        purpose: "School enrollment".to_string(),
    }
}

pub(super) fn build_service() -> (
    DocumentRequestService<InMemoryRequestStore>,
    Arc<InMemoryRequestStore>,
) {
    let store = Arc::new(InMemoryRequestStore::default());
    let service = DocumentRequestService::new(store.clone(), RequestPolicy::default());
    (service, store)
}

pub(super) fn permissive_service() -> DocumentRequestService<InMemoryRequestStore> {
    DocumentRequestService::new(
        Arc::new(InMemoryRequestStore::default()),
        RequestPolicy {
            transitions: TransitionPolicy {
                forward_only: false,
            },
            ..RequestPolicy::default()
        },
    )
}

pub(super) fn request_router_with_service(
    service: DocumentRequestService<InMemoryRequestStore>,
    admin_token: Option<&str>,
) -> axum::Router {
    request_router(Arc::new(service), admin_token.map(str::to_string))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Store double whose inserts always collide.
pub(super) struct ConflictStore;

impl RequestStore for ConflictStore {
    fn insert(&self, record: DocumentRequest) -> Result<DocumentRequest, StoreError> {
        Err(StoreError::Conflict(record.request_id.0))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<DocumentRequest>, StoreError> {
        Ok(None)
    }

    fn search(&self, _term: &str) -> Result<Option<DocumentRequest>, StoreError> {
        Ok(None)
    }

    fn list(&self, _filter: &ListFilter) -> Result<Vec<DocumentRequest>, StoreError> {
        Ok(Vec::new())
    }

    fn update_fields(
        &self,
        _id: &RequestId,
        _update: RequestUpdate,
    ) -> Result<UpdateReceipt, StoreError> {
        Err(StoreError::NotFound)
    }

    fn advance(
        &self,
        _id: &RequestId,
        _status: RequestStatus,
        _entry: TimelineEntry,
    ) -> Result<DocumentRequest, StoreError> {
        Err(StoreError::NotFound)
    }

    fn replace_timeline(
        &self,
        _id: &RequestId,
        _timeline: Vec<TimelineEntry>,
    ) -> Result<UpdateReceipt, StoreError> {
        Err(StoreError::NotFound)
    }
}

/// Store double that is offline for every operation.
pub(super) struct UnavailableStore;

impl UnavailableStore {
    fn offline<T>() -> Result<T, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

impl RequestStore for UnavailableStore {
    fn insert(&self, _record: DocumentRequest) -> Result<DocumentRequest, StoreError> {
        Self::offline()
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<DocumentRequest>, StoreError> {
        Self::offline()
    }

    fn search(&self, _term: &str) -> Result<Option<DocumentRequest>, StoreError> {
        Self::offline()
    }

    fn list(&self, _filter: &ListFilter) -> Result<Vec<DocumentRequest>, StoreError> {
        Self::offline()
    }

    fn update_fields(
        &self,
        _id: &RequestId,
        _update: RequestUpdate,
    ) -> Result<UpdateReceipt, StoreError> {
        Self::offline()
    }

    fn advance(
        &self,
        _id: &RequestId,
        _status: RequestStatus,
        _entry: TimelineEntry,
    ) -> Result<DocumentRequest, StoreError> {
        Self::offline()
    }

    fn replace_timeline(
        &self,
        _id: &RequestId,
        _timeline: Vec<TimelineEntry>,
    ) -> Result<UpdateReceipt, StoreError> {
        Self::offline()
    }
}
