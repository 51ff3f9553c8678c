//! Document request intake, lifecycle tracking, and search.
//!
//! The service facade owns every status and timeline write. The repository
//! trait carries the single combined update that keeps the two in step, the
//! lifecycle policy decides which transitions are allowed, and the router
//! exposes the citizen- and staff-facing endpoints.

pub mod domain;
pub mod identifier;
pub mod lifecycle;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    Applicant, DocumentRequest, ListFilter, RequestId, RequestStatus, RequestSubmission,
    RequestUpdate, TimelineEntry, TimelineState, UpdateReceipt, STEP_INITIAL_REVIEW,
    STEP_SUBMITTED,
};
pub use lifecycle::{TransitionError, TransitionPolicy};
pub use repository::{InMemoryRequestStore, RequestStore, StoreError};
pub use router::request_router;
pub use service::{
    DocumentRequestService, RequestPolicy, RequestServiceError, ValidationError,
};
