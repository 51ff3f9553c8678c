use std::sync::Arc;

use chrono::Utc;

use super::common::*;
use crate::requests::domain::{RequestId, RequestStatus, TimelineEntry, TimelineState};
use crate::requests::domain::{RequestUpdate, STEP_INITIAL_REVIEW, STEP_SUBMITTED};
use crate::requests::repository::{RequestStore, StoreError};
use crate::requests::service::{
    DocumentRequestService, RequestPolicy, RequestServiceError, ValidationError,
};

#[test]
fn submit_seeds_pending_record_with_two_ledger_entries() {
    let (service, store) = build_service();

    let record = service.submit(submission()).expect("submission succeeds");

    assert_eq!(record.status, RequestStatus::Pending);
    assert!(record.request_id.as_str().starts_with("BC"));
    assert_eq!(record.timeline.len(), 2);

    let submitted = &record.timeline[0];
    assert_eq!(submitted.step, STEP_SUBMITTED);
    assert_eq!(submitted.status, TimelineState::Completed);
    assert!(submitted.date.is_some());

    let review = &record.timeline[1];
    assert_eq!(review.step, STEP_INITIAL_REVIEW);
    assert_eq!(review.status, TimelineState::Pending);
    assert!(review.date.is_none());

    assert_eq!(
        record.expected_completion,
        (record.date_requested + chrono::Duration::days(5)).date_naive()
    );

    let stored = store
        .fetch(&record.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored, record);
}

#[test]
fn submit_rejects_blank_required_fields() {
    let (service, _) = build_service();

    let mut blank_name = submission();
    blank_name.applicant.name = "  ".to_string();

    match service.submit(blank_name) {
        Err(RequestServiceError::Validation(ValidationError::MissingField { field })) => {
            assert_eq!(field, "applicant.name");
        }
        other => panic!("expected validation error, got {other:?}"),
    }

    let mut blank_document = submission();
    blank_document.document = String::new();
    assert!(matches!(
        service.submit(blank_document),
        Err(RequestServiceError::Validation(_))
    ));
}

#[test]
fn submit_surfaces_conflict_after_exhausted_remints() {
    let service = DocumentRequestService::new(Arc::new(ConflictStore), RequestPolicy::default());

    match service.submit(submission()) {
        Err(RequestServiceError::Store(StoreError::Conflict(_))) => {}
        other => panic!("expected store conflict, got {other:?}"),
    }
}

#[test]
fn completion_window_follows_policy() {
    let store = Arc::new(crate::requests::repository::InMemoryRequestStore::default());
    let service = DocumentRequestService::new(
        store,
        RequestPolicy {
            completion_days: 10,
            ..RequestPolicy::default()
        },
    );

    let record = service.submit(submission()).expect("submission succeeds");
    assert_eq!(
        record.expected_completion,
        (record.date_requested + chrono::Duration::days(10)).date_naive()
    );
}

#[test]
fn get_serves_refreshed_record_after_advance() {
    let (service, _) = build_service();
    let record = service.submit(submission()).expect("submission succeeds");

    // Prime the cache, then write through the service.
    let primed = service.get(&record.request_id).expect("record cached");
    assert_eq!(primed.status, RequestStatus::Pending);

    service
        .advance(&record.request_id, "Processing")
        .expect("transition succeeds");

    let fresh = service.get(&record.request_id).expect("record present");
    assert_eq!(fresh.status, RequestStatus::Processing);
    assert_eq!(fresh.timeline.len(), 3);
}

#[test]
fn get_propagates_not_found() {
    let (service, _) = build_service();

    match service.get(&RequestId("missing".to_string())) {
        Err(RequestServiceError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn update_merges_fields_and_refreshes_updated_at() {
    let (service, store) = build_service();
    let record = service.submit(submission()).expect("submission succeeds");
    let before = record.updated_at;

    let receipt = service
        .update(
            &record.request_id,
            RequestUpdate {
                purpose: Some("Scholarship application".to_string()),
                ..RequestUpdate::default()
            },
        )
        .expect("update succeeds");
    assert_eq!(receipt.matched, 1);
    assert_eq!(receipt.modified, 1);

    let stored = store
        .fetch(&record.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.purpose, "Scholarship application");
    assert_eq!(stored.document, record.document);
    assert_eq!(stored.applicant, record.applicant);
    assert!(stored.updated_at >= before);

    // The cache must not keep serving the pre-update record.
    let fresh = service.get(&record.request_id).expect("record present");
    assert_eq!(fresh.purpose, "Scholarship application");
}

#[test]
fn update_unknown_key_is_not_found() {
    let (service, _) = build_service();

    match service.update(&RequestId("CCnope-123".to_string()), RequestUpdate::default()) {
        Err(RequestServiceError::Store(StoreError::NotFound)) => {}
        other => panic!("expected not found error, got {other:?}"),
    }
}

#[test]
fn search_matches_code_name_and_email() {
    let (service, _) = build_service();
    let first = service.submit(submission()).expect("first submission");
    let second = service.submit(second_submission()).expect("second submission");

    let by_code = service
        .search(&first.request_id.as_str().to_lowercase())
        .expect("search succeeds")
        .expect("code matches case-insensitively");
    assert_eq!(by_code.request_id, first.request_id);

    let by_fragment = service
        .search("doe")
        .expect("search succeeds")
        .expect("name fragment matches");
    assert_eq!(by_fragment.request_id, first.request_id);

    let by_email = service
        .search("JUAN@DELACRUZ.PH")
        .expect("search succeeds")
        .expect("email matches case-insensitively");
    assert_eq!(by_email.request_id, second.request_id);

    assert!(service
        .search("nobody@example.com")
        .expect("search succeeds")
        .is_none());
}

#[test]
fn search_prefers_earliest_inserted_match() {
    let (service, _) = build_service();
    let first = service.submit(submission()).expect("first submission");

    let mut namesake = submission();
    namesake.applicant.email = "other@doe.com".to_string();
    service.submit(namesake).expect("second submission");

    let hit = service
        .search("Jane")
        .expect("search succeeds")
        .expect("fragment matches");
    assert_eq!(hit.request_id, first.request_id);
}

#[test]
fn list_applies_equality_filters() {
    let (service, _) = build_service();
    let clearance = service.submit(submission()).expect("first submission");
    service.submit(second_submission()).expect("second submission");

    service
        .advance(&clearance.request_id, "Processing")
        .expect("transition succeeds");

    let all = service
        .list(&crate::requests::domain::ListFilter::default())
        .expect("list succeeds");
    assert_eq!(all.len(), 2);

    let processing = service
        .list(&crate::requests::domain::ListFilter {
            status: Some(RequestStatus::Processing),
            document: None,
        })
        .expect("list succeeds");
    assert_eq!(processing.len(), 1);
    assert_eq!(processing[0].request_id, clearance.request_id);

    let by_document = service
        .list(&crate::requests::domain::ListFilter {
            status: None,
            document: Some("Certificate of Residency".to_string()),
        })
        .expect("list succeeds");
    assert_eq!(by_document.len(), 1);
}

#[test]
fn overwrite_timeline_replaces_ledger_verbatim() {
    let (service, store) = build_service();
    let record = service.submit(submission()).expect("submission succeeds");

    let replacement = vec![TimelineEntry::completed("Corrected intake", Utc::now())];
    let receipt = service
        .overwrite_timeline(&record.request_id, replacement.clone())
        .expect("overwrite succeeds");
    assert_eq!(receipt.modified, 1);

    let stored = store
        .fetch(&record.request_id)
        .expect("fetch succeeds")
        .expect("record present");
    assert_eq!(stored.timeline, replacement);
    // The override leaves status untouched; keeping the pair consistent is
    // the caller's burden on this path.
    assert_eq!(stored.status, RequestStatus::Pending);

    let fresh = service.get(&record.request_id).expect("record present");
    assert_eq!(fresh.timeline, replacement);
}

#[test]
fn store_outage_surfaces_as_store_error() {
    let service = DocumentRequestService::new(Arc::new(UnavailableStore), RequestPolicy::default());

    match service.submit(submission()) {
        Err(RequestServiceError::Store(StoreError::Unavailable(_))) => {}
        other => panic!("expected unavailable store error, got {other:?}"),
    }
}
