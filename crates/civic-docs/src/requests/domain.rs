use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Ledger step recorded the moment a submission is accepted.
pub const STEP_SUBMITTED: &str = "Request Submitted";

/// Ledger step seeded alongside it as the first pending action for staff.
pub const STEP_INITIAL_REVIEW: &str = "Initial Review";

/// Identifier wrapper for tracked document requests.
///
/// The generated request code doubles as the storage key; once assigned it
/// never changes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Contact details captured at submission. Immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Applicant {
    pub name: String,
    pub contact: String,
    pub email: String,
}

/// High level status tracked across the document request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Processing,
    #[serde(rename = "Ready for Pickup")]
    ReadyForPickup,
    #[serde(rename = "Picked-up")]
    PickedUp,
}

impl RequestStatus {
    pub const fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Processing => "Processing",
            RequestStatus::ReadyForPickup => "Ready for Pickup",
            RequestStatus::PickedUp => "Picked-up",
        }
    }

    /// Position along the fulfillment ladder; later steps compare greater.
    pub const fn rank(self) -> u8 {
        match self {
            RequestStatus::Pending => 0,
            RequestStatus::Processing => 1,
            RequestStatus::ReadyForPickup => 2,
            RequestStatus::PickedUp => 3,
        }
    }

    /// A picked-up request accepts no further transitions.
    pub const fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::PickedUp)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Pending" => Some(RequestStatus::Pending),
            "Processing" => Some(RequestStatus::Processing),
            "Ready for Pickup" => Some(RequestStatus::ReadyForPickup),
            "Picked-up" => Some(RequestStatus::PickedUp),
            _ => None,
        }
    }
}

/// Completion marker for a single ledger step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimelineState {
    Pending,
    Completed,
}

/// One entry in the append-only lifecycle ledger.
///
/// Entries are only ever appended; insertion order is chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub step: String,
    pub date: Option<DateTime<Utc>>,
    pub status: TimelineState,
}

impl TimelineEntry {
    pub fn completed(step: impl Into<String>, date: DateTime<Utc>) -> Self {
        Self {
            step: step.into(),
            date: Some(date),
            status: TimelineState::Completed,
        }
    }

    pub fn pending(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            date: None,
            status: TimelineState::Pending,
        }
    }
}

/// The central record tracked from submission through pickup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub request_id: RequestId,
    pub status: RequestStatus,
    pub document: String,
    pub applicant: Applicant,
    pub purpose: String,
    pub date_requested: DateTime<Utc>,
    pub expected_completion: NaiveDate,
    pub timeline: Vec<TimelineEntry>,
    pub updated_at: DateTime<Utc>,
}

/// Payload accepted from the public submission form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestSubmission {
    pub document: String,
    pub applicant: Applicant,
    pub purpose: String,
}

/// Partial update for the non-lifecycle fields of a record.
///
/// Status and timeline are deliberately absent; those move together through
/// the lifecycle engine only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_completion: Option<NaiveDate>,
}

/// Optional equality filters applied to listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListFilter {
    #[serde(default)]
    pub status: Option<RequestStatus>,
    #[serde(default)]
    pub document: Option<String>,
}

impl ListFilter {
    pub fn matches(&self, record: &DocumentRequest) -> bool {
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(document) = &self.document {
            if &record.document != document {
                return false;
            }
        }
        true
    }
}

/// Acknowledgement for keyed mutations, reporting matched/modified counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateReceipt {
    pub matched: u64,
    pub modified: u64,
}
