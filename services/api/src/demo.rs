use std::sync::Arc;

use clap::Args;

use civic_docs::error::AppError;
use civic_docs::requests::{
    Applicant, DocumentRequestService, InMemoryRequestStore, RequestPolicy, RequestStatus,
    RequestSubmission, TimelineState, TransitionPolicy,
};

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Document type requested in the walkthrough
    #[arg(long, default_value = "Barangay Clearance")]
    pub(crate) document: String,
    /// Allow out-of-order status changes during the walkthrough
    #[arg(long)]
    pub(crate) permissive: bool,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let policy = RequestPolicy {
        transitions: TransitionPolicy {
            forward_only: !args.permissive,
        },
        ..RequestPolicy::default()
    };
    let service = DocumentRequestService::new(Arc::new(InMemoryRequestStore::default()), policy);

    println!("Document request walkthrough");

    let record = service.submit(RequestSubmission {
        document: args.document,
        applicant: Applicant {
            name: "Jane Doe".to_string(),
            contact: "09170000000".to_string(),
            email: "jane@doe.com".to_string(),
        },
        purpose: "Employment".to_string(),
    })?;
    println!("  submitted {} for '{}'", record.request_id, record.document);
    println!("  expected completion {}", record.expected_completion);

    let updated = service.advance(&record.request_id, RequestStatus::Processing.label())?;
    println!("  advanced to {}", updated.status.label());

    if args.permissive {
        let relabeled = service.advance(&record.request_id, RequestStatus::Pending.label())?;
        println!(
            "  relabeled back to {} (permissive mode)",
            relabeled.status.label()
        );
        let updated = service.advance(&record.request_id, RequestStatus::Processing.label())?;
        println!("  advanced to {}", updated.status.label());
    }

    for status in [RequestStatus::ReadyForPickup, RequestStatus::PickedUp] {
        let updated = service.advance(&record.request_id, status.label())?;
        println!("  advanced to {}", updated.status.label());
    }

    let closed = service.get(&record.request_id)?;
    println!("\nLedger for {}", closed.request_id);
    for entry in &closed.timeline {
        let state = match entry.status {
            TimelineState::Completed => "Completed",
            TimelineState::Pending => "Pending",
        };
        let date = entry
            .date
            .map(|date| date.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "(open)".to_string());
        println!("  {:<20} {:<10} {}", entry.step, state, date);
    }

    if let Err(err) = service.advance(&closed.request_id, RequestStatus::Processing.label()) {
        println!("\nFurther changes rejected: {err}");
    }

    Ok(())
}
