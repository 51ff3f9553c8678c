use super::domain::RequestStatus;

/// Rules applied before any status change is persisted.
///
/// `forward_only` rejects transitions that do not move the request further
/// along the fulfillment ladder. Switching it off restores the permissive
/// behavior where staff may relabel a request freely, except that a
/// picked-up request stays closed in both modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPolicy {
    pub forward_only: bool,
}

impl Default for TransitionPolicy {
    fn default() -> Self {
        Self { forward_only: true }
    }
}

impl TransitionPolicy {
    pub fn authorize(
        &self,
        current: RequestStatus,
        next: RequestStatus,
    ) -> Result<(), TransitionError> {
        if current.is_terminal() {
            return Err(TransitionError::AlreadyPickedUp);
        }
        if self.forward_only && next.rank() <= current.rank() {
            return Err(TransitionError::NotForward {
                from: current,
                to: next,
            });
        }
        Ok(())
    }
}

/// Error enumeration for rejected status changes.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("unrecognized status '{label}'")]
    UnknownStatus { label: String },
    #[error("request is already picked up and its lifecycle is closed")]
    AlreadyPickedUp,
    #[error("transition from '{}' to '{}' does not move the request forward", from.label(), to.label())]
    NotForward {
        from: RequestStatus,
        to: RequestStatus,
    },
}
