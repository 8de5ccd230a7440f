use loyalty_core::{DomainError, DomainResult};

use crate::CallerId;

/// Authorization gate around the single privileged identity.
///
/// The owner is fixed at construction and never changes for the life of the
/// process; ownership transfer is deliberately not modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnerGate {
    owner: CallerId,
}

impl OwnerGate {
    pub fn new(owner: CallerId) -> Self {
        Self { owner }
    }

    pub fn owner(&self) -> &CallerId {
        &self.owner
    }

    /// Reject any caller that is not the owner.
    ///
    /// - No IO
    /// - No panics
    /// - No side effects (pure policy check)
    pub fn require_owner(&self, caller: &CallerId) -> DomainResult<()> {
        if caller == &self.owner {
            Ok(())
        } else {
            Err(DomainError::Unauthorized)
        }
    }
}
