//! Per-request call context.

use docvault_core::types::id::UserId;

/// Identity of the caller performing a service operation.
///
/// Carried explicitly through every mutating call so events always record
/// who acted; there is no ambient/global current-user state.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext {
    /// The acting user.
    pub user_id: UserId,
}

impl RequestContext {
    /// Build a context for the given acting user.
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }
}
