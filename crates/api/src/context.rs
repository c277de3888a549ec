use ausbau_auth::ActingIdentity;
use ausbau_core::{AdminId, CustomerId};

use crate::app::errors::ApiError;

/// Identity context for a request.
///
/// Inserted by the auth middleware; immutable and present on every
/// protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct IdentityContext {
    identity: ActingIdentity,
}

impl IdentityContext {
    pub fn new(identity: ActingIdentity) -> Self {
        Self { identity }
    }

    pub fn identity(&self) -> ActingIdentity {
        self.identity
    }
}

/// Customer route groups: a session of the wrong guard is redirected to its
/// own home instead of evaluating ownership.
pub fn require_customer(ctx: &IdentityContext) -> Result<CustomerId, ApiError> {
    ctx.identity()
        .customer_id()
        .ok_or(ApiError::WrongGuard(ctx.identity().guard()))
}

/// Admin route groups: same exclusivity, other direction.
pub fn require_admin(ctx: &IdentityContext) -> Result<AdminId, ApiError> {
    ctx.identity()
        .admin_id()
        .ok_or(ApiError::WrongGuard(ctx.identity().guard()))
}
