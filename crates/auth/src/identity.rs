use serde::{Deserialize, Serialize};

use ausbau_core::{AdminId, CustomerId};

/// Authentication guard a session belongs to.
///
/// Admin and customer sessions are mutually exclusive: a token carries
/// exactly one guard tag, and route groups accept exactly one guard.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Guard {
    Admin,
    Customer,
}

impl core::fmt::Display for Guard {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Guard::Admin => write!(f, "admin"),
            Guard::Customer => write!(f, "customer"),
        }
    }
}

/// The authenticated actor behind a request.
///
/// Passed explicitly into every access check; there is no ambient session
/// state anywhere below the HTTP layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "guard", content = "id", rename_all = "lowercase")]
pub enum ActingIdentity {
    Admin(AdminId),
    Customer(CustomerId),
}

impl ActingIdentity {
    pub fn guard(&self) -> Guard {
        match self {
            ActingIdentity::Admin(_) => Guard::Admin,
            ActingIdentity::Customer(_) => Guard::Customer,
        }
    }

    pub fn customer_id(&self) -> Option<CustomerId> {
        match self {
            ActingIdentity::Customer(id) => Some(*id),
            ActingIdentity::Admin(_) => None,
        }
    }

    pub fn admin_id(&self) -> Option<AdminId> {
        match self {
            ActingIdentity::Admin(id) => Some(*id),
            ActingIdentity::Customer(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_tags_are_exclusive() {
        let admin = ActingIdentity::Admin(AdminId::new());
        let customer = ActingIdentity::Customer(CustomerId::new());

        assert_eq!(admin.guard(), Guard::Admin);
        assert_eq!(customer.guard(), Guard::Customer);
        assert!(admin.customer_id().is_none());
        assert!(customer.admin_id().is_none());
    }
}
