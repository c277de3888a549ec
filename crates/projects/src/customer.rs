use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ausbau_core::{CustomerId, DomainError, DomainResult};

/// A customer account, managed by admins.
///
/// Credentials are not stored here; authentication happens outside the
/// system and arrives as a signed token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub email: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("customer name must not be empty"));
        }

        let email = email.into().trim().to_lowercase();
        // Coarse shape check; deliverability is someone else's problem.
        let well_formed = email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
        if !well_formed {
            return Err(DomainError::validation(format!(
                "'{email}' is not a usable email address"
            )));
        }

        Ok(Self {
            id: CustomerId::new(),
            name,
            email,
            active: true,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_email_case_and_whitespace() {
        let c = Customer::new("Miriam Vogt", "  Miriam.Vogt@Example.COM ", Utc::now()).unwrap();
        assert_eq!(c.email, "miriam.vogt@example.com");
        assert!(c.active);
    }

    #[test]
    fn rejects_unusable_emails() {
        assert!(Customer::new("A", "plainly-wrong", Utc::now()).is_err());
        assert!(Customer::new("A", "@example.com", Utc::now()).is_err());
        assert!(Customer::new("A", "a@nodot", Utc::now()).is_err());
    }

    #[test]
    fn rejects_blank_names() {
        assert!(Customer::new("  ", "a@example.com", Utc::now()).is_err());
    }
}
