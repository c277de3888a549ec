use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{CustomerId, DomainError, DomainResult, impl_uuid_newtype};

/// Construction project identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl_uuid_newtype!(ProjectId, "ProjectId");

/// Measured figures shown on the export document (not money).
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectDetails {
    pub facade_area_sqm: f64,
    pub balcony_meters: f64,
    pub balustrade_meters: f64,
}

impl ProjectDetails {
    pub fn validate(&self) -> DomainResult<()> {
        for (label, value) in [
            ("facade_area_sqm", self.facade_area_sqm),
            ("balcony_meters", self.balcony_meters),
            ("balustrade_meters", self.balustrade_meters),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(DomainError::validation(format!(
                    "{label} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// A construction project, owned by exactly one customer.
///
/// `customer_id` is immutable after creation; the owning edge is what every
/// access check hangs off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstructionProject {
    pub id: ProjectId,
    pub customer_id: CustomerId,
    pub name: String,
    pub details: ProjectDetails,
    pub created_at: DateTime<Utc>,
}

impl ConstructionProject {
    pub fn new(
        customer_id: CustomerId,
        name: impl Into<String>,
        details: ProjectDetails,
        created_at: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("project name must not be empty"));
        }
        details.validate()?;

        Ok(Self {
            id: ProjectId::new(),
            customer_id,
            name,
            details,
            created_at,
        })
    }

    /// Year the project was created in; selects the effective price table.
    pub fn creation_year(&self) -> i32 {
        self.created_at.year()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn creation_year_drives_price_table_resolution() {
        let created = Utc.with_ymd_and_hms(2024, 11, 3, 10, 0, 0).unwrap();
        let p = ConstructionProject::new(
            CustomerId::new(),
            "Birkenweg 12",
            ProjectDetails::default(),
            created,
        )
        .unwrap();
        assert_eq!(p.creation_year(), 2024);
    }

    #[test]
    fn rejects_negative_or_non_finite_details() {
        let bad = ProjectDetails {
            facade_area_sqm: -1.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let nan = ProjectDetails {
            balcony_meters: f64::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());

        assert!(ProjectDetails::default().validate().is_ok());
    }

    #[test]
    fn rejects_blank_project_names() {
        let err = ConstructionProject::new(
            CustomerId::new(),
            "   ",
            ProjectDetails::default(),
            Utc::now(),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
