use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{DomainError, DomainResult, impl_uuid_newtype};
use ausbau_projects::ProjectId;

/// Configuration identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigurationId(Uuid);

impl_uuid_newtype!(ConfigurationId, "ConfigurationId");

/// A customer's saved set of item selections for one project.
///
/// Lifecycle: draft (`is_locked = false`) → locked. Locked is terminal; the
/// only way forward is forking a fresh draft via [`Configuration::fork`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub id: ConfigurationId,
    pub project_id: ProjectId,
    pub name: String,
    pub is_completed: bool,
    pub is_locked: bool,
    /// Opaque wizard-resume state owned by the frontend.
    pub last_position: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Configuration {
    pub fn new(project_id: ProjectId, name: impl Into<String>, now: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            id: ConfigurationId::new(),
            project_id,
            name: Self::validate_name(name)?,
            is_completed: false,
            is_locked: false,
            last_position: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn validate_name(name: impl Into<String>) -> DomainResult<String> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(DomainError::validation("configuration name must not be empty"));
        }
        if name.chars().count() > 200 {
            return Err(DomainError::validation("configuration name is too long"));
        }
        Ok(name)
    }

    /// Lock the configuration. Idempotent: locking a locked configuration
    /// changes nothing and reports success.
    ///
    /// Returns whether the state changed.
    pub fn lock(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_locked {
            return false;
        }
        self.is_locked = true;
        self.is_completed = true;
        self.updated_at = now;
        true
    }

    /// Name a copy of this configuration carries.
    pub fn copy_name(&self) -> String {
        format!("{} (Copy)", self.name)
    }

    /// Fork a fresh draft on the same project, regardless of lock state.
    /// Item rows are duplicated by the caller alongside this.
    pub fn fork(&self, now: DateTime<Utc>) -> Configuration {
        Configuration {
            id: ConfigurationId::new(),
            project_id: self.project_id,
            name: self.copy_name(),
            is_completed: false,
            is_locked: false,
            last_position: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> Configuration {
        Configuration::new(ProjectId::new(), "Ground floor", Utc::now()).unwrap()
    }

    #[test]
    fn starts_as_an_unlocked_draft() {
        let c = draft();
        assert!(!c.is_locked);
        assert!(!c.is_completed);
        assert!(c.last_position.is_none());
    }

    #[test]
    fn locking_is_idempotent() {
        let mut c = draft();
        assert!(c.lock(Utc::now()));
        assert!(c.is_locked);
        assert!(c.is_completed);

        let before = c.updated_at;
        assert!(!c.lock(Utc::now()));
        assert_eq!(c.updated_at, before);
    }

    #[test]
    fn fork_produces_an_unlocked_copy_with_suffixed_name() {
        let mut c = draft();
        c.last_position = Some("step-4".into());
        c.lock(Utc::now());

        let fork = c.fork(Utc::now());
        assert_eq!(fork.project_id, c.project_id);
        assert_eq!(fork.name, "Ground floor (Copy)");
        assert!(!fork.is_locked);
        assert!(!fork.is_completed);
        assert!(fork.last_position.is_none());
        assert_ne!(fork.id, c.id);
    }

    #[test]
    fn name_validation_trims_and_rejects_blank() {
        assert_eq!(Configuration::validate_name("  Attic  ").unwrap(), "Attic");
        assert!(Configuration::validate_name("   ").is_err());
        assert!(Configuration::validate_name("x".repeat(201)).is_err());
    }
}
