//! The access guard: who may see or mutate which configuration.
//!
//! Pure policy check — no IO, no panics. The HTTP layer resolves the rows
//! and passes everything in; the guard only compares edges and state.

use thiserror::Error;

use ausbau_auth::ActingIdentity;
use ausbau_projects::ConstructionProject;

use crate::configuration::Configuration;

/// What the caller intends to do with the configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessMode {
    /// Listing, detail, pricing, export.
    Read,
    /// Replace-items, rename, destroy. Denied on locked configurations.
    Mutate,
    /// Locking. Permitted on locked configurations (idempotent no-op).
    Lock,
    /// Forking a fresh draft. Permitted regardless of lock state.
    Copy,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AccessError {
    /// The acting identity is not a customer; customer-owned resources
    /// never evaluate ownership for admin sessions.
    #[error("session guard does not match this resource")]
    WrongGuard,

    /// The project belongs to a different customer.
    #[error("project is owned by another customer")]
    NotOwner,

    /// The configuration does not belong to the given project.
    #[error("configuration belongs to another project")]
    ForeignConfiguration,

    /// Mutation attempted on a locked configuration.
    #[error("configuration is locked")]
    Locked,
}

/// Decide whether `identity` may perform `mode` on `project` (and, when
/// given, `configuration`). All-or-nothing: any failed edge denies the
/// whole request.
pub fn authorize(
    identity: &ActingIdentity,
    project: &ConstructionProject,
    configuration: Option<&Configuration>,
    mode: AccessMode,
) -> Result<(), AccessError> {
    let customer_id = identity.customer_id().ok_or(AccessError::WrongGuard)?;

    if project.customer_id != customer_id {
        return Err(AccessError::NotOwner);
    }

    if let Some(configuration) = configuration {
        if configuration.project_id != project.id {
            return Err(AccessError::ForeignConfiguration);
        }
        if mode == AccessMode::Mutate && configuration.is_locked {
            return Err(AccessError::Locked);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ausbau_core::{AdminId, CustomerId};
    use ausbau_projects::{ProjectDetails, ProjectId};
    use chrono::Utc;

    fn project_for(customer_id: CustomerId) -> ConstructionProject {
        ConstructionProject::new(
            customer_id,
            "Lindenhof 3",
            ProjectDetails::default(),
            Utc::now(),
        )
        .unwrap()
    }

    fn configuration_on(project_id: ProjectId) -> Configuration {
        Configuration::new(project_id, "Variant A", Utc::now()).unwrap()
    }

    #[test]
    fn owner_passes_every_mode() {
        let customer = CustomerId::new();
        let identity = ActingIdentity::Customer(customer);
        let project = project_for(customer);
        let config = configuration_on(project.id);

        for mode in [
            AccessMode::Read,
            AccessMode::Mutate,
            AccessMode::Lock,
            AccessMode::Copy,
        ] {
            assert_eq!(authorize(&identity, &project, Some(&config), mode), Ok(()));
        }
    }

    #[test]
    fn foreign_customer_is_denied_for_every_mode_and_configuration() {
        let project = project_for(CustomerId::new());
        let intruder = ActingIdentity::Customer(CustomerId::new());
        let config = configuration_on(project.id);

        for mode in [
            AccessMode::Read,
            AccessMode::Mutate,
            AccessMode::Lock,
            AccessMode::Copy,
        ] {
            assert_eq!(
                authorize(&intruder, &project, None, mode),
                Err(AccessError::NotOwner)
            );
            assert_eq!(
                authorize(&intruder, &project, Some(&config), mode),
                Err(AccessError::NotOwner)
            );
        }
    }

    #[test]
    fn admin_sessions_never_reach_ownership_evaluation() {
        let customer = CustomerId::new();
        let project = project_for(customer);
        let admin = ActingIdentity::Admin(AdminId::new());

        assert_eq!(
            authorize(&admin, &project, None, AccessMode::Read),
            Err(AccessError::WrongGuard)
        );
    }

    #[test]
    fn configuration_must_hang_off_the_given_project() {
        let customer = CustomerId::new();
        let identity = ActingIdentity::Customer(customer);
        let project = project_for(customer);
        let stray = configuration_on(ProjectId::new());

        assert_eq!(
            authorize(&identity, &project, Some(&stray), AccessMode::Read),
            Err(AccessError::ForeignConfiguration)
        );
    }

    #[test]
    fn lock_state_blocks_mutation_but_not_lock_copy_or_read() {
        let customer = CustomerId::new();
        let identity = ActingIdentity::Customer(customer);
        let project = project_for(customer);
        let mut config = configuration_on(project.id);
        config.lock(Utc::now());

        assert_eq!(
            authorize(&identity, &project, Some(&config), AccessMode::Mutate),
            Err(AccessError::Locked)
        );
        for mode in [AccessMode::Read, AccessMode::Lock, AccessMode::Copy] {
            assert_eq!(authorize(&identity, &project, Some(&config), mode), Ok(()));
        }
    }
}
