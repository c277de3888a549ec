use serde::{Deserialize, Serialize};
use uuid::Uuid;

use ausbau_core::{DomainError, DomainResult, impl_uuid_newtype};

use crate::project::ProjectId;

/// Project room identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectRoomId(Uuid);

/// Project bathroom identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectBathroomId(Uuid);

impl_uuid_newtype!(ProjectRoomId, "ProjectRoomId");
impl_uuid_newtype!(ProjectBathroomId, "ProjectBathroomId");

/// A room within a project that configuration items can target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRoom {
    pub id: ProjectRoomId,
    pub project_id: ProjectId,
    pub name: String,
}

impl ProjectRoom {
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            id: ProjectRoomId::new(),
            project_id,
            name: non_blank(name, "room name")?,
        })
    }
}

/// A bathroom within a project; kept separate from rooms because the
/// catalog scopes bathroom categories differently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBathroom {
    pub id: ProjectBathroomId,
    pub project_id: ProjectId,
    pub name: String,
}

impl ProjectBathroom {
    pub fn new(project_id: ProjectId, name: impl Into<String>) -> DomainResult<Self> {
        Ok(Self {
            id: ProjectBathroomId::new(),
            project_id,
            name: non_blank(name, "bathroom name")?,
        })
    }
}

fn non_blank(value: impl Into<String>, label: &str) -> DomainResult<String> {
    let value = value.into().trim().to_string();
    if value.is_empty() {
        return Err(DomainError::validation(format!("{label} must not be empty")));
    }
    Ok(value)
}
