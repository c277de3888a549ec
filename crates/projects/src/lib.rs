//! `ausbau-projects` — customer accounts and their construction projects.

pub mod customer;
pub mod project;
pub mod rooms;

pub use customer::Customer;
pub use project::{ConstructionProject, ProjectDetails, ProjectId};
pub use rooms::{ProjectBathroom, ProjectBathroomId, ProjectRoom, ProjectRoomId};
