pub mod project_service;
pub mod security;

pub use project_service::{ProjectError, ProjectService, SaveProject, Saved};
pub use security::{SecurityError, SecurityService};
