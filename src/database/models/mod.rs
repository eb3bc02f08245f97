pub mod project;
pub mod session;
pub mod user;

pub use project::{NewProject, OwnedUpdate, Project, ProjectDetails, ProjectType};
pub use session::{NewSession, SessionRecord};
pub use user::User;
