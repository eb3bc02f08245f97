pub mod auth;
pub mod response;

pub use auth::{client_host, session_middleware, CurrentSession};
pub use response::{ApiResponse, ApiResult};
