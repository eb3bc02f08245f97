pub mod session;

pub use session::{session_get, session_logout};
