pub mod api;
pub mod auth;
pub mod cli;
pub mod cloudsession;
pub mod config;
pub mod database;
pub mod error;
pub mod filter;
pub mod handlers;
pub mod logging;
pub mod middleware;
pub mod router;
pub mod services;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use router::app;
pub use state::AppState;
