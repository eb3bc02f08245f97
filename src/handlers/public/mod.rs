// handlers/public/mod.rs - Public handlers (no session required)
//
// Account registration and token acquisition.

pub mod auth;
