// handlers/protected/mod.rs - Handlers that act on behalf of a logged-in user
//
// The session middleware has already resolved the bearer token into a
// `CurrentSession`; each handler decides how to answer anonymous callers.

pub mod auth;
pub mod project;
