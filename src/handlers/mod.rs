// handlers/mod.rs - Request handlers grouped by who may call them
//
// Public (no session) → Protected (acting for a logged-in user)

pub mod protected;
pub mod public;
