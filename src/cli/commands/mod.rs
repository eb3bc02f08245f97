pub mod health;
pub mod migrate;
pub mod sessions;
