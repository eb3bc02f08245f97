pub mod error;
#[allow(clippy::module_inception)]
pub mod filter;
pub mod filter_order;
pub mod types;

pub use error::FilterError;
pub use filter::{Filter, ListQuery};
pub use types::*;
