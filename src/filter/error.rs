use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Missing sort parameter")]
    MissingSort,

    #[error("Invalid sort column: {0}")]
    InvalidSort(String),

    #[error("Missing sort order parameter")]
    MissingOrder,

    #[error("Invalid sort order: {0}")]
    InvalidOrder(String),

    #[error("Invalid limit: {0}")]
    InvalidLimit(String),

    #[error("Invalid offset: {0}")]
    InvalidOffset(String),
}
