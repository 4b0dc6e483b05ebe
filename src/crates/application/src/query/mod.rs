use thiserror::Error;

pub mod cover_cache;
pub mod dao;
pub mod get_cover_art;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Execution error: {0}")]
    ExecutionError(String),
    #[error("Database error: {0}")]
    DbError(String),
    #[error("Cache error: {0}")]
    CacheError(String),
}
