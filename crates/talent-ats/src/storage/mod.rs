//! Persistence adapters and the row mapping shared by them.

pub mod mapping;
pub mod memory;
pub mod postgres;

use std::path::PathBuf;

pub use memory::InMemoryApplicationRepository;
pub use postgres::{PostgresApplicationRepository, PostgresJobRepository};

/// Error enumeration for repository failures.
///
/// `Conflict` is a rejection the caller can act on (duplicate candidate for a job); `Unavailable`
/// is transient I/O.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Failures while bringing a storage backend up.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to connect to database: {0}")]
    Connect(#[source] sqlx::Error),
    #[error("failed to prepare database schema: {0}")]
    Schema(#[source] sqlx::Error),
    #[error("job cache {} could not be read: {source}", path.display())]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("job cache {} is not valid JSON: {source}", path.display())]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
