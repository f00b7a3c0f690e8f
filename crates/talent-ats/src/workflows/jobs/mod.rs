//! Job catalogue: postings, listing filters, and the storage seam behind them.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    default_catalogue, parse_list, Job, JobFilter, JobId, JobInput, JobType, ListInput,
};
pub use repository::{FileJobRepository, InMemoryJobRepository, JobRepository};
pub use router::job_router;
pub use service::{JobCatalog, JobError};
