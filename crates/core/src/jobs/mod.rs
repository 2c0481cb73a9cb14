//! The pipeline jobs: discovery, bulk snapshot, and network observation.
//!
//! Each job is a plain struct with a `run` method taking the page driver by
//! `&mut impl PageDriver`, so the browser backend is injected by the caller
//! and the jobs can be exercised against a scripted fake.

mod discover;
mod observe;
mod snapshot;

pub use discover::{DiscoveryConfig, DiscoveryJob, DiscoverySummary};
pub use observe::{ObserveConfig, ObserveJob, ObserveSummary};
pub use snapshot::{SnapshotConfig, SnapshotJob, SnapshotSummary};

use crate::session::SessionError;
use crate::store::StoreError;

/// Only two things terminate a run: the browser/transport giving out beneath
/// a job, and the durable stores being unusable. Everything narrower is
/// converted into data (sentinel values, ERROR rows) at its own scope.
#[derive(Debug)]
pub enum JobError {
    Session(SessionError),
    Store(StoreError),
}

impl std::fmt::Display for JobError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobError::Session(e) => write!(f, "session error: {}", e),
            JobError::Store(e) => write!(f, "store error: {}", e),
        }
    }
}

impl std::error::Error for JobError {}

impl From<SessionError> for JobError {
    fn from(e: SessionError) -> Self {
        JobError::Session(e)
    }
}

impl From<StoreError> for JobError {
    fn from(e: StoreError) -> Self {
        JobError::Store(e)
    }
}
