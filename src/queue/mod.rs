//! Client side of the job queue: submit a named job, then poll its status.
//!
//! The queue transport itself is an external collaborator; this module only
//! defines the interface the orchestrator consumes ([`JobDispatcher`],
//! [`JobHandle`]) and an HTTP gateway implementation.

pub mod client;
pub mod error;
pub mod types;

pub use client::HttpQueueClient;
pub use error::QueueError;
pub use types::{JobStatusView, SubmitRequest, SubmitResponse};

use async_trait::async_trait;

/// Submits named jobs to the queue.
#[async_trait]
pub trait JobDispatcher: Send + Sync {
    /// Submit a job and return a handle that can be polled for completion.
    async fn submit(&self, job_name: &str, payload: &str)
    -> Result<Box<dyn JobHandle>, QueueError>;
}

/// Poll handle for one submitted job. The queue owns the authoritative
/// status; the handle holds a view refreshed by [`sync`](JobHandle::sync).
#[async_trait]
pub trait JobHandle: Send + std::fmt::Debug {
    /// The last synchronized status view.
    fn status(&self) -> &JobStatusView;

    /// Refresh the view from the queue and return it.
    async fn sync(&mut self) -> Result<&JobStatusView, QueueError>;
}
