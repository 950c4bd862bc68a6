//! Handler registry: maps queue job names to handler implementations and
//! drives each dispatched job to a terminal result.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::error::OrcError;
use crate::job::{HandlerResult, Job, JobResponse};

/// One handler per queue job name.
///
/// A handler may return [`HandlerResult::Retry`] for transient failures it
/// has recorded on the response status, but must eventually return a
/// terminal result or raise an [`OrcError`]; retrying forever is not
/// permitted by the contract.
#[async_trait]
pub trait JobHandler: Send + Sync {
    async fn handle(&self, job: &Job, resp: &mut JobResponse) -> Result<HandlerResult, OrcError>;
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn JobHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a handler to a job name. Registering a name twice replaces the
    /// prior binding; the replacement is logged so it never happens
    /// silently.
    pub fn register(&mut self, name: impl Into<String>, handler: Arc<dyn JobHandler>) {
        let name = name.into();
        if self.handlers.insert(name.clone(), handler).is_some() {
            warn!(job = %name, "replacing existing handler registration");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn job_names(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Dispatch a job to its handler and drive it to a terminal result.
    ///
    /// The same [`JobResponse`] is carried across `Retry` attempts, so the
    /// failure counter a handler records is visible on the next attempt.
    /// An unregistered name fails with [`OrcError::NotImplemented`] before
    /// any response exists; a raised handler error terminates the job as a
    /// failed status carrying the error's code, with its message appended
    /// as the last status message.
    pub async fn dispatch(&self, job: &Job) -> Result<JobResponse, OrcError> {
        let handler = self
            .handlers
            .get(&job.name)
            .cloned()
            .ok_or_else(|| OrcError::NotImplemented(job.name.clone()))?;

        let mut resp = JobResponse::new();
        loop {
            match handler.handle(job, &mut resp).await {
                Ok(HandlerResult::Success) => {
                    let status = resp.status_mut();
                    status.completed = true;
                    status.success = true;
                    debug!(job = %job.name, resource = %job.resource_name, "job succeeded");
                    return Ok(resp);
                }
                Ok(HandlerResult::Retry) => {
                    debug!(
                        job = %job.name,
                        failures = resp.status().failures,
                        "handler requested retry"
                    );
                }
                Err(err) => {
                    error!(job = %job.name, code = err.code(), %err, "job failed");
                    let status = resp.status_mut();
                    status.completed = true;
                    status.success = false;
                    status.code = Some(err.code().to_string());
                    status.add_message(err.to_string());
                    return Ok(resp);
                }
            }
        }
    }
}
