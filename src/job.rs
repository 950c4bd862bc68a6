//! Job and response types shared by the registry and the handlers.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Terminal outcome of a single handler attempt. Failures are raised as
/// [`OrcError`](crate::error::OrcError) instead of a variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerResult {
    Success,
    Retry,
}

/// A named unit of work delivered to the worker or submitted by it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: String,
    /// Selects the handler in the registry.
    pub name: String,
    /// `"create"` or a transition verb; only meaningful for dispatch jobs.
    pub operation: String,
    /// Target resource document id.
    pub resource_name: String,
    /// Opaque payload, typically JSON.
    pub content: String,
    /// Positional parameters for non-create operations.
    pub arguments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Job {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            operation: String::new(),
            resource_name: String::new(),
            content: String::new(),
            arguments: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_operation(mut self, operation: impl Into<String>) -> Self {
        self.operation = operation.into();
        self
    }

    pub fn with_resource(mut self, resource_name: impl Into<String>) -> Self {
        self.resource_name = resource_name.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_arguments<I, S>(mut self, arguments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments = arguments.into_iter().map(Into::into).collect();
        self
    }
}

/// Mutable status attached to a running or completed job.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatus {
    pub completed: bool,
    pub success: bool,
    /// Populated on failure.
    pub code: Option<String>,
    /// Append-only progress messages.
    pub messages: Vec<String>,
    /// Monotone failure counter consulted by the retry policy.
    pub failures: u32,
}

impl JobStatus {
    pub fn add_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn last_message(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }

    /// Record one failure and return the updated count.
    pub fn record_failure(&mut self) -> u32 {
        self.failures += 1;
        self.failures
    }
}

/// Response builder handed to every handler invocation. Lives for the whole
/// job instance, so the failure counter survives `Retry` round-trips.
#[derive(Debug, Clone, Default)]
pub struct JobResponse {
    content: Option<String>,
    status: JobStatus,
}

impl JobResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = Some(content.into());
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn status(&self) -> &JobStatus {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut JobStatus {
        &mut self.status
    }
}

/// Bounded, fixed-delay retry policy applied to handler results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Failure-count ceiling; at or below it a transient failure retries.
    pub max_retries: u32,
    /// Fixed delay between attempts in milliseconds.
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 4,
            delay_ms: 2000,
        }
    }
}

impl RetryPolicy {
    /// Whether a job with this many recorded failures may retry. The
    /// comparison is `failures <= max_retries`; past the ceiling a handler
    /// must return a terminal result.
    pub fn should_retry(&self, failures: u32) -> bool {
        failures <= self.max_retries
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}
