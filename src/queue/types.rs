use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body posted to the gateway's submit endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRequest {
    /// Client-generated id so a resubmitted request is deduplicated.
    pub request_id: String,
    /// Queue job name, e.g. `do_run_global_agents_v1`.
    pub job: String,
    /// Opaque payload forwarded to the job's handler.
    pub payload: String,
    pub submitted_at: DateTime<Utc>,
}

/// Gateway's answer to a submit: the queue-assigned job id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub id: String,
}

/// Read-synchronized view of a submitted job's status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobStatusView {
    pub completed: bool,
    pub success: bool,
    /// Populated when the job failed.
    #[serde(default)]
    pub code: Option<String>,
    /// Append-only progress messages, oldest first.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl JobStatusView {
    pub fn last_message(&self) -> &str {
        self.messages.last().map(String::as_str).unwrap_or_default()
    }
}
