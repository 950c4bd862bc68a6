//! Error taxonomy for the orchestration worker.
//!
//! [`OrcError`] is the typed error every handler raises; the dispatcher
//! reports its `Display` output as the job's terminal failure message.
//! [`AgentFailure`] covers the failure codes the agent subsystem can emit,
//! produced by [`classify_agent_failure`].

use thiserror::Error;

/// Failures a handler can surface to the dispatcher.
#[derive(Debug, Error)]
pub enum OrcError {
    /// A read or transition presumed a resource that is not in the store.
    #[error("resource {0} not found")]
    NotFound(String),

    /// Malformed operation, arguments, or payload.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The dispatched job name has no registered handler.
    #[error("no handler registered for job {0}")]
    NotImplemented(String),

    /// A delegated sub-job did not complete within the poll bound.
    #[error("sub-job {job} did not complete within {waited_ms}ms")]
    Timeout { job: String, waited_ms: u64 },

    /// The agent subsystem reported a failure code outside the known set.
    /// Deliberately distinct from every [`AgentFailure`] variant so an
    /// unmapped code is never mistaken for the error it stood for.
    #[error("unrecognized agent error code {code}: {message}")]
    UnknownErrorCode { code: String, message: String },

    /// A classified agent failure.
    #[error(transparent)]
    Agent(#[from] AgentFailure),

    #[error("queue error: {0}")]
    Queue(#[from] crate::queue::QueueError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OrcError {
    /// Machine-readable code a failed job exposes next to its message.
    pub fn code(&self) -> &str {
        match self {
            OrcError::NotFound(_) => "404",
            OrcError::BadRequest(_) => "400",
            OrcError::NotImplemented(_) => "501",
            OrcError::Timeout { .. } => "504",
            OrcError::UnknownErrorCode { .. } => "500",
            OrcError::Agent(failure) => failure.code(),
            OrcError::Queue(_) => "502",
            OrcError::Io(_) | OrcError::Json(_) => "500",
        }
    }
}

/// Typed form of the failure codes agents can report on a sub-job.
///
/// One variant per known code; the message is the sub-job's last status
/// message verbatim.
#[derive(Debug, Error)]
pub enum AgentFailure {
    #[error("agent rejected the request: {0}")]
    BadRequest(String),

    #[error("agent denied access: {0}")]
    Forbidden(String),

    #[error("agent target not found: {0}")]
    NotFound(String),

    #[error("agent reported a conflict: {0}")]
    Conflict(String),

    #[error("agent internal error: {0}")]
    Internal(String),

    #[error("agent unavailable: {0}")]
    Unavailable(String),
}

impl AgentFailure {
    /// The wire code this variant classifies.
    pub fn code(&self) -> &'static str {
        match self {
            AgentFailure::BadRequest(_) => "400",
            AgentFailure::Forbidden(_) => "403",
            AgentFailure::NotFound(_) => "404",
            AgentFailure::Conflict(_) => "409",
            AgentFailure::Internal(_) => "500",
            AgentFailure::Unavailable(_) => "503",
        }
    }
}

/// Every code the agent subsystem is known to emit. The classifier match
/// below must cover exactly this set; the tests walk it.
pub const KNOWN_AGENT_CODES: [&str; 6] = ["400", "403", "404", "409", "500", "503"];

/// Map a failed sub-job's status code to a typed error.
///
/// Unknown codes become [`OrcError::UnknownErrorCode`] rather than any
/// default variant.
pub fn classify_agent_failure(code: &str, message: &str) -> OrcError {
    let message = message.to_string();
    match code {
        "400" => AgentFailure::BadRequest(message).into(),
        "403" => AgentFailure::Forbidden(message).into(),
        "404" => AgentFailure::NotFound(message).into(),
        "409" => AgentFailure::Conflict(message).into(),
        "500" => AgentFailure::Internal(message).into(),
        "503" => AgentFailure::Unavailable(message).into(),
        other => OrcError::UnknownErrorCode {
            code: other.to_string(),
            message,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = OrcError::NotFound("foo.example.com".into());
        assert_eq!(err.to_string(), "resource foo.example.com not found");
    }

    #[test]
    fn timeout_display() {
        let err = OrcError::Timeout {
            job: "do_run_global_agents_v1".into(),
            waited_ms: 300_000,
        };
        assert_eq!(
            err.to_string(),
            "sub-job do_run_global_agents_v1 did not complete within 300000ms"
        );
    }

    #[test]
    fn every_known_code_classifies_to_an_agent_failure() {
        for code in KNOWN_AGENT_CODES {
            match classify_agent_failure(code, "boom") {
                OrcError::Agent(failure) => assert_eq!(failure.code(), code),
                other => panic!("code {code} classified as {other:?}"),
            }
        }
    }

    #[test]
    fn unknown_code_is_not_an_agent_failure() {
        let err = classify_agent_failure("418", "short and stout");
        match err {
            OrcError::UnknownErrorCode { code, message } => {
                assert_eq!(code, "418");
                assert_eq!(message, "short and stout");
            }
            other => panic!("expected UnknownErrorCode, got {other:?}"),
        }
    }

    #[test]
    fn classified_failure_carries_the_message() {
        let err = classify_agent_failure("503", "agent pool drained");
        assert_eq!(err.to_string(), "agent unavailable: agent pool drained");
    }

    #[test]
    fn error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OrcError>();
    }
}
