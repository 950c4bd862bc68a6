//! Resource-provisioning orchestration worker.
//!
//! Receives named jobs, advances a persisted resource through the
//! `ALLOCATED → PROVISIONING → PROVISIONED` lifecycle, and delegates the
//! actual provisioning side effects to agent sub-jobs whose completion it
//! waits on with a bounded poll loop. Failed sub-jobs are classified into
//! typed errors; transient handler failures retry under a bounded,
//! fixed-delay policy.

pub mod agents;
pub mod cli;
pub mod config;
pub mod error;
pub mod job;
pub mod orchestrator;
pub mod queue;
pub mod registry;
pub mod state_machine;
pub mod store;

pub use config::OrcConfig;
pub use error::{AgentFailure, OrcError};
pub use job::{HandlerResult, Job, JobResponse, JobStatus, RetryPolicy};
pub use orchestrator::{PollSettings, ProvisioningOrchestrator};
pub use registry::{HandlerRegistry, JobHandler};
pub use state_machine::{ResourceDocument, ResourceState};
pub use store::ResourceStore;
