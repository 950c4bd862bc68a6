//! The provisioning state machine: drives a resource through
//! `ALLOCATED → PROVISIONING → PROVISIONED`, delegating side effects to
//! agent sub-jobs and waiting on them with a bounded poll loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::agents::AgentRoster;
use crate::error::{OrcError, classify_agent_failure};
use crate::job::{HandlerResult, Job, JobResponse, RetryPolicy};
use crate::queue::JobDispatcher;
use crate::registry::{HandlerRegistry, JobHandler};
use crate::state_machine::{ResourceDocument, ResourceState};
use crate::store::ResourceStore;

/// Create/transition entry point.
pub const POST_SERVER_JOB: &str = "do_post_orc_server_v1";
/// Read entry point.
pub const GET_SERVER_JOB: &str = "do_get_orc_server_v1";
/// Sub-job that fans a transition out to the configured agents.
pub const RUN_AGENTS_JOB: &str = "do_run_global_agents_v1";
/// Validation sub-job triggered fire-and-forget after a create.
pub const VALIDATE_ASSET_JOB: &str = "do_validate_inventory_asset_v1";

/// Declared-but-unimplemented operations, all served by [`StubHandler`].
pub const STUB_JOBS: [&str; 7] = [
    "do_allocate_nova_instance_v1",
    "do_update_inventory_asset_v1",
    "do_validate_inventory_asset_v1",
    "do_allocate_neutron_port_v1",
    "do_update_monkier_dnsrecord_v1",
    "do_create_nova_instance_v1",
    "do_boot_nova_instance_v1",
];

/// The one stub with a hard-coded transient-retry case.
pub const FLAKY_STUB_JOB: &str = "do_update_inventory_asset_v1";

/// Poll loop settings for the synchronous wait on a sub-job.
#[derive(Debug, Clone)]
pub struct PollSettings {
    /// Sleep between status refreshes.
    pub interval: Duration,
    /// Upper bound on the total wait; exceeding it raises
    /// [`OrcError::Timeout`] instead of blocking forever.
    pub max_wait: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_wait: Duration::from_secs(300),
        }
    }
}

/// Core decision logic for one resource type.
pub struct ProvisioningOrchestrator {
    store: Arc<ResourceStore>,
    dispatcher: Arc<dyn JobDispatcher>,
    agents_file: PathBuf,
    poll: PollSettings,
}

impl ProvisioningOrchestrator {
    pub fn new(
        store: Arc<ResourceStore>,
        dispatcher: Arc<dyn JobDispatcher>,
        agents_file: impl Into<PathBuf>,
        poll: PollSettings,
    ) -> Self {
        Self {
            store,
            dispatcher,
            agents_file: agents_file.into(),
            poll,
        }
    }

    /// Read path: fetch the document verbatim.
    pub async fn get_resource(&self, resource_name: &str) -> Result<String, OrcError> {
        if resource_name.is_empty() {
            return Err(OrcError::BadRequest(
                "resource name must not be empty".to_string(),
            ));
        }
        self.store.get(resource_name).await
    }

    /// Write path: branch on the job's operation.
    pub async fn post_resource(
        &self,
        job: &Job,
        resp: &mut JobResponse,
    ) -> Result<(), OrcError> {
        if job.operation == "create" {
            self.create(job).await
        } else {
            self.transition(job, resp).await
        }
    }

    async fn create(&self, job: &Job) -> Result<(), OrcError> {
        if job.resource_name.is_empty() {
            return Err(OrcError::BadRequest(
                "create requires a resource name".to_string(),
            ));
        }
        let doc = ResourceDocument::from_create_payload(&job.resource_name, &job.content)?;
        let contents = doc.to_json()?;

        {
            let _guard = self.store.lock(&job.resource_name).await;
            // Create-or-overwrite: a repeat create silently re-allocates.
            if self.store.exists(&job.resource_name).await? {
                warn!(resource = %job.resource_name, "create overwrites an existing document");
            }
            self.store.put(&job.resource_name, &contents).await?;
        }
        info!(resource = %job.resource_name, "resource allocated");

        // Advisory validation trigger; the create does not wait on it.
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            if let Err(err) = dispatcher.submit(VALIDATE_ASSET_JOB, &contents).await {
                warn!(%err, "validation trigger failed");
            }
        });

        Ok(())
    }

    async fn transition(&self, job: &Job, resp: &mut JobResponse) -> Result<(), OrcError> {
        let name = job
            .arguments
            .first()
            .map(String::as_str)
            .unwrap_or(&job.resource_name);
        if name.is_empty() {
            return Err(OrcError::BadRequest(
                "transition requires a resource name".to_string(),
            ));
        }

        let _guard = self.store.lock(name).await;
        let mut doc = ResourceDocument::from_json(&self.store.get(name).await?)?;
        doc.advance_to(ResourceState::Provisioning)?;
        self.store.put(name, &doc.to_json()?).await?;

        // Re-read per transition so roster edits apply without a restart.
        let roster = AgentRoster::load(&self.agents_file).await?;
        let agents = roster.agents_for(&job.operation).ok_or_else(|| {
            OrcError::BadRequest(format!(
                "no agents configured for operation {}",
                job.operation
            ))
        })?;

        resp.status_mut().add_message("calling agents");
        let payload = serde_json::json!({
            "agents": agents,
            "content": doc.to_json()?,
        })
        .to_string();
        let mut handle = self.dispatcher.submit(RUN_AGENTS_JOB, &payload).await?;

        // Synchronous wait: sleep-and-sync until the sub-job is terminal or
        // the bound expires. A timeout leaves the resource PROVISIONING.
        let mut waited = Duration::ZERO;
        while !handle.status().completed {
            if waited >= self.poll.max_wait {
                return Err(OrcError::Timeout {
                    job: RUN_AGENTS_JOB.to_string(),
                    waited_ms: waited.as_millis() as u64,
                });
            }
            sleep(self.poll.interval).await;
            waited += self.poll.interval;
            handle.sync().await?;
        }

        let status = handle.status();
        if !status.success {
            // No rollback: the document stays PROVISIONING.
            let code = status.code.clone().unwrap_or_default();
            return Err(classify_agent_failure(&code, status.last_message()));
        }

        doc.advance_to(ResourceState::Provisioned)?;
        self.store.put(name, &doc.to_json()?).await?;
        info!(resource = name, operation = %job.operation, "resource provisioned");
        Ok(())
    }

    /// Register this worker's handler surface on a registry.
    pub fn register_handlers(
        self: &Arc<Self>,
        registry: &mut HandlerRegistry,
        retry: RetryPolicy,
        stub_delay: Duration,
    ) {
        registry.register(
            GET_SERVER_JOB,
            Arc::new(GetServerHandler { orc: self.clone() }),
        );
        registry.register(
            POST_SERVER_JOB,
            Arc::new(PostServerHandler { orc: self.clone() }),
        );
        for name in STUB_JOBS {
            registry.register(
                name,
                Arc::new(StubHandler {
                    transient: name == FLAKY_STUB_JOB,
                    retry: retry.clone(),
                    work_delay: stub_delay,
                }),
            );
        }
    }
}

/// `do_get_orc_server_v1`: return the stored document as the response body.
pub struct GetServerHandler {
    orc: Arc<ProvisioningOrchestrator>,
}

#[async_trait]
impl JobHandler for GetServerHandler {
    async fn handle(&self, job: &Job, resp: &mut JobResponse) -> Result<HandlerResult, OrcError> {
        let contents = self.orc.get_resource(&job.resource_name).await?;
        resp.set_content(contents);
        Ok(HandlerResult::Success)
    }
}

/// `do_post_orc_server_v1`: create or transition a resource.
pub struct PostServerHandler {
    orc: Arc<ProvisioningOrchestrator>,
}

#[async_trait]
impl JobHandler for PostServerHandler {
    async fn handle(&self, job: &Job, resp: &mut JobResponse) -> Result<HandlerResult, OrcError> {
        self.orc.post_resource(job, resp).await?;
        Ok(HandlerResult::Success)
    }
}

/// Placeholder for operations the worker declares but does not implement:
/// succeeds after a fixed delay, with one transient-retry case used to
/// exercise the bounded retry policy.
pub struct StubHandler {
    transient: bool,
    retry: RetryPolicy,
    work_delay: Duration,
}

impl StubHandler {
    pub fn new(transient: bool, retry: RetryPolicy, work_delay: Duration) -> Self {
        Self {
            transient,
            retry,
            work_delay,
        }
    }
}

#[async_trait]
impl JobHandler for StubHandler {
    async fn handle(&self, job: &Job, resp: &mut JobResponse) -> Result<HandlerResult, OrcError> {
        let status = resp.status_mut();
        status.add_message(format!("Working on job {}", job.name));

        if self.transient {
            status.add_message("Failed to connect to inventory system! Retrying.");
            let failures = status.record_failure();
            if self.retry.should_retry(failures) {
                sleep(self.retry.delay()).await;
                return Ok(HandlerResult::Retry);
            }
        }

        sleep(self.work_delay).await;
        Ok(HandlerResult::Success)
    }
}
