use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use orc_worker::cli::{Cli, Command};
use orc_worker::orchestrator::{GET_SERVER_JOB, POST_SERVER_JOB};
use orc_worker::queue::HttpQueueClient;
use orc_worker::{HandlerRegistry, Job, OrcConfig, ProvisioningOrchestrator, ResourceStore};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = OrcConfig::load(&cli.config)?;
    let store = Arc::new(ResourceStore::new(&config.db_dir));
    let dispatcher = Arc::new(HttpQueueClient::new(config.queue_url.clone()));
    let orc = Arc::new(ProvisioningOrchestrator::new(
        store,
        dispatcher,
        &config.agents_file,
        config.poll_settings(),
    ));

    let mut registry = HandlerRegistry::new();
    orc.register_handlers(&mut registry, config.retry_policy(), config.stub_delay());

    match cli.command {
        Command::Get { resource } => {
            let job = Job::new(GET_SERVER_JOB).with_resource(resource);
            run_job(&registry, &job).await
        }
        Command::Post {
            operation,
            resource,
            content,
        } => {
            let job = Job::new(POST_SERVER_JOB)
                .with_operation(operation)
                .with_resource(&resource)
                .with_content(content)
                .with_arguments([resource]);
            run_job(&registry, &job).await
        }
        Command::Jobs => {
            let mut names = registry.job_names();
            names.sort_unstable();
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
    }
}

async fn run_job(registry: &HandlerRegistry, job: &Job) -> Result<()> {
    let resp = registry.dispatch(job).await?;
    for message in &resp.status().messages {
        eprintln!("{message}");
    }
    if !resp.status().success {
        let code = resp.status().code.as_deref().unwrap_or("500");
        anyhow::bail!("job failed ({code})");
    }
    if let Some(content) = resp.content() {
        println!("{content}");
    }
    Ok(())
}
