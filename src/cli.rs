//! Command-line interface: inject a single job into the worker's handler
//! surface, mainly for debugging a deployment without the queue in the
//! loop.

use clap::{Parser, Subcommand};

/// Resource-provisioning orchestration worker.
#[derive(Debug, Parser)]
#[command(name = "orc-worker", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Path to the worker configuration file.
    #[arg(long, global = true, default_value = "orc-worker.toml")]
    pub config: String,

    /// Enable verbose (debug) logging.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Read a resource document and print it.
    Get {
        /// Resource name to read.
        resource: String,
    },

    /// Create a resource or run a transition against it.
    Post {
        /// Operation: "create" or a transition verb such as "provision".
        operation: String,

        /// Target resource name.
        resource: String,

        /// JSON payload for create operations.
        #[arg(long, default_value = "{}")]
        content: String,
    },

    /// List the job names this worker registers handlers for.
    Jobs,
}
