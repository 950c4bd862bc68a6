//! Worker configuration loaded from `orc-worker.toml`.
//!
//! Fields missing from the file fall back to defaults. The
//! `ORC_QUEUE_URL` environment variable takes precedence over the file
//! for the queue gateway address.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;

use crate::job::RetryPolicy;
use crate::orchestrator::PollSettings;

#[derive(Debug, Clone, Deserialize)]
pub struct OrcConfig {
    /// Directory holding one JSON document per resource.
    #[serde(default = "default_db_dir")]
    pub db_dir: String,

    /// Agent roster file (JSON map: operation -> ordered agent ids).
    #[serde(default = "default_agents_file")]
    pub agents_file: String,

    /// Queue gateway base URL.
    #[serde(default = "default_queue_url")]
    pub queue_url: String,

    /// Sleep between sub-job status refreshes.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Upper bound on the synchronous wait for a sub-job.
    #[serde(default = "default_poll_max_wait_ms")]
    pub poll_max_wait_ms: u64,

    /// Retry ceiling for transient handler failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between retry attempts.
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// How long the stub handlers pretend to work.
    #[serde(default = "default_stub_delay_ms")]
    pub stub_delay_ms: u64,
}

fn default_db_dir() -> String {
    "/usr/var/orc/db".to_string()
}

fn default_agents_file() -> String {
    "/etc/orc/agents.conf".to_string()
}

fn default_queue_url() -> String {
    "http://127.0.0.1:4730".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

fn default_poll_max_wait_ms() -> u64 {
    300_000
}

fn default_max_retries() -> u32 {
    4
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_stub_delay_ms() -> u64 {
    10_000
}

impl Default for OrcConfig {
    fn default() -> Self {
        Self {
            db_dir: default_db_dir(),
            agents_file: default_agents_file(),
            queue_url: default_queue_url(),
            poll_interval_ms: default_poll_interval_ms(),
            poll_max_wait_ms: default_poll_max_wait_ms(),
            max_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
            stub_delay_ms: default_stub_delay_ms(),
        }
    }
}

impl OrcConfig {
    /// Load from the given path, or defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<OrcConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(url) = std::env::var("ORC_QUEUE_URL")
            && !url.is_empty()
        {
            config.queue_url = url;
        }

        Ok(config)
    }

    pub fn poll_settings(&self) -> PollSettings {
        PollSettings {
            interval: Duration::from_millis(self.poll_interval_ms),
            max_wait: Duration::from_millis(self.poll_max_wait_ms),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            delay_ms: self.retry_delay_ms,
        }
    }

    pub fn stub_delay(&self) -> Duration {
        Duration::from_millis(self.stub_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = OrcConfig::default();
        assert_eq!(config.db_dir, "/usr/var/orc/db");
        assert_eq!(config.agents_file, "/etc/orc/agents.conf");
        assert_eq!(config.max_retries, 4);
        assert_eq!(config.retry_delay_ms, 2000);
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            db_dir = "/tmp/orc"
            poll_max_wait_ms = 60000
        "#;
        let config: OrcConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.db_dir, "/tmp/orc");
        assert_eq!(config.poll_max_wait_ms, 60_000);
        assert_eq!(config.queue_url, "http://127.0.0.1:4730");
        assert_eq!(config.max_retries, 4);
    }

    #[test]
    fn load_missing_file_falls_back_to_defaults() {
        let config = OrcConfig::load("/nonexistent/orc-worker.toml").unwrap();
        assert_eq!(config.max_retries, 4);
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("orc-worker.toml");
        std::fs::write(&path, "stub_delay_ms = 0\n").unwrap();
        let config = OrcConfig::load(&path).unwrap();
        assert_eq!(config.stub_delay_ms, 0);
    }

    #[test]
    fn helpers_translate_durations() {
        let config = OrcConfig::default();
        assert_eq!(config.poll_settings().interval, Duration::from_secs(1));
        assert_eq!(config.poll_settings().max_wait, Duration::from_secs(300));
        assert_eq!(config.retry_policy().delay(), Duration::from_secs(2));
        assert_eq!(config.stub_delay(), Duration::from_secs(10));
    }
}
