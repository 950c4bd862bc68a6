//! Agent roster: which agents run for each transition operation.
//!
//! The roster is a JSON file mapping a transition name to an ordered list
//! of agent identifiers, e.g.
//! `{"provision": ["nova-agent", "dns-agent"]}`. It is an external
//! collaborator file and is re-read on every transition so edits take
//! effect without a restart.

use std::path::Path;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::fs;

use crate::error::OrcError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentRoster(HashMap<String, Vec<String>>);

impl AgentRoster {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, OrcError> {
        let contents = fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Ordered agent list for a transition operation, if one is configured.
    pub fn agents_for(&self, operation: &str) -> Option<&[String]> {
        self.0.get(operation).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_the_conf_format() {
        let roster: AgentRoster = serde_json::from_str(
            r#"{"provision": ["nova-agent", "inventory-agent", "dns-agent"]}"#,
        )
        .unwrap();
        assert_eq!(
            roster.agents_for("provision").unwrap(),
            ["nova-agent", "inventory-agent", "dns-agent"]
        );
        assert!(roster.agents_for("decommission").is_none());
    }

    #[tokio::test]
    async fn load_reads_a_roster_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("agents.conf");
        std::fs::write(&path, r#"{"provision": ["a1"], "rename": ["a2", "a3"]}"#).unwrap();

        let roster = AgentRoster::load(&path).await.unwrap();
        assert_eq!(roster.agents_for("provision").unwrap(), ["a1"]);
        assert_eq!(roster.agents_for("rename").unwrap(), ["a2", "a3"]);
    }

    #[tokio::test]
    async fn load_surfaces_missing_file() {
        let err = AgentRoster::load("/nonexistent/agents.conf")
            .await
            .unwrap_err();
        assert!(matches!(err, OrcError::Io(_)));
    }
}
