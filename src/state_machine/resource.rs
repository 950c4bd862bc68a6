use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ResourceState;
use crate::error::OrcError;

/// The persisted state record for one provisioned entity.
///
/// `id` and `state` are owned by the orchestrator; every other field the
/// creator supplied is carried in `extra` and written back untouched on
/// each transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    pub id: String,
    pub state: ResourceState,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceDocument {
    /// Build a freshly allocated document from a create payload.
    ///
    /// The payload must be a JSON object; any `id` or `state` fields it
    /// carries are discarded and replaced by the resource name and
    /// `ALLOCATED`.
    pub fn from_create_payload(resource_name: &str, payload: &str) -> Result<Self, OrcError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|e| OrcError::BadRequest(format!("malformed create payload: {e}")))?;
        let Value::Object(mut extra) = value else {
            return Err(OrcError::BadRequest(
                "create payload must be a JSON object".to_string(),
            ));
        };
        // Would otherwise collide with the flattened struct fields.
        extra.remove("id");
        extra.remove("state");
        Ok(Self {
            id: resource_name.to_string(),
            state: ResourceState::Allocated,
            extra,
        })
    }

    pub fn from_json(contents: &str) -> Result<Self, OrcError> {
        Ok(serde_json::from_str(contents)?)
    }

    pub fn to_json(&self) -> Result<String, OrcError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Advance the lifecycle by exactly one stage.
    pub fn advance_to(&mut self, target: ResourceState) -> Result<(), OrcError> {
        if !self.state.can_advance_to(target) {
            return Err(OrcError::BadRequest(format!(
                "invalid state transition for {}: {} -> {}",
                self.id, self.state, target
            )));
        }
        self.state = target;
        Ok(())
    }
}
