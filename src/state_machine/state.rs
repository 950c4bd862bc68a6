use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle stage of a persisted resource.
///
/// A resource flows monotonically through
/// `ALLOCATED → PROVISIONING → PROVISIONED`; no stage is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceState {
    Allocated,
    Provisioning,
    Provisioned,
}

impl ResourceState {
    /// The stage that follows this one, or `None` for the terminal stage.
    pub fn next(self) -> Option<ResourceState> {
        match self {
            ResourceState::Allocated => Some(ResourceState::Provisioning),
            ResourceState::Provisioning => Some(ResourceState::Provisioned),
            ResourceState::Provisioned => None,
        }
    }

    /// Whether moving to `target` is a single monotonic step.
    pub fn can_advance_to(self, target: ResourceState) -> bool {
        self.next() == Some(target)
    }

    /// Only `PROVISIONED` is a terminal success state.
    pub fn is_terminal(self) -> bool {
        matches!(self, ResourceState::Provisioned)
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceState::Allocated => write!(f, "ALLOCATED"),
            ResourceState::Provisioning => write!(f, "PROVISIONING"),
            ResourceState::Provisioned => write!(f, "PROVISIONED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn states_advance_in_order() {
        assert_eq!(
            ResourceState::Allocated.next(),
            Some(ResourceState::Provisioning)
        );
        assert_eq!(
            ResourceState::Provisioning.next(),
            Some(ResourceState::Provisioned)
        );
        assert_eq!(ResourceState::Provisioned.next(), None);
    }

    #[test]
    fn no_stage_is_skipped() {
        assert!(ResourceState::Allocated.can_advance_to(ResourceState::Provisioning));
        assert!(!ResourceState::Allocated.can_advance_to(ResourceState::Provisioned));
        assert!(!ResourceState::Provisioning.can_advance_to(ResourceState::Allocated));
    }

    #[test]
    fn only_provisioned_is_terminal() {
        assert!(!ResourceState::Allocated.is_terminal());
        assert!(!ResourceState::Provisioning.is_terminal());
        assert!(ResourceState::Provisioned.is_terminal());
    }

    #[test]
    fn serde_uses_screaming_case() {
        let json = serde_json::to_string(&ResourceState::Provisioning).unwrap();
        assert_eq!(json, r#""PROVISIONING""#);
        let back: ResourceState = serde_json::from_str(r#""ALLOCATED""#).unwrap();
        assert_eq!(back, ResourceState::Allocated);
    }

    #[test]
    fn state_display() {
        assert_eq!(ResourceState::Allocated.to_string(), "ALLOCATED");
        assert_eq!(ResourceState::Provisioning.to_string(), "PROVISIONING");
        assert_eq!(ResourceState::Provisioned.to_string(), "PROVISIONED");
    }
}
