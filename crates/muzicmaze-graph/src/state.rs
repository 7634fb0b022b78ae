use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a maze build. `Ready` and `Failed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Uninitialized,
    Building,
    Ready,
    Failed,
}

impl BuildState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Ready | BuildState::Failed)
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildState::Uninitialized => write!(f, "uninitialized"),
            BuildState::Building => write!(f, "building"),
            BuildState::Ready => write!(f, "ready"),
            BuildState::Failed => write!(f, "failed"),
        }
    }
}
