//! Action tags scoping invisible-token requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The tag an invisible token is minted against.
///
/// The vendor binds each token to the action it was requested for, so
/// the backend can reject tokens minted for a different flow.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionTag(String);

impl ActionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ActionTag {
    /// The advice-submission action used throughout this workspace.
    fn default() -> Self {
        Self("submit_advice".to_string())
    }
}

impl fmt::Display for ActionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
