//! Challenge-vendor site keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A site key registered with the challenge vendor.
///
/// Each verification tier is configured with its own key: the invisible
/// tier's key parameterizes the loader script, the interactive tier's
/// key parameterizes widget rendering. Keys are public identifiers, not
/// secrets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteKey(String);

impl SiteKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SiteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
