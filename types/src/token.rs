//! Single-use verification proof tokens.
//!
//! Both token kinds wrap the opaque string minted by the challenge
//! runtime. They are consumed exactly once by a backend call and never
//! cached or reused. `Debug` output is truncated so a full token can
//! never leak into a log line.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Proof minted by the invisible (score-based) verification tier.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvisibleToken(String);

/// Proof produced by the interactive (checkbox) challenge after the
/// user completes it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InteractiveToken(String);

impl InvisibleToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl InteractiveToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for InvisibleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InvisibleToken({})", truncated(&self.0))
    }
}

impl fmt::Debug for InteractiveToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InteractiveToken({})", truncated(&self.0))
    }
}

/// First few characters of a token, enough to correlate log lines.
fn truncated(token: &str) -> String {
    const VISIBLE: usize = 8;
    let mut head: String = token.chars().take(VISIBLE).collect();
    if token.chars().count() > VISIBLE {
        head.push('…');
    }
    head
}
