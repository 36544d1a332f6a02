//! Opaque handles for interactive challenge widgets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies the host-page slot an interactive widget renders into.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a rendered interactive widget.
///
/// Issued by the runtime adapter when a widget is rendered. The state
/// machine holds this id only to address later read/reset calls; the
/// widget itself is owned by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(u64);

impl WidgetId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "widget-{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widget_ids_compare_by_value() {
        assert_eq!(WidgetId::new(3), WidgetId::new(3));
        assert_ne!(WidgetId::new(3), WidgetId::new(4));
    }

    #[test]
    fn container_id_round_trips_through_json() {
        let id = ContainerId::new("challenge-slot");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""challenge-slot""#);
    }
}
