//! Fundamental types for the advisor verification flow.
//!
//! This crate defines the types shared across every other crate in the
//! workspace: proof tokens, site keys, the action tag, and the opaque
//! handles used to address interactive challenge widgets.

pub mod action;
pub mod keys;
pub mod token;
pub mod widget;

pub use action::ActionTag;
pub use keys::SiteKey;
pub use token::{InteractiveToken, InvisibleToken};
pub use widget::{ContainerId, WidgetId};
