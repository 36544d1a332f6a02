//! Shared utilities for the advisor workspace.

pub mod logging;
pub mod redact;

pub use logging::init_tracing;
pub use redact::redact;
