//! Nullable infrastructure for deterministic testing.
//!
//! The two external collaborators of the verification flow, the vendor
//! challenge runtime and the advice backend, are abstracted behind
//! traits. This crate provides test-friendly implementations that:
//! - Return deterministic, scriptable values
//! - Record every call for assertions
//! - Never touch the network
//!
//! Usage: swap the real implementations for nullables in tests and in
//! the local dev harness.

pub mod backend;
pub mod driver;

pub use backend::{BackendCall, NullBackend};
pub use driver::NullScriptDriver;
