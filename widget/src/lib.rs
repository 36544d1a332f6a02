//! Widget runtime adapter.
//!
//! The third-party challenge runtime (script loading, widget rendering,
//! token issuance) is an external capability. This crate splits it into
//! two layers:
//!
//! - [`ScriptDriver`]: the raw vendor boundary. One method per primitive
//!   the vendor exposes, each async operation resolving exactly once
//!   with one success and one failure path. No callback registration
//!   leaks out of this trait.
//! - [`RuntimeAdapter`]: the guarantees the rest of the workspace relies
//!   on, layered over any driver: idempotent load-once initialization,
//!   fresh single-use token minting, clear-before-render idempotence,
//!   and site-key configuration checks.
//!
//! The core state machine and dispatcher depend only on these types,
//! never on ambient vendor globals, so tests substitute a scripted
//! driver (see `advisor-nullables`).

pub mod adapter;
pub mod driver;
pub mod error;

pub use adapter::RuntimeAdapter;
pub use driver::ScriptDriver;
pub use error::WidgetError;
