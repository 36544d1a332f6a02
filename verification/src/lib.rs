//! Tiered bot-verification flow.
//!
//! Two-tier defense in front of the advice backend:
//! 1. **Invisible verification**: a frictionless score-based check. The
//!    runtime mints a single-use token without user action; the backend
//!    judges the score.
//! 2. **Interactive challenge**: rendered only when the backend reports
//!    the score as too low. The user completes a visible challenge and
//!    the resulting proof accompanies the resubmission.
//!
//! A session that passes the interactive challenge once keeps that
//! status for its remaining lifetime: later submissions go straight to
//! the bypass endpoint with no proof at all. The machine never
//! transitions backward out of the passed state, and an escalated
//! episode never downgrades back to the invisible tier.

pub mod error;
pub mod session;
pub mod state;

pub use error::VerificationError;
pub use session::{AdviceSession, SessionOutcome};
pub use state::{VerificationState, VerificationTier};
