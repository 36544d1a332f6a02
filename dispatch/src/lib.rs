//! Submission dispatcher.
//!
//! Maps the current verification tier to exactly one backend call
//! contract, executes it, and classifies the response:
//!
//! - `POST /get-advice` carries the prompt plus an invisible token;
//! - `POST /get-advice/interactive` carries the prompt plus the
//!   user-entered interactive token;
//! - `POST /get-advice/bypass` carries only the prompt, for sessions
//!   that have already passed an interactive challenge.
//!
//! All three return `{ "advice": string }` on success and a non-2xx
//! status with an optional `{ "detail": string }` body otherwise. The
//! low-score escalation signal is a 400 whose detail carries the
//! [`LOW_SCORE_MARKER`]; it is a routing signal, not a failure.
//!
//! No retries happen at this layer: every failure is surfaced and the
//! user re-initiates by resubmitting.

pub mod backend;
pub mod client;
pub mod error;
pub mod outcome;

pub use backend::AdviceBackend;
pub use client::{AdviceClient, LOW_SCORE_MARKER};
pub use error::DispatchError;
pub use outcome::SubmissionOutcome;
