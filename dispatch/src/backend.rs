//! The backend call contract, one operation per endpoint.

use crate::error::DispatchError;
use crate::outcome::SubmissionOutcome;
use advisor_types::{InteractiveToken, InvisibleToken};

/// The three advice endpoints, abstracted so the session orchestrator
/// can run against the real HTTP client or a scripted fake.
///
/// Implementations classify their own responses; callers only ever see
/// a [`SubmissionOutcome`] or a pre-response [`DispatchError`].
#[allow(async_fn_in_trait)]
pub trait AdviceBackend {
    /// Submit with a freshly minted invisible-tier proof.
    async fn invisible(
        &self,
        prompt: &str,
        token: &InvisibleToken,
    ) -> Result<SubmissionOutcome, DispatchError>;

    /// Submit with a completed interactive-challenge proof.
    async fn interactive(
        &self,
        prompt: &str,
        token: &InteractiveToken,
    ) -> Result<SubmissionOutcome, DispatchError>;

    /// Submit with no proof, for a session that already passed an
    /// interactive challenge.
    async fn bypass(&self, prompt: &str) -> Result<SubmissionOutcome, DispatchError>;
}
