//! Session orchestrator: ties the runtime adapter, the verification
//! state machine, and the submission dispatcher into one submit
//! workflow.

use crate::error::VerificationError;
use crate::state::{VerificationState, VerificationTier};

use advisor_dispatch::{AdviceBackend, SubmissionOutcome};
use advisor_types::{ActionTag, ContainerId};
use advisor_widget::{RuntimeAdapter, ScriptDriver, WidgetError};
use tracing::{debug, info, warn};

/// The user-visible result of one submission attempt.
///
/// Every failure mode of the flow collapses into one of these; nothing
/// escapes as an unhandled fault. [`SessionOutcome::status_line`] gives
/// the single human-readable string the presentation layer shows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Advice came back; the submission is complete.
    Advice(String),
    /// The score was too low; an interactive challenge has been
    /// rendered and must be completed before resubmitting.
    ChallengeRequired,
    /// The rendered challenge has not been completed yet. No backend
    /// call was made.
    AwaitingChallenge,
    /// The backend rejected the interactive proof; the widget was reset
    /// in place for another attempt.
    ProofRejected,
    /// The challenge runtime has not finished initializing. No backend
    /// call was made.
    NotReady,
    /// A previous submission is still in flight.
    Busy,
    /// A required key or setting is absent; administrator-facing.
    ConfigError(String),
    /// The backend was unreachable or answered with an unclassified
    /// failure; the user may simply resubmit.
    TransportError(String),
}

impl SessionOutcome {
    /// The status string shown to the user.
    pub fn status_line(&self) -> String {
        match self {
            SessionOutcome::Advice(text) => text.clone(),
            SessionOutcome::ChallengeRequired => {
                "Additional verification needed. Please complete the challenge, then submit again."
                    .to_string()
            }
            SessionOutcome::AwaitingChallenge => {
                "Please complete the challenge before submitting.".to_string()
            }
            SessionOutcome::ProofRejected => {
                "Challenge verification failed. Please try the challenge again.".to_string()
            }
            SessionOutcome::NotReady => {
                "Verification is not ready yet. Please try again in a moment.".to_string()
            }
            SessionOutcome::Busy => "A submission is already in progress.".to_string(),
            SessionOutcome::ConfigError(message) => {
                format!("Configuration error: {message}. Contact the site administrator.")
            }
            SessionOutcome::TransportError(message) => {
                format!("Failed to get advice. Reason: {message}.")
            }
        }
    }
}

/// One user session of the advice flow.
///
/// Owns the singleton [`VerificationState`] so that concurrent sessions
/// (tabs, server-rendered contexts) never share verification status.
/// Submissions are processed one at a time: the exclusive borrow on
/// `submit` serializes callers, and the `in_flight` flag marks a
/// submission as being processed. Dropping a submission future
/// mid-request clears the flag, so an abandoned submission leaves the
/// session usable.
pub struct AdviceSession<D, B> {
    state: VerificationState,
    adapter: RuntimeAdapter<D>,
    backend: B,
    container: ContainerId,
    action: ActionTag,
    in_flight: bool,
}

impl<D: ScriptDriver, B: AdviceBackend> AdviceSession<D, B> {
    pub fn new(
        adapter: RuntimeAdapter<D>,
        backend: B,
        container: ContainerId,
        action: ActionTag,
    ) -> Self {
        Self {
            state: VerificationState::new(),
            adapter,
            backend,
            container,
            action,
            in_flight: false,
        }
    }

    /// Drive one-time challenge-runtime initialization.
    ///
    /// A load failure (network, ad-blocker) is returned and not retried
    /// here; the session stays usable and submissions report not-ready
    /// until a later call succeeds.
    pub async fn initialize(&mut self) -> Result<(), VerificationError> {
        self.adapter.initialize().await?;
        self.state.set_runtime_ready();
        info!("verification runtime ready");
        Ok(())
    }

    /// The current verification state, for inspection.
    pub fn state(&self) -> &VerificationState {
        &self.state
    }

    /// The runtime adapter, for host integrations that need to reach
    /// the underlying driver (for example to mark a challenge solved in
    /// the dev harness).
    pub fn adapter(&self) -> &RuntimeAdapter<D> {
        &self.adapter
    }

    /// Whether a submission is currently in flight.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// Submit a prompt through whichever verification tier the state
    /// calls for, and fold the backend's answer back into the state
    /// machine.
    pub async fn submit(&mut self, prompt: &str) -> SessionOutcome {
        if self.in_flight {
            return SessionOutcome::Busy;
        }
        self.in_flight = true;
        let guard = InFlightGuard {
            session: &mut *self,
        };
        let outcome = guard.session.submit_inner(prompt).await;
        drop(guard);
        debug!(?outcome, tier = ?self.state.tier(), "submission processed");
        outcome
    }

    async fn submit_inner(&mut self, prompt: &str) -> SessionOutcome {
        // Priority 1: a session that has passed the interactive
        // challenge once never verifies again.
        if self.state.passed_interactive_once() {
            return match self.backend.bypass(prompt).await {
                Ok(SubmissionOutcome::Advice(text)) => SessionOutcome::Advice(text),
                Ok(other) => unexpected(other),
                Err(e) => SessionOutcome::TransportError(e.to_string()),
            };
        }

        // Priority 2: a rendered challenge must be completed and its
        // proof submitted.
        if self.state.tier() == VerificationTier::InteractivePending {
            return self.submit_interactive(prompt).await;
        }

        // An escalated episode whose render previously failed: try the
        // render again rather than downgrading to the invisible tier.
        if self.state.tier() == VerificationTier::InvisibleFailedLowScore {
            return self.render_challenge();
        }

        // Priority 3: the invisible tier.
        if !self.state.runtime_ready() {
            return SessionOutcome::NotReady;
        }
        self.submit_invisible(prompt).await
    }

    async fn submit_invisible(&mut self, prompt: &str) -> SessionOutcome {
        self.state.begin_invisible();

        let token = match self.adapter.invisible_token(&self.action).await {
            Ok(token) => token,
            Err(e) => {
                self.state.abort_invisible();
                return widget_failure(e);
            }
        };

        match self.backend.invisible(prompt, &token).await {
            Ok(SubmissionOutcome::Advice(text)) => {
                self.state.advice_delivered();
                SessionOutcome::Advice(text)
            }
            Ok(SubmissionOutcome::LowScoreEscalation) => {
                info!("invisible score too low, escalating to interactive challenge");
                self.state.low_score();
                self.render_challenge()
            }
            Ok(other) => {
                self.state.abort_invisible();
                unexpected(other)
            }
            Err(e) => {
                self.state.abort_invisible();
                SessionOutcome::TransportError(e.to_string())
            }
        }
    }

    async fn submit_interactive(&mut self, prompt: &str) -> SessionOutcome {
        let Some(handle) = self.state.interactive_widget() else {
            // Widget handle lost; re-render rather than dead-ending.
            return self.render_challenge();
        };

        // The user has not completed the challenge: report locally, do
        // not call the backend.
        let Some(token) = self.adapter.interactive_token(handle) else {
            return SessionOutcome::AwaitingChallenge;
        };

        match self.backend.interactive(prompt, &token).await {
            Ok(SubmissionOutcome::Advice(text)) => {
                self.state.interactive_accepted();
                info!("interactive challenge passed, session now bypasses verification");
                SessionOutcome::Advice(text)
            }
            Ok(SubmissionOutcome::RejectedProof(message)) => {
                warn!(%message, "backend rejected interactive proof");
                if let Err(e) = self.adapter.reset_interactive(handle) {
                    warn!(error = %e, "failed to reset interactive challenge");
                }
                self.state.interactive_rejected();
                SessionOutcome::ProofRejected
            }
            Ok(other) => unexpected(other),
            Err(e) => SessionOutcome::TransportError(e.to_string()),
        }
    }

    /// Render the interactive challenge for the current escalation
    /// episode. Exactly one render call per invocation; re-renders into
    /// the container are cleared by the adapter.
    fn render_challenge(&mut self) -> SessionOutcome {
        match self.adapter.render_interactive(&self.container) {
            Ok(handle) => {
                self.state.challenge_rendered(handle);
                SessionOutcome::ChallengeRequired
            }
            Err(e) => {
                warn!(error = %e, "cannot render interactive challenge");
                SessionOutcome::ConfigError(e.to_string())
            }
        }
    }
}

/// Clears the in-flight flag when the submission finishes or its future
/// is dropped mid-request.
struct InFlightGuard<'a, D, B> {
    session: &'a mut AdviceSession<D, B>,
}

impl<D, B> Drop for InFlightGuard<'_, D, B> {
    fn drop(&mut self) {
        self.session.in_flight = false;
    }
}

/// Map an adapter failure during token minting to a session outcome.
fn widget_failure(error: WidgetError) -> SessionOutcome {
    match error {
        WidgetError::NotInitialized => SessionOutcome::NotReady,
        WidgetError::LoadFailed(_) | WidgetError::ConfigMissing(_) => {
            SessionOutcome::ConfigError(error.to_string())
        }
        other => SessionOutcome::TransportError(other.to_string()),
    }
}

/// Outcomes a given endpoint is not expected to produce (for example an
/// escalation signal from the bypass call) fold into transport errors.
fn unexpected(outcome: SubmissionOutcome) -> SessionOutcome {
    match outcome {
        SubmissionOutcome::TransportError(message) => SessionOutcome::TransportError(message),
        SubmissionOutcome::ConfigError(message) => SessionOutcome::ConfigError(message),
        other => SessionOutcome::TransportError(format!("unexpected backend outcome: {other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use advisor_dispatch::DispatchError;
    use advisor_nullables::{NullBackend, NullScriptDriver};
    use advisor_types::{InteractiveToken, InvisibleToken, SiteKey};

    const PROMPT: &str = "clicking noise when turning";

    /// Backend whose first poll suspends, so a submit future can be
    /// dropped while a request is outstanding.
    struct StallingBackend(NullBackend);

    impl AdviceBackend for StallingBackend {
        async fn invisible(
            &self,
            prompt: &str,
            token: &InvisibleToken,
        ) -> Result<SubmissionOutcome, DispatchError> {
            tokio::task::yield_now().await;
            self.0.invisible(prompt, token).await
        }

        async fn interactive(
            &self,
            prompt: &str,
            token: &InteractiveToken,
        ) -> Result<SubmissionOutcome, DispatchError> {
            tokio::task::yield_now().await;
            self.0.interactive(prompt, token).await
        }

        async fn bypass(&self, prompt: &str) -> Result<SubmissionOutcome, DispatchError> {
            tokio::task::yield_now().await;
            self.0.bypass(prompt).await
        }
    }

    fn session() -> AdviceSession<NullScriptDriver, NullBackend> {
        session_with_keys(Some(SiteKey::new("interactive-key")))
    }

    fn session_with_keys(
        interactive: Option<SiteKey>,
    ) -> AdviceSession<NullScriptDriver, NullBackend> {
        let adapter = RuntimeAdapter::new(
            NullScriptDriver::new(),
            SiteKey::new("invisible-key"),
            interactive,
        );
        AdviceSession::new(
            adapter,
            NullBackend::new(),
            ContainerId::new("challenge-slot"),
            ActionTag::default(),
        )
    }

    /// Drive a session to the interactive-pending tier.
    async fn escalate(session: &mut AdviceSession<NullScriptDriver, NullBackend>) {
        session.initialize().await.unwrap();
        session
            .backend
            .enqueue(SubmissionOutcome::LowScoreEscalation);
        let outcome = session.submit(PROMPT).await;
        assert_eq!(outcome, SessionOutcome::ChallengeRequired);
    }

    /// Simulate the user solving the currently rendered challenge.
    fn solve(session: &AdviceSession<NullScriptDriver, NullBackend>, token: &str) {
        let handle = session.state().interactive_widget().unwrap();
        session
            .adapter
            .driver()
            .solve(handle, InteractiveToken::new(token));
    }

    // ── Invisible tier ──────────────────────────────────────────────

    #[tokio::test]
    async fn advice_on_first_try_completes_the_episode() {
        let mut session = session();
        session.initialize().await.unwrap();
        session
            .backend
            .enqueue(SubmissionOutcome::Advice("Check CV joint".into()));

        let outcome = session.submit(PROMPT).await;

        assert_eq!(outcome, SessionOutcome::Advice("Check CV joint".into()));
        assert_eq!(session.state().tier(), VerificationTier::NoneAttempted);
        assert_eq!(session.backend.endpoints(), vec!["invisible"]);
        assert_eq!(session.adapter.driver().minted_count(), 1);
        assert!(!session.in_flight());
    }

    #[tokio::test]
    async fn each_submission_mints_a_fresh_token() {
        let mut session = session();
        session.initialize().await.unwrap();

        session.submit("first").await;
        session.submit("second").await;

        assert_eq!(session.adapter.driver().minted_count(), 2);
        assert_eq!(session.backend.endpoints(), vec!["invisible", "invisible"]);
    }

    #[tokio::test]
    async fn submit_before_runtime_ready_makes_no_backend_call() {
        let mut session = session();

        let outcome = session.submit(PROMPT).await;

        assert_eq!(outcome, SessionOutcome::NotReady);
        assert_eq!(session.state().tier(), VerificationTier::NoneAttempted);
        assert!(session.backend.endpoints().is_empty());
        assert_eq!(session.adapter.driver().minted_count(), 0);
    }

    #[tokio::test]
    async fn script_load_failure_keeps_session_not_ready() {
        let mut session = session();
        session.adapter.driver().fail_load("blocked by extension");

        let err = session.initialize().await.unwrap_err();
        assert!(matches!(
            err,
            VerificationError::Runtime(WidgetError::LoadFailed(_))
        ));
        assert!(!session.state().runtime_ready());

        let outcome = session.submit(PROMPT).await;
        assert_eq!(outcome, SessionOutcome::NotReady);
        assert!(session.backend.endpoints().is_empty());
    }

    #[tokio::test]
    async fn transport_error_restarts_the_invisible_episode() {
        let mut session = session();
        session.initialize().await.unwrap();
        session
            .backend
            .enqueue_error(DispatchError::Unreachable("connection refused".into()));

        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::TransportError(_)));
        assert_eq!(session.state().tier(), VerificationTier::NoneAttempted);

        // Resubmission verifies from scratch with a fresh token.
        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::Advice(_)));
        assert_eq!(session.adapter.driver().minted_count(), 2);
    }

    #[tokio::test]
    async fn dropped_submission_future_does_not_wedge_the_session() {
        use std::future::Future;

        let adapter = RuntimeAdapter::new(
            NullScriptDriver::new(),
            SiteKey::new("invisible-key"),
            Some(SiteKey::new("interactive-key")),
        );
        let mut session = AdviceSession::new(
            adapter,
            StallingBackend(NullBackend::new()),
            ContainerId::new("challenge-slot"),
            ActionTag::default(),
        );
        session.initialize().await.unwrap();

        // Poll a submission far enough that its backend request is
        // outstanding, then drop it.
        {
            let mut fut = Box::pin(session.submit(PROMPT));
            std::future::poll_fn(|cx| {
                assert!(fut.as_mut().poll(cx).is_pending());
                std::task::Poll::Ready(())
            })
            .await;
        }

        assert!(!session.in_flight());
        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::Advice(_)));
        assert_eq!(session.state().tier(), VerificationTier::NoneAttempted);
    }

    // ── Escalation ──────────────────────────────────────────────────

    #[tokio::test]
    async fn low_score_renders_the_challenge_exactly_once() {
        let mut session = session();
        escalate(&mut session).await;

        assert_eq!(
            session.state().tier(),
            VerificationTier::InteractivePending
        );
        assert_eq!(session.adapter.driver().renders().len(), 1);
        assert_eq!(
            session.adapter.driver().renders(),
            vec![ContainerId::new("challenge-slot")]
        );
        assert!(!session.state().passed_interactive_once());
    }

    #[tokio::test]
    async fn unsolved_challenge_blocks_submission_locally() {
        let mut session = session();
        escalate(&mut session).await;

        let outcome = session.submit(PROMPT).await;

        assert_eq!(outcome, SessionOutcome::AwaitingChallenge);
        // Only the original invisible call reached the backend.
        assert_eq!(session.backend.endpoints(), vec!["invisible"]);
    }

    #[tokio::test]
    async fn rejected_proof_resets_the_widget_and_stays_pending() {
        let mut session = session();
        escalate(&mut session).await;
        solve(&session, "first-proof");
        session
            .backend
            .enqueue(SubmissionOutcome::RejectedProof("rejected".into()));

        let outcome = session.submit(PROMPT).await;

        assert_eq!(outcome, SessionOutcome::ProofRejected);
        assert_eq!(
            session.state().tier(),
            VerificationTier::InteractivePending
        );
        assert_eq!(session.adapter.driver().resets().len(), 1);
        assert!(!session.state().passed_interactive_once());

        // The reset cleared the proof; the user must solve again.
        let outcome = session.submit(PROMPT).await;
        assert_eq!(outcome, SessionOutcome::AwaitingChallenge);

        // A second solve then succeeds.
        solve(&session, "second-proof");
        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::Advice(_)));
        assert!(session.state().passed_interactive_once());
    }

    #[tokio::test]
    async fn missing_interactive_key_blocks_only_that_tier() {
        let mut session = session_with_keys(None);
        session.initialize().await.unwrap();
        session
            .backend
            .enqueue(SubmissionOutcome::LowScoreEscalation);

        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::ConfigError(_)));
        assert_eq!(
            session.state().tier(),
            VerificationTier::InvisibleFailedLowScore
        );

        // The episode stays escalated; no downgrade to the invisible
        // tier on resubmission.
        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::ConfigError(_)));
        assert_eq!(session.backend.endpoints(), vec!["invisible"]);
    }

    // ── Sticky bypass ───────────────────────────────────────────────

    #[tokio::test]
    async fn passed_session_uses_only_the_bypass_endpoint() {
        let mut session = session();
        escalate(&mut session).await;
        solve(&session, "proof");

        let outcome = session.submit(PROMPT).await;
        assert!(matches!(outcome, SessionOutcome::Advice(_)));
        assert!(session.state().passed_interactive_once());

        let minted_before = session.adapter.driver().minted_count();
        for prompt in ["brakes squeal", "engine stalls", "oil light on"] {
            let outcome = session.submit(prompt).await;
            assert!(matches!(outcome, SessionOutcome::Advice(_)));
        }

        assert_eq!(
            session.backend.endpoints(),
            vec!["invisible", "interactive", "bypass", "bypass", "bypass"]
        );
        assert_eq!(session.adapter.driver().minted_count(), minted_before);
        assert_eq!(
            session.state().tier(),
            VerificationTier::InteractivePassed
        );
    }

    #[tokio::test]
    async fn bypass_transport_error_does_not_unset_the_pass() {
        let mut session = session();
        escalate(&mut session).await;
        solve(&session, "proof");
        session.submit(PROMPT).await;

        session
            .backend
            .enqueue_error(DispatchError::Unreachable("down".into()));
        let outcome = session.submit("again").await;

        assert!(matches!(outcome, SessionOutcome::TransportError(_)));
        assert!(session.state().passed_interactive_once());

        let outcome = session.submit("again").await;
        assert!(matches!(outcome, SessionOutcome::Advice(_)));
        assert_eq!(session.backend.endpoints().last(), Some(&"bypass"));
    }

    // ── Status lines ────────────────────────────────────────────────

    #[test]
    fn status_lines_are_human_readable() {
        assert_eq!(
            SessionOutcome::Advice("Check CV joint".into()).status_line(),
            "Check CV joint"
        );
        assert!(SessionOutcome::NotReady.status_line().contains("not ready"));
        assert!(SessionOutcome::TransportError("timed out".into())
            .status_line()
            .contains("timed out"));
        assert!(SessionOutcome::ConfigError("interactive site key".into())
            .status_line()
            .contains("administrator"));
    }
}
