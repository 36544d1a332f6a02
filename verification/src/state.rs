//! Verification state tracking.
//!
//! One [`VerificationState`] exists per session. It is owned by the
//! session orchestrator and mutated only through the transition methods
//! below, each of which encodes one row of the tier table. A transition
//! called from a tier it does not apply to is a no-op, so any call
//! sequence leaves the state well formed.

use advisor_types::WidgetId;
use tracing::debug;

/// Which verification tier the current submission episode is in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VerificationTier {
    /// No verification attempted yet, or the last episode completed.
    NoneAttempted,
    /// An invisible token has been minted and submitted.
    InvisiblePending,
    /// The backend judged the invisible score insufficient; the
    /// interactive challenge has not been rendered yet.
    InvisibleFailedLowScore,
    /// The interactive challenge is on screen, awaiting completion.
    InteractivePending,
    /// The interactive proof was accepted. Sticky for the session.
    InteractivePassed,
}

/// The singleton verification state of one session.
///
/// `passed_interactive_once` is monotonic: once set it is never
/// cleared, and every later submission bypasses verification entirely.
#[derive(Clone, Debug)]
pub struct VerificationState {
    tier: VerificationTier,
    runtime_ready: bool,
    passed_interactive_once: bool,
    interactive_widget: Option<WidgetId>,
}

impl VerificationState {
    pub fn new() -> Self {
        Self {
            tier: VerificationTier::NoneAttempted,
            runtime_ready: false,
            passed_interactive_once: false,
            interactive_widget: None,
        }
    }

    pub fn tier(&self) -> VerificationTier {
        self.tier
    }

    pub fn runtime_ready(&self) -> bool {
        self.runtime_ready
    }

    pub fn passed_interactive_once(&self) -> bool {
        self.passed_interactive_once
    }

    /// Weak reference to the rendered interactive widget, if any.
    pub fn interactive_widget(&self) -> Option<WidgetId> {
        self.interactive_widget
    }

    /// Record that one-time runtime initialization completed.
    pub fn set_runtime_ready(&mut self) {
        self.runtime_ready = true;
    }

    /// Submit requested with the runtime ready: an invisible token is
    /// being minted and sent.
    pub fn begin_invisible(&mut self) {
        if self.tier == VerificationTier::NoneAttempted {
            self.transition(VerificationTier::InvisiblePending);
        }
    }

    /// The in-flight invisible submission ended without a verdict
    /// (transport failure). The token is spent; the next submission
    /// re-verifies from the start.
    pub fn abort_invisible(&mut self) {
        if self.tier == VerificationTier::InvisiblePending {
            self.transition(VerificationTier::NoneAttempted);
        }
    }

    /// The backend reported the invisible score as too low.
    pub fn low_score(&mut self) {
        if self.tier == VerificationTier::InvisiblePending {
            self.transition(VerificationTier::InvisibleFailedLowScore);
        }
    }

    /// The interactive challenge has been rendered for this episode.
    /// Also applies to a re-render while already pending, which swaps
    /// in the fresh widget handle.
    pub fn challenge_rendered(&mut self, handle: WidgetId) {
        match self.tier {
            VerificationTier::InvisibleFailedLowScore => {
                self.interactive_widget = Some(handle);
                self.transition(VerificationTier::InteractivePending);
            }
            VerificationTier::InteractivePending => {
                self.interactive_widget = Some(handle);
            }
            _ => {}
        }
    }

    /// Advice came back for an invisible-tier submission. The episode is
    /// over; the next submission re-verifies.
    pub fn advice_delivered(&mut self) {
        if self.tier == VerificationTier::InvisiblePending {
            self.transition(VerificationTier::NoneAttempted);
        }
    }

    /// The backend accepted the interactive proof. Sets the sticky
    /// passed flag; the session never verifies again.
    pub fn interactive_accepted(&mut self) {
        if self.tier == VerificationTier::InteractivePending {
            self.passed_interactive_once = true;
            self.transition(VerificationTier::InteractivePassed);
        }
    }

    /// The backend rejected the interactive proof. The tier does not
    /// change; the widget is reset in place for another attempt.
    pub fn interactive_rejected(&mut self) {
        debug!(tier = ?self.tier, "interactive proof rejected, staying in place");
    }

    /// Structural consistency: a widget handle is held exactly while an
    /// escalation episode is at the interactive tier or has passed it.
    pub fn is_consistent(&self) -> bool {
        let interactive = matches!(
            self.tier,
            VerificationTier::InteractivePending | VerificationTier::InteractivePassed
        );
        self.interactive_widget.is_some() == interactive
            && (self.tier != VerificationTier::InteractivePassed || self.passed_interactive_once)
    }

    fn transition(&mut self, next: VerificationTier) {
        debug!(from = ?self.tier, to = ?next, "verification tier transition");
        self.tier = next;
    }
}

impl Default for VerificationState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_starts_unverified() {
        let state = VerificationState::new();
        assert_eq!(state.tier(), VerificationTier::NoneAttempted);
        assert!(!state.runtime_ready());
        assert!(!state.passed_interactive_once());
        assert!(state.interactive_widget().is_none());
        assert!(state.is_consistent());
    }

    #[test]
    fn invisible_episode_returns_to_start_on_advice() {
        let mut state = VerificationState::new();
        state.begin_invisible();
        assert_eq!(state.tier(), VerificationTier::InvisiblePending);

        state.advice_delivered();
        assert_eq!(state.tier(), VerificationTier::NoneAttempted);
        assert!(!state.passed_interactive_once());
    }

    #[test]
    fn escalation_walks_through_low_score_to_pending() {
        let mut state = VerificationState::new();
        state.begin_invisible();
        state.low_score();
        assert_eq!(state.tier(), VerificationTier::InvisibleFailedLowScore);
        assert!(state.interactive_widget().is_none());

        state.challenge_rendered(WidgetId::new(7));
        assert_eq!(state.tier(), VerificationTier::InteractivePending);
        assert_eq!(state.interactive_widget(), Some(WidgetId::new(7)));
        assert!(state.is_consistent());
    }

    #[test]
    fn rejection_keeps_the_pending_tier() {
        let mut state = VerificationState::new();
        state.begin_invisible();
        state.low_score();
        state.challenge_rendered(WidgetId::new(1));

        state.interactive_rejected();
        assert_eq!(state.tier(), VerificationTier::InteractivePending);
        assert!(!state.passed_interactive_once());
    }

    #[test]
    fn acceptance_sets_the_sticky_flag() {
        let mut state = VerificationState::new();
        state.begin_invisible();
        state.low_score();
        state.challenge_rendered(WidgetId::new(1));
        state.interactive_accepted();

        assert_eq!(state.tier(), VerificationTier::InteractivePassed);
        assert!(state.passed_interactive_once());
        assert!(state.is_consistent());
    }

    #[test]
    fn acceptance_outside_pending_is_ignored() {
        let mut state = VerificationState::new();
        state.interactive_accepted();
        assert_eq!(state.tier(), VerificationTier::NoneAttempted);
        assert!(!state.passed_interactive_once());
    }

    #[test]
    fn transport_abort_restarts_the_episode() {
        let mut state = VerificationState::new();
        state.begin_invisible();
        state.abort_invisible();
        assert_eq!(state.tier(), VerificationTier::NoneAttempted);
    }
}
