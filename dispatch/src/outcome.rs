//! Classification of a completed submission.

/// What a backend call amounted to, after response classification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The backend accepted the submission and produced advice.
    Advice(String),
    /// The invisible tier's score was insufficient; the caller must
    /// escalate to the interactive challenge. A routing signal, not a
    /// failure.
    LowScoreEscalation,
    /// The backend explicitly rejected an interactive proof; the widget
    /// should be reset in place for another attempt.
    RejectedProof(String),
    /// A required key or setting is absent. Administrator-facing; blocks
    /// only the affected tier.
    ConfigError(String),
    /// The backend was unreachable or returned an unclassified
    /// non-success. Recoverable by resubmitting.
    TransportError(String),
}
