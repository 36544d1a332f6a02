use thiserror::Error;

/// Failures before a backend response is obtained. Anything the backend
/// actually said, including rejections, is a [`SubmissionOutcome`]
/// instead.
///
/// [`SubmissionOutcome`]: crate::outcome::SubmissionOutcome
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("backend unreachable: {0}")]
    Unreachable(String),

    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from backend: {0}")]
    InvalidResponse(String),
}
