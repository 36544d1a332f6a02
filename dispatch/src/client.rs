//! HTTP client for the advice backend.

use crate::backend::AdviceBackend;
use crate::error::DispatchError;
use crate::outcome::SubmissionOutcome;
use advisor_types::{InteractiveToken, InvisibleToken};

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Substring of the 400 `detail` marking an insufficient invisible-tier
/// score. Matches the backend's "score too low. Score: {score}" detail.
pub const LOW_SCORE_MARKER: &str = "score too low";

/// Default timeout for advice requests. Generation can be slow, so this
/// is looser than a typical API call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const INVISIBLE_PATH: &str = "/get-advice";
const INTERACTIVE_PATH: &str = "/get-advice/interactive";
const BYPASS_PATH: &str = "/get-advice/bypass";

/// Client for the three advice endpoints.
///
/// Wraps `reqwest::Client` (reusable connection pool) with the backend's
/// base URL and classifies every response into a [`SubmissionOutcome`].
pub struct AdviceClient {
    http: reqwest::Client,
    base_url: String,
}

/// Which call contract a response belongs to; classification differs
/// per tier.
#[derive(Clone, Copy, Debug)]
enum CallTier {
    Invisible,
    Interactive,
    Bypass,
}

#[derive(Serialize)]
struct InvisiblePayload<'a> {
    prompt: &'a str,
    invisible_token: &'a InvisibleToken,
}

#[derive(Serialize)]
struct InteractivePayload<'a> {
    prompt: &'a str,
    interactive_token: &'a InteractiveToken,
}

#[derive(Serialize)]
struct BypassPayload<'a> {
    prompt: &'a str,
}

#[derive(Debug, Deserialize)]
struct AdviceResponse {
    advice: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<String>,
}

impl AdviceClient {
    /// Create a client targeting the given base URL
    /// (e.g. `http://127.0.0.1:8000`).
    pub fn new(base_url: impl Into<String>) -> Result<Self, DispatchError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DispatchError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| DispatchError::RequestFailed(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// The configured backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POST a JSON payload and classify the response.
    async fn post<T: Serialize>(
        &self,
        path: &str,
        payload: &T,
        tier: CallTier,
    ) -> Result<SubmissionOutcome, DispatchError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        debug!(%url, ?tier, "dispatching advice request");

        let response = self.http.post(&url).json(payload).send().await.map_err(|e| {
            if e.is_timeout() {
                DispatchError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                DispatchError::Unreachable(format!("connection failed: {e}"))
            } else {
                DispatchError::RequestFailed(e.to_string())
            }
        })?;

        classify(tier, response).await
    }
}

impl AdviceBackend for AdviceClient {
    async fn invisible(
        &self,
        prompt: &str,
        token: &InvisibleToken,
    ) -> Result<SubmissionOutcome, DispatchError> {
        debug!(token = %advisor_utils::redact(token.as_str()), "submitting invisible proof");
        self.post(
            INVISIBLE_PATH,
            &InvisiblePayload {
                prompt,
                invisible_token: token,
            },
            CallTier::Invisible,
        )
        .await
    }

    async fn interactive(
        &self,
        prompt: &str,
        token: &InteractiveToken,
    ) -> Result<SubmissionOutcome, DispatchError> {
        debug!(token = %advisor_utils::redact(token.as_str()), "submitting interactive proof");
        self.post(
            INTERACTIVE_PATH,
            &InteractivePayload {
                prompt,
                interactive_token: token,
            },
            CallTier::Interactive,
        )
        .await
    }

    async fn bypass(&self, prompt: &str) -> Result<SubmissionOutcome, DispatchError> {
        self.post(BYPASS_PATH, &BypassPayload { prompt }, CallTier::Bypass)
            .await
    }
}

/// Map an HTTP response to a [`SubmissionOutcome`].
///
/// 2xx parses as advice. The low-score escalation signal is a 400 on
/// the invisible call whose `detail` carries [`LOW_SCORE_MARKER`]. A
/// client error on the interactive call is a rejected proof. Everything
/// else is a transport error carrying the structured `detail` when
/// present, else a generic status-coded message.
async fn classify(
    tier: CallTier,
    response: reqwest::Response,
) -> Result<SubmissionOutcome, DispatchError> {
    let status = response.status();

    if status.is_success() {
        let body: AdviceResponse = response.json().await.map_err(|e| {
            DispatchError::InvalidResponse(format!("failed to parse advice response: {e}"))
        })?;
        return Ok(SubmissionOutcome::Advice(body.advice));
    }

    let detail = response
        .json::<ErrorBody>()
        .await
        .ok()
        .and_then(|body| body.detail);
    let message = detail
        .clone()
        .unwrap_or_else(|| format!("HTTP error, status {status}"));

    let outcome = match tier {
        CallTier::Invisible
            if status == StatusCode::BAD_REQUEST
                && detail.as_deref().is_some_and(|d| d.contains(LOW_SCORE_MARKER)) =>
        {
            SubmissionOutcome::LowScoreEscalation
        }
        CallTier::Interactive if status.is_client_error() => {
            SubmissionOutcome::RejectedProof(message)
        }
        _ => SubmissionOutcome::TransportError(message),
    };

    debug!(%status, ?outcome, "classified backend response");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invisible_payload_carries_prompt_and_token() {
        let token = InvisibleToken::new("tok-1");
        let payload = InvisiblePayload {
            prompt: "clicking noise when turning",
            invisible_token: &token,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["prompt"], "clicking noise when turning");
        assert_eq!(json["invisible_token"], "tok-1");
    }

    #[test]
    fn bypass_payload_carries_no_proof_field() {
        let payload = BypassPayload { prompt: "p" };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json.as_object().unwrap().len(), 1);
        assert_eq!(json["prompt"], "p");
    }

    #[test]
    fn error_body_detail_is_optional() {
        let body: ErrorBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.detail, None);

        let body: ErrorBody = serde_json::from_str(r#"{"detail": "boom"}"#).unwrap();
        assert_eq!(body.detail.as_deref(), Some("boom"));
    }
}
