//! Nullable advice backend — scripted outcomes, recorded endpoint hits.

use advisor_dispatch::{AdviceBackend, DispatchError, SubmissionOutcome};
use advisor_types::{InteractiveToken, InvisibleToken};

use std::collections::VecDeque;
use std::sync::Mutex;

/// Which endpoint a recorded call hit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendCall {
    Invisible { prompt: String, token: String },
    Interactive { prompt: String, token: String },
    Bypass { prompt: String },
}

impl BackendCall {
    /// The endpoint name, for terse assertions.
    pub fn endpoint(&self) -> &'static str {
        match self {
            BackendCall::Invisible { .. } => "invisible",
            BackendCall::Interactive { .. } => "interactive",
            BackendCall::Bypass { .. } => "bypass",
        }
    }
}

/// A test backend that replays scripted outcomes and records every
/// call. With an empty script it answers with mock advice echoing the
/// prompt, like the dev backend does.
pub struct NullBackend {
    script: Mutex<VecDeque<Result<SubmissionOutcome, DispatchError>>>,
    calls: Mutex<Vec<BackendCall>>,
}

impl NullBackend {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Queue the outcome of the next call, regardless of endpoint.
    pub fn enqueue(&self, outcome: SubmissionOutcome) {
        self.script.lock().unwrap().push_back(Ok(outcome));
    }

    /// Queue a pre-response failure for the next call.
    pub fn enqueue_error(&self, error: DispatchError) {
        self.script.lock().unwrap().push_back(Err(error));
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Endpoint names of every call, in order.
    pub fn endpoints(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().iter().map(BackendCall::endpoint).collect()
    }

    fn answer(&self, call: BackendCall) -> Result<SubmissionOutcome, DispatchError> {
        let prompt = match &call {
            BackendCall::Invisible { prompt, .. }
            | BackendCall::Interactive { prompt, .. }
            | BackendCall::Bypass { prompt } => prompt.clone(),
        };
        self.calls.lock().unwrap().push(call);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| {
                Ok(SubmissionOutcome::Advice(format!(
                    "mock advice for: '{prompt}'"
                )))
            })
    }
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AdviceBackend for NullBackend {
    async fn invisible(
        &self,
        prompt: &str,
        token: &InvisibleToken,
    ) -> Result<SubmissionOutcome, DispatchError> {
        self.answer(BackendCall::Invisible {
            prompt: prompt.to_string(),
            token: token.as_str().to_string(),
        })
    }

    async fn interactive(
        &self,
        prompt: &str,
        token: &InteractiveToken,
    ) -> Result<SubmissionOutcome, DispatchError> {
        self.answer(BackendCall::Interactive {
            prompt: prompt.to_string(),
            token: token.as_str().to_string(),
        })
    }

    async fn bypass(&self, prompt: &str) -> Result<SubmissionOutcome, DispatchError> {
        self.answer(BackendCall::Bypass {
            prompt: prompt.to_string(),
        })
    }
}
