//! Nullable challenge driver — scripted tokens, recorded widget calls.

use advisor_types::{ActionTag, ContainerId, InteractiveToken, InvisibleToken, SiteKey, WidgetId};
use advisor_widget::{ScriptDriver, WidgetError};

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// A test driver that mints deterministic tokens and records every
/// render/reset/clear call instead of touching a vendor runtime.
///
/// Interior mutability uses `Mutex` rather than `RefCell` because the
/// driver is shared across `.await` points in async tests.
pub struct NullScriptDriver {
    /// Whether the readiness probe reports the runtime already present.
    present: AtomicBool,
    /// When set, the next loader injection fails with this message.
    load_failure: Mutex<Option<String>>,
    /// Scripted invisible tokens, consumed front-first; generated
    /// `null-token-{n}` values once exhausted.
    scripted_tokens: Mutex<VecDeque<String>>,
    minted: AtomicUsize,
    executed_actions: Mutex<Vec<ActionTag>>,
    injects: AtomicUsize,
    next_handle: AtomicU64,
    rendered: Mutex<HashSet<WidgetId>>,
    renders: Mutex<Vec<ContainerId>>,
    resets: Mutex<Vec<WidgetId>>,
    cleared: Mutex<Vec<ContainerId>>,
    /// Completed challenges: handle to the user-entered proof.
    solved: Mutex<HashMap<WidgetId, InteractiveToken>>,
}

impl NullScriptDriver {
    pub fn new() -> Self {
        Self {
            present: AtomicBool::new(false),
            load_failure: Mutex::new(None),
            scripted_tokens: Mutex::new(VecDeque::new()),
            minted: AtomicUsize::new(0),
            executed_actions: Mutex::new(Vec::new()),
            injects: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
            rendered: Mutex::new(HashSet::new()),
            renders: Mutex::new(Vec::new()),
            resets: Mutex::new(Vec::new()),
            cleared: Mutex::new(Vec::new()),
            solved: Mutex::new(HashMap::new()),
        }
    }

    /// Make the readiness probe report an already-present runtime.
    pub fn set_present(&self, present: bool) {
        self.present.store(present, Ordering::SeqCst);
    }

    /// Make the next loader injection fail (network error, ad-blocker).
    pub fn fail_load(&self, message: impl Into<String>) {
        *self.load_failure.lock().unwrap() = Some(message.into());
    }

    /// Queue a token for the next invisible mint.
    pub fn enqueue_token(&self, token: impl Into<String>) {
        self.scripted_tokens.lock().unwrap().push_back(token.into());
    }

    /// Simulate the user completing the challenge for `handle`.
    pub fn solve(&self, handle: WidgetId, token: InteractiveToken) {
        self.solved.lock().unwrap().insert(handle, token);
    }

    /// Number of invisible tokens minted so far.
    pub fn minted_count(&self) -> usize {
        self.minted.load(Ordering::SeqCst)
    }

    /// Number of loader injections performed.
    pub fn inject_count(&self) -> usize {
        self.injects.load(Ordering::SeqCst)
    }

    /// Containers rendered into, in order.
    pub fn renders(&self) -> Vec<ContainerId> {
        self.renders.lock().unwrap().clone()
    }

    /// Widgets reset, in order.
    pub fn resets(&self) -> Vec<WidgetId> {
        self.resets.lock().unwrap().clone()
    }

    /// Containers cleared before a re-render, in order.
    pub fn cleared(&self) -> Vec<ContainerId> {
        self.cleared.lock().unwrap().clone()
    }

    /// Action tags of every mint call, in order.
    pub fn executed_actions(&self) -> Vec<ActionTag> {
        self.executed_actions.lock().unwrap().clone()
    }
}

impl Default for NullScriptDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptDriver for NullScriptDriver {
    fn probe_ready(&self) -> bool {
        self.present.load(Ordering::SeqCst)
    }

    async fn inject_loader(&self, _site_key: &SiteKey) -> Result<(), WidgetError> {
        self.injects.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = self.load_failure.lock().unwrap().take() {
            return Err(WidgetError::LoadFailed(message));
        }
        Ok(())
    }

    async fn await_ready(&self) -> Result<(), WidgetError> {
        Ok(())
    }

    async fn execute(
        &self,
        _site_key: &SiteKey,
        action: &ActionTag,
    ) -> Result<InvisibleToken, WidgetError> {
        let n = self.minted.fetch_add(1, Ordering::SeqCst);
        self.executed_actions.lock().unwrap().push(action.clone());
        let token = self
            .scripted_tokens
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("null-token-{n}"));
        Ok(InvisibleToken::new(token))
    }

    fn render(
        &self,
        container: &ContainerId,
        _site_key: &SiteKey,
    ) -> Result<WidgetId, WidgetError> {
        let handle = WidgetId::new(self.next_handle.fetch_add(1, Ordering::SeqCst));
        self.rendered.lock().unwrap().insert(handle);
        self.renders.lock().unwrap().push(container.clone());
        Ok(handle)
    }

    fn response(&self, handle: WidgetId) -> Option<InteractiveToken> {
        self.solved.lock().unwrap().get(&handle).cloned()
    }

    fn reset(&self, handle: WidgetId) -> Result<(), WidgetError> {
        if !self.rendered.lock().unwrap().contains(&handle) {
            return Err(WidgetError::UnknownWidget(handle));
        }
        self.resets.lock().unwrap().push(handle);
        self.solved.lock().unwrap().remove(&handle);
        Ok(())
    }

    fn clear_container(&self, container: &ContainerId) {
        self.cleared.lock().unwrap().push(container.clone());
    }
}
