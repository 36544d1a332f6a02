//! The adapter layering workspace guarantees over a [`ScriptDriver`].

use crate::driver::ScriptDriver;
use crate::error::WidgetError;
use advisor_types::{ActionTag, ContainerId, InteractiveToken, InvisibleToken, SiteKey, WidgetId};
use std::collections::HashMap;
use tracing::debug;

/// Wraps a [`ScriptDriver`] with the contract the verification flow
/// relies on: load-once initialization, fresh token minting, and
/// idempotent widget rendering.
pub struct RuntimeAdapter<D> {
    driver: D,
    invisible_key: SiteKey,
    /// Absent when the deployment has not provisioned the interactive
    /// tier; rendering then fails with a config error instead of
    /// reaching the vendor.
    interactive_key: Option<SiteKey>,
    initialized: bool,
    /// Widgets currently rendered, by container. Re-rendering into an
    /// occupied container clears the prior widget first.
    rendered: HashMap<ContainerId, WidgetId>,
}

impl<D: ScriptDriver> RuntimeAdapter<D> {
    pub fn new(driver: D, invisible_key: SiteKey, interactive_key: Option<SiteKey>) -> Self {
        Self {
            driver,
            invisible_key,
            interactive_key,
            initialized: false,
            rendered: HashMap::new(),
        }
    }

    /// One-time runtime initialization. Idempotent: resolves immediately
    /// when a previous call succeeded or the readiness probe reports the
    /// runtime already present; otherwise injects the loader script
    /// exactly once and waits for the runtime's internal ready signal.
    ///
    /// A load failure leaves the adapter uninitialized. It is surfaced
    /// to the caller and never retried from inside the adapter.
    pub async fn initialize(&mut self) -> Result<(), WidgetError> {
        if self.initialized {
            return Ok(());
        }
        if self.driver.probe_ready() {
            debug!("challenge runtime already present, skipping script injection");
            self.initialized = true;
            return Ok(());
        }

        self.driver.inject_loader(&self.invisible_key).await?;
        self.driver.await_ready().await?;
        debug!("challenge runtime loaded and ready");
        self.initialized = true;
        Ok(())
    }

    /// Whether `initialize` has completed successfully.
    pub fn is_ready(&self) -> bool {
        self.initialized
    }

    /// The underlying driver, for host integrations and test fakes.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Mint a fresh, single-use invisible token scoped to `action`.
    /// Tokens are never cached; every call reaches the vendor.
    pub async fn invisible_token(&self, action: &ActionTag) -> Result<InvisibleToken, WidgetError> {
        if !self.initialized {
            return Err(WidgetError::NotInitialized);
        }
        self.driver.execute(&self.invisible_key, action).await
    }

    /// Render the interactive challenge into `container`.
    ///
    /// Requires the interactive-tier site key; the missing-key case is
    /// returned as [`WidgetError::ConfigMissing`] so the caller can show
    /// an administrator-facing message. Rendering into a container that
    /// already holds a widget clears it first, so repeated escalations
    /// never stack duplicate widgets.
    pub fn render_interactive(&mut self, container: &ContainerId) -> Result<WidgetId, WidgetError> {
        let key = self
            .interactive_key
            .as_ref()
            .ok_or(WidgetError::ConfigMissing("interactive"))?
            .clone();

        if let Some(prior) = self.rendered.remove(container) {
            debug!(%container, %prior, "clearing previously rendered widget");
            self.driver.clear_container(container);
        }

        let handle = self.driver.render(container, &key)?;
        self.rendered.insert(container.clone(), handle);
        debug!(%container, %handle, "interactive challenge rendered");
        Ok(handle)
    }

    /// The user's proof for a rendered widget, or `None` while the
    /// challenge is still unsolved.
    pub fn interactive_token(&self, handle: WidgetId) -> Option<InteractiveToken> {
        self.driver.response(handle)
    }

    /// Reset a failed interactive attempt in place.
    pub fn reset_interactive(&self, handle: WidgetId) -> Result<(), WidgetError> {
        debug!(%handle, "resetting interactive challenge");
        self.driver.reset(handle)
    }
}
