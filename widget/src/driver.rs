//! The raw vendor boundary for the challenge runtime.

use crate::error::WidgetError;
use advisor_types::{ActionTag, ContainerId, InteractiveToken, InvisibleToken, SiteKey, WidgetId};

/// Primitive operations of the third-party challenge runtime.
///
/// Implementations wrap whatever the host environment provides: a
/// browser binding in a WASM frontend, a scripted fake in tests and the
/// dev harness. Each async operation resolves exactly once; the vendor's
/// load/ready/execute callbacks never escape this trait.
#[allow(async_fn_in_trait)]
pub trait ScriptDriver {
    /// Whether the runtime is already present and ready, without
    /// triggering a load. Used to make initialization idempotent across
    /// host-page reloads.
    fn probe_ready(&self) -> bool;

    /// Fetch and evaluate the vendor loader script, parameterized by the
    /// invisible-tier site key. Fails with [`WidgetError::LoadFailed`]
    /// when the script cannot be fetched (network failure, ad-blocker).
    async fn inject_loader(&self, site_key: &SiteKey) -> Result<(), WidgetError>;

    /// Resolve once the runtime signals its own internal readiness,
    /// after the loader script has been evaluated.
    async fn await_ready(&self) -> Result<(), WidgetError>;

    /// Mint a fresh, single-use invisible token scoped to `action`.
    async fn execute(
        &self,
        site_key: &SiteKey,
        action: &ActionTag,
    ) -> Result<InvisibleToken, WidgetError>;

    /// Render an interactive challenge widget into `container`.
    fn render(&self, container: &ContainerId, site_key: &SiteKey)
        -> Result<WidgetId, WidgetError>;

    /// The user-entered proof, if the challenge has been completed.
    fn response(&self, handle: WidgetId) -> Option<InteractiveToken>;

    /// Clear a failed attempt so the user can retry in place.
    fn reset(&self, handle: WidgetId) -> Result<(), WidgetError>;

    /// Remove any widget currently rendered in `container`.
    fn clear_container(&self, container: &ContainerId);
}
