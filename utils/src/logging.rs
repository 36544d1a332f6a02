//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Fallback filter when `RUST_LOG` is unset: dependencies at info, the
/// advisor crates at debug so tier transitions and token handling show
/// up during development.
const DEFAULT_DIRECTIVES: &str =
    "info,advisor_widget=debug,advisor_dispatch=debug,advisor_verification=debug";

/// Initialize the tracing subscriber.
///
/// The `RUST_LOG` environment variable takes precedence when set.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
