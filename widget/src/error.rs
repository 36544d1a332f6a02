use advisor_types::WidgetId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("challenge script failed to load: {0}")]
    LoadFailed(String),

    #[error("challenge runtime is not initialized yet")]
    NotInitialized,

    #[error("{0} site key is not configured")]
    ConfigMissing(&'static str),

    #[error("no rendered widget with handle {0}")]
    UnknownWidget(WidgetId),

    #[error("token request failed: {0}")]
    ExecuteFailed(String),
}
