use advisor_widget::WidgetError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("challenge runtime initialization failed: {0}")]
    Runtime(#[from] WidgetError),
}
