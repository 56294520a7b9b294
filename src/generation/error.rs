use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("A prompt is required")]
    EmptyPrompt,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error(transparent)]
    Api(#[from] ApiError),
}
