use crate::api::ApiError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Nothing is waiting for confirmation")]
    NothingPending,

    #[error("No image at position {0}")]
    NoSuchPosition(usize),

    #[error("No image is open")]
    ViewerClosed,
}
