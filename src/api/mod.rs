// Backend client - everything that talks to the image server lives here
pub mod error;
pub mod http;
pub mod types;

pub use error::ApiError;
pub use http::HttpBackend;
pub use types::*;

use crate::ApiConfig;
use async_trait::async_trait;
use std::sync::Arc;

/// REST surface of the image server.
///
/// Every call is a single independent request. Nothing is retried and no call is ordered
/// against another one.
#[async_trait]
pub trait ImageBackend: Send + Sync {
    async fn status(&self) -> Result<SetupStatus, ApiError>;

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError>;

    async fn classify(&self, filename: &str, rating: Rating) -> Result<MessageResponse, ApiError>;

    /// Moves the image to the deleted folder, or removes it for good when `category` is
    /// already [`Category::Deleted`].
    async fn delete_image(
        &self,
        filename: &str,
        category: Category,
    ) -> Result<MessageResponse, ApiError>;

    async fn restore(&self, filename: &str) -> Result<MessageResponse, ApiError>;

    async fn purge_deleted(&self) -> Result<MessageResponse, ApiError>;

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ApiError>;

    async fn models(&self) -> Result<Vec<ModelInfo>, ApiError>;

    async fn setup_unclassified_folder(
        &self,
        folder_path: &str,
    ) -> Result<MessageResponse, ApiError>;

    /// Absolute URL for a server-relative image path such as `/api/serve-image/S/a.png`.
    fn image_url(&self, path: &str) -> String;

    fn name(&self) -> &str;
}

pub type DynBackend = Arc<dyn ImageBackend>;

pub fn create_backend(config: &ApiConfig) -> Result<DynBackend, ApiError> {
    Ok(Arc::new(HttpBackend::new(config)?))
}
