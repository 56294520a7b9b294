use super::{
    ApiError, Category, GeneratedImage, GenerationRequest, ImageBackend, ImageRecord,
    MessageResponse, ModelInfo, Rating, SetupStatus, error::detail_message,
};
use crate::ApiConfig;
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let parsed = Url::parse(&config.base_url)?;

        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    fn file_endpoint(&self, prefix: &str, filename: &str) -> Result<Url, ApiError> {
        self.endpoint(&format!("{}/{}", prefix, urlencoding::encode(filename)))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response, fallback: &str) -> Result<T, ApiError> {
    let status = response.status();

    if !status.is_success() {
        let message = match response.json::<serde_json::Value>().await {
            Ok(body) => detail_message(&body),
            Err(_) => None,
        }
        .unwrap_or_else(|| fallback.to_string());

        debug!(status = status.as_u16(), "{}", message);
        return Err(ApiError::Status {
            status: status.as_u16(),
            message,
        });
    }

    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl ImageBackend for HttpBackend {
    async fn status(&self) -> Result<SetupStatus, ApiError> {
        let response = self.client.get(self.endpoint("/api/status")?).send().await?;
        read_json(response, "Failed to fetch setup status").await
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        let response = self.client.get(self.endpoint("/api/images")?).send().await?;
        let images: Vec<ImageRecord> = read_json(response, "Failed to fetch images").await?;
        debug!("Fetched {} images", images.len());
        Ok(images)
    }

    async fn classify(&self, filename: &str, rating: Rating) -> Result<MessageResponse, ApiError> {
        debug!("Classifying {} as {}", filename, rating);
        let response = self
            .client
            .post(self.file_endpoint("/api/classify", filename)?)
            .query(&[("rating", rating.as_str())])
            .send()
            .await?;
        read_json(response, "Failed to classify image").await
    }

    async fn delete_image(
        &self,
        filename: &str,
        category: Category,
    ) -> Result<MessageResponse, ApiError> {
        debug!("Deleting {} from {}", filename, category);
        let response = self
            .client
            .delete(self.file_endpoint("/api/images", filename)?)
            .query(&[("category", category.as_str())])
            .send()
            .await?;
        read_json(response, "Failed to delete image").await
    }

    async fn restore(&self, filename: &str) -> Result<MessageResponse, ApiError> {
        debug!("Restoring {}", filename);
        let response = self
            .client
            .post(self.file_endpoint("/api/restore", filename)?)
            .send()
            .await?;
        read_json(response, "Failed to restore image").await
    }

    async fn purge_deleted(&self) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .delete(self.endpoint("/api/deleted")?)
            .send()
            .await?;
        read_json(response, "Failed to remove all deleted images").await
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ApiError> {
        debug!(
            "Requesting generation {}x{} steps={} sampler={}",
            request.width, request.height, request.steps, request.sampler_name
        );
        let response = self
            .client
            .post(self.endpoint("/api/generate-image")?)
            .json(request)
            .send()
            .await?;
        read_json(response, "Failed to generate image").await
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, ApiError> {
        let response = self.client.get(self.endpoint("/api/models")?).send().await?;
        read_json(response, "Failed to fetch models").await
    }

    async fn setup_unclassified_folder(
        &self,
        folder_path: &str,
    ) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint("/api/setup-unclassified-folder")?)
            .json(&serde_json::json!({ "folder_path": folder_path }))
            .send()
            .await?;
        read_json(response, "Failed to set up folder").await
    }

    fn image_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn name(&self) -> &str {
        "HTTP backend"
    }
}
