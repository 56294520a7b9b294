use crate::api::{
    ApiError, Category, GeneratedImage, GenerationRequest, ImageBackend, ImageRecord,
    MessageResponse, ModelInfo, Rating, SetupStatus,
};
use crate::clipboard::{Clipboard, ClipboardError};
use async_trait::async_trait;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// In-memory stand-in for the image server, behaving like it for the happy paths.
#[derive(Default)]
pub struct FakeBackend {
    pub images: Mutex<Vec<ImageRecord>>,
    pub models: Mutex<Vec<ModelInfo>>,
    pub status: Mutex<SetupStatus>,
    pub calls: Mutex<Vec<String>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
    failing: Mutex<HashSet<&'static str>>,
    deleted_from: Mutex<HashMap<String, Category>>,
}

impl FakeBackend {
    pub fn with_images(images: Vec<ImageRecord>) -> Self {
        let backend = Self::default();
        *backend.images.lock().unwrap() = images;
        backend
    }

    /// Makes every later call to `operation` answer HTTP 500.
    pub fn fail(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: &'static str) {
        self.failing.lock().unwrap().remove(operation);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn enter(&self, operation: &'static str, call: String) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        if self.failing.lock().unwrap().contains(operation) {
            return Err(ApiError::Status {
                status: 500,
                message: format!("{} failed", operation),
            });
        }
        Ok(())
    }
}

pub fn image(filename: &str, category: Category) -> ImageRecord {
    ImageRecord {
        filename: filename.to_string(),
        path: category.serve_path(filename),
        created_at: 1_717_000_000.0,
        metadata: Some(serde_json::Map::new()),
        category,
    }
}

pub fn image_with_parameters(filename: &str, category: Category, parameters: &str) -> ImageRecord {
    let mut record = image(filename, category);
    if let serde_json::Value::Object(map) = json!({ "parameters": parameters }) {
        record.metadata = Some(map);
    }
    record
}

pub fn model(id: &str) -> ModelInfo {
    ModelInfo {
        id: id.to_string(),
        name: id.to_string(),
        path: format!("{}/{}.safetensors", id, id),
        description: None,
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        status: 404,
        message: "Image not found".to_string(),
    }
}

fn message(text: &str) -> MessageResponse {
    MessageResponse {
        message: text.to_string(),
    }
}

#[async_trait]
impl ImageBackend for FakeBackend {
    async fn status(&self) -> Result<SetupStatus, ApiError> {
        self.enter("status", "status".to_string())?;
        Ok(self.status.lock().unwrap().clone())
    }

    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        self.enter("list", "list".to_string())?;
        Ok(self.images.lock().unwrap().clone())
    }

    async fn classify(&self, filename: &str, rating: Rating) -> Result<MessageResponse, ApiError> {
        self.enter("classify", format!("classify {} {}", filename, rating))?;
        let mut images = self.images.lock().unwrap();
        let record = images
            .iter_mut()
            .find(|img| img.filename == filename && !img.category.is_deleted())
            .ok_or_else(not_found)?;
        record.category = Category::Rated(rating);
        record.path = record.category.serve_path(filename);
        Ok(message("classified"))
    }

    async fn delete_image(
        &self,
        filename: &str,
        category: Category,
    ) -> Result<MessageResponse, ApiError> {
        self.enter("delete", format!("delete {} {}", filename, category))?;
        let mut images = self.images.lock().unwrap();
        let position = images
            .iter()
            .position(|img| img.filename == filename && img.category == category)
            .ok_or_else(not_found)?;

        if category.is_deleted() {
            images.remove(position);
            return Ok(message("Image permanently deleted"));
        }

        self.deleted_from
            .lock()
            .unwrap()
            .insert(filename.to_string(), category);
        images[position].category = Category::Deleted;
        images[position].path = Category::Deleted.serve_path(filename);
        Ok(message("Image moved to deleted folder"))
    }

    async fn restore(&self, filename: &str) -> Result<MessageResponse, ApiError> {
        self.enter("restore", format!("restore {}", filename))?;
        let mut images = self.images.lock().unwrap();
        let record = images
            .iter_mut()
            .find(|img| img.filename == filename && img.category.is_deleted())
            .ok_or_else(not_found)?;
        let original = self
            .deleted_from
            .lock()
            .unwrap()
            .remove(filename)
            .unwrap_or(Category::Unclassified);
        record.category = original;
        record.path = original.serve_path(filename);
        Ok(message("restored"))
    }

    async fn purge_deleted(&self) -> Result<MessageResponse, ApiError> {
        self.enter("purge", "purge".to_string())?;
        self.images
            .lock()
            .unwrap()
            .retain(|img| !img.category.is_deleted());
        Ok(message("All deleted images have been permanently removed"))
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<GeneratedImage, ApiError> {
        self.enter("generate", format!("generate {}", request.prompt))?;
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        let filename = format!("generated_{}.png", requests.len());
        let record = image(&filename, Category::Unclassified);
        self.images.lock().unwrap().insert(0, record.clone());
        Ok(GeneratedImage {
            filename,
            path: record.path,
            category: Category::Unclassified,
        })
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, ApiError> {
        self.enter("models", "models".to_string())?;
        Ok(self.models.lock().unwrap().clone())
    }

    async fn setup_unclassified_folder(
        &self,
        folder_path: &str,
    ) -> Result<MessageResponse, ApiError> {
        self.enter("setup", format!("setup {}", folder_path))?;
        let mut status = self.status.lock().unwrap();
        status.unclassified_path_set = true;
        status.unclassified_path_exists = true;
        status.unclassified_path = Some(folder_path.to_string());
        Ok(message("Unclassified folder configured. Please restart the server."))
    }

    fn image_url(&self, path: &str) -> String {
        format!("http://fake.test{}", path)
    }

    fn name(&self) -> &str {
        "fake backend"
    }
}

/// Keeps whatever is copied instead of touching the terminal.
#[derive(Default)]
pub struct RecordingClipboard {
    written: Mutex<Vec<String>>,
    broken: AtomicBool,
}

impl RecordingClipboard {
    pub fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().clone()
    }

    pub fn break_pipe(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }
}

impl Clipboard for RecordingClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "clipboard closed").into());
        }
        self.written.lock().unwrap().push(text.to_string());
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}
