// Generation form - collects txt2img parameters and submits them to the backend
mod error;
mod params;

pub use error::GenerationError;
pub use params::{
    CFG_RANGE, CFG_STEP, GenerationParams, RANDOM_SEED, SAMPLERS, SIZE_RANGE, SIZE_STEP,
    STEPS_RANGE,
};

use crate::GenerationDefaults;
use crate::api::{DynBackend, GeneratedImage, ModelInfo};
use tracing::{error, info, warn};


pub struct GenerationForm {
    backend: DynBackend,
    pub params: GenerationParams,
    models: Vec<ModelInfo>,
    selected_model: Option<String>,
    models_error: Option<String>,
    is_generating: bool,
    error: Option<String>,
    last_generated: Option<GeneratedImage>,
}

impl GenerationForm {
    pub fn new(backend: DynBackend, defaults: &GenerationDefaults) -> Self {
        Self {
            backend,
            params: GenerationParams::from_defaults(defaults),
            models: Vec::new(),
            selected_model: None,
            models_error: None,
            is_generating: false,
            error: None,
            last_generated: None,
        }
    }

    pub fn models(&self) -> &[ModelInfo] {
        &self.models
    }

    pub fn selected_model(&self) -> Option<&str> {
        self.selected_model.as_deref()
    }

    /// Shown inside the model selector; it never blocks submitting.
    pub fn models_error(&self) -> Option<&str> {
        self.models_error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.is_generating
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_generated(&self) -> Option<&GeneratedImage> {
        self.last_generated.as_ref()
    }

    /// Where the most recent result can be fetched from.
    pub fn generated_image_url(&self) -> Option<String> {
        self.last_generated.as_ref().map(|image| {
            self.backend
                .image_url(&image.category.serve_path(&image.filename))
        })
    }

    /// Fetches the model list. The first model is selected unless the current selection is
    /// still offered.
    pub async fn load_models(&mut self) -> Result<(), GenerationError> {
        match self.backend.models().await {
            Ok(models) => {
                info!("Loaded {} models", models.len());
                let keep = self
                    .selected_model
                    .as_ref()
                    .is_some_and(|id| models.iter().any(|m| &m.id == id));
                if !keep {
                    self.selected_model = models.first().map(|m| m.id.clone());
                }
                self.models = models;
                self.models_error = None;
                Ok(())
            }
            Err(e) => {
                warn!("Could not load models: {}", e);
                self.models.clear();
                self.selected_model = None;
                self.models_error = Some(e.to_string());
                Err(e.into())
            }
        }
    }

    pub fn select_model(&mut self, id: &str) -> Result<(), GenerationError> {
        let model = self
            .models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| GenerationError::UnknownModel(id.to_string()))?;
        self.selected_model = Some(model.id.clone());
        Ok(())
    }

    /// Sends the form to the backend. The `&mut` borrow keeps a second submit out until this
    /// one finishes.
    pub async fn submit(&mut self) -> Result<GeneratedImage, GenerationError> {
        if self.params.prompt.trim().is_empty() {
            self.error = Some(GenerationError::EmptyPrompt.to_string());
            return Err(GenerationError::EmptyPrompt);
        }

        let request = self.params.to_request(self.selected_model.clone());
        self.is_generating = true;
        self.error = None;

        let result = self.backend.generate(&request).await;
        self.is_generating = false;

        match result {
            Ok(generated) => {
                info!("Generated {}", generated.filename);
                self.params.reset_after_generation();
                self.last_generated = Some(generated.clone());
                Ok(generated)
            }
            Err(e) => {
                error!("Generation failed: {}", e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}
