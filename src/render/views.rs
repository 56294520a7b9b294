use crate::api::{Category, ImageRecord, Rating};
use crate::clipboard::CopyFeedback;
use crate::generation::{GenerationForm, GenerationParams, RANDOM_SEED, SAMPLERS};
use crate::library::ImageLibrary;
use crate::metadata::{self, GenerationInfo, MetadataEntry};
use crate::setup::{SetupState, SetupWizard};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A serializable view bound to one template.
pub trait View: Serialize {
    const TEMPLATE: &'static str;
}

/// Settable generation fields, as listed in the help text.
pub const FORM_FIELDS: [&str; 8] = [
    "prompt", "negative", "width", "height", "steps", "cfg", "sampler", "seed",
];

pub fn format_timestamp(secs: f64) -> String {
    if secs <= 0.0 {
        return "unknown".to_string();
    }
    DateTime::<Utc>::from_timestamp(secs.trunc() as i64, (secs.fract() * 1e9) as u32)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// What can be done with an image from its card, depending on where it lives.
pub fn card_actions(category: Category) -> Vec<String> {
    if category.is_deleted() {
        return vec!["restore".to_string(), "delete permanently".to_string()];
    }

    let mut actions: Vec<String> = Rating::ALL
        .iter()
        .filter(|rating| category.rating() != Some(**rating))
        .map(|rating| format!("rate {}", rating))
        .collect();
    actions.push("delete".to_string());
    actions
}

fn filter_label(filter: Option<Category>) -> String {
    filter.map_or("all", |c| c.as_str()).to_string()
}

#[derive(Debug, Serialize)]
pub struct CardView {
    /// 1-based, as typed in `open <n>`.
    pub number: usize,
    pub filename: String,
    pub category: String,
    pub rating: Option<String>,
    pub created: String,
    pub url: String,
    pub has_metadata: bool,
    pub actions: Vec<String>,
}

impl CardView {
    fn new(number: usize, record: &ImageRecord, url: String) -> Self {
        Self {
            number,
            filename: record.filename.clone(),
            category: record.category.to_string(),
            rating: record.category.rating().map(|r| r.to_string()),
            created: format_timestamp(record.created_at),
            url,
            has_metadata: record.has_metadata(),
            actions: card_actions(record.category),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GalleryView {
    pub app_name: String,
    pub title: String,
    pub filter: String,
    pub loaded: bool,
    pub error: Option<String>,
    pub pending: Option<String>,
    pub cards: Vec<CardView>,
    pub count: usize,
    pub total: usize,
    pub can_purge: bool,
}

impl GalleryView {
    pub fn new(app_name: &str, library: &ImageLibrary) -> Self {
        let cards: Vec<CardView> = library
            .visible()
            .enumerate()
            .map(|(i, record)| CardView::new(i + 1, record, library.image_url(record)))
            .collect();

        Self {
            app_name: app_name.to_string(),
            title: "Gallery".to_string(),
            filter: filter_label(library.filter()),
            loaded: library.is_loaded(),
            error: library.last_error().map(str::to_string),
            pending: library.pending().map(|p| p.prompt()),
            count: cards.len(),
            total: library.all_images().len(),
            cards,
            can_purge: library.can_purge(),
        }
    }
}

impl View for GalleryView {
    const TEMPLATE: &'static str = "gallery";
}

#[derive(Debug, Serialize)]
pub struct ViewerView {
    pub app_name: String,
    pub title: String,
    pub number: usize,
    pub total: usize,
    pub filename: String,
    pub category: String,
    pub rating: Option<String>,
    pub url: String,
    pub created: String,
    pub actions: Vec<String>,
    pub has_metadata: bool,
    pub show_metadata: bool,
    pub info: Option<GenerationInfo>,
    pub has_parameters: bool,
    pub extra: Vec<MetadataEntry>,
    pub prompt_copied: bool,
    pub negative_copied: bool,
    pub error: Option<String>,
    pub pending: Option<String>,
}

impl ViewerView {
    /// `None` while the viewer is closed.
    pub fn new(app_name: &str, library: &ImageLibrary, feedback: &CopyFeedback) -> Option<Self> {
        let index = library.viewer().index()?;
        let record = library.current()?;
        let info = GenerationInfo::from_metadata(record.metadata.as_ref());

        let prompt_copied = info
            .as_ref()
            .is_some_and(|i| feedback.is_copied(&i.prompt));
        let negative_copied = info
            .as_ref()
            .and_then(|i| i.negative_prompt.as_deref())
            .is_some_and(|n| feedback.is_copied(n));

        Some(Self {
            app_name: app_name.to_string(),
            title: "Viewer".to_string(),
            number: index + 1,
            total: library.visible_len(),
            filename: record.filename.clone(),
            category: record.category.to_string(),
            rating: record.category.rating().map(|r| r.to_string()),
            url: library.image_url(record),
            created: format_timestamp(record.created_at),
            actions: card_actions(record.category),
            has_metadata: record.has_metadata(),
            show_metadata: library.viewer().show_metadata(),
            has_parameters: info.as_ref().is_some_and(|i| !i.parameters.is_empty()),
            info,
            extra: metadata::extra_entries(record.metadata.as_ref()),
            prompt_copied,
            negative_copied,
            error: library.last_error().map(str::to_string),
            pending: library.pending().map(|p| p.prompt()),
        })
    }
}

impl View for ViewerView {
    const TEMPLATE: &'static str = "viewer";
}

#[derive(Debug, Serialize)]
pub struct ModelOption {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub selected: bool,
}

#[derive(Debug, Serialize)]
pub struct GenerateView {
    pub app_name: String,
    pub title: String,
    pub params: GenerationParams,
    pub random_seed: bool,
    pub samplers: Vec<&'static str>,
    pub models: Vec<ModelOption>,
    pub selected_model: Option<String>,
    pub models_error: Option<String>,
    pub is_generating: bool,
    pub error: Option<String>,
    pub result_url: Option<String>,
}

impl GenerateView {
    pub fn new(app_name: &str, form: &GenerationForm) -> Self {
        let selected = form.selected_model();
        let models = form
            .models()
            .iter()
            .map(|m| ModelOption {
                id: m.id.clone(),
                name: m.name.clone(),
                description: m.description.clone(),
                selected: selected == Some(m.id.as_str()),
            })
            .collect();

        Self {
            app_name: app_name.to_string(),
            title: "Generate".to_string(),
            params: form.params.clone(),
            random_seed: form.params.seed == RANDOM_SEED,
            samplers: SAMPLERS.to_vec(),
            models,
            selected_model: selected.map(str::to_string),
            models_error: form.models_error().map(str::to_string),
            is_generating: form.is_generating(),
            error: form.error().map(str::to_string),
            result_url: form.generated_image_url(),
        }
    }
}

impl View for GenerateView {
    const TEMPLATE: &'static str = "generate";
}

#[derive(Debug, Serialize)]
pub struct StatusView {
    pub app_name: String,
    pub title: String,
    pub backend: String,
    pub setup: SetupState,
    pub message: Option<String>,
    pub error: Option<String>,
}

impl StatusView {
    pub fn new(app_name: &str, backend: &str, wizard: &SetupWizard) -> Self {
        Self {
            app_name: app_name.to_string(),
            title: "Status".to_string(),
            backend: backend.to_string(),
            setup: wizard.state().clone(),
            message: wizard.message().map(str::to_string),
            error: wizard.error().map(str::to_string),
        }
    }
}

impl View for StatusView {
    const TEMPLATE: &'static str = "status";
}

#[derive(Debug, Serialize)]
pub struct HelpView {
    pub app_name: String,
    pub title: String,
    pub ratings: Vec<&'static str>,
    pub fields: Vec<&'static str>,
}

impl HelpView {
    pub fn new(app_name: &str) -> Self {
        Self {
            app_name: app_name.to_string(),
            title: "Help".to_string(),
            ratings: Rating::ALL.iter().map(|r| r.as_str()).collect(),
            fields: FORM_FIELDS.to_vec(),
        }
    }
}

impl View for HelpView {
    const TEMPLATE: &'static str = "help";
}
