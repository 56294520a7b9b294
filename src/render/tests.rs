use super::*;
use crate::GenerationDefaults;
use crate::api::{Category, Rating};
use crate::clipboard::CopyFeedback;
use crate::generation::GenerationForm;
use crate::library::ImageLibrary;
use crate::setup::SetupWizard;
use crate::testing::{FakeBackend, image, image_with_parameters, model};
use std::sync::Arc;
use std::time::Duration;

const PARAMETERS: &str = "a quiet harbor at dawn\n\
    Negative prompt: blurry, watermark\n\
    Steps: 20, Sampler: Euler a, CFG scale: 7";

async fn loaded_library(images: Vec<crate::api::ImageRecord>) -> ImageLibrary {
    let backend = Arc::new(FakeBackend::with_images(images));
    let mut library = ImageLibrary::new(backend);
    library.fetch_all().await.unwrap();
    library
}

#[test]
fn test_all_templates_parse() {
    assert!(TemplateEngine::new().is_ok());
}

#[test]
fn test_format_timestamp() {
    assert_eq!(format_timestamp(1_717_000_000.0), "2024-05-29 16:26:40");
    assert_eq!(format_timestamp(0.0), "unknown");
}

#[test]
fn test_card_actions_by_category() {
    assert_eq!(
        card_actions(Category::Unclassified),
        vec!["rate S", "rate A", "rate B", "rate C", "rate D", "delete"]
    );
    assert_eq!(
        card_actions(Category::Rated(Rating::B)),
        vec!["rate S", "rate A", "rate C", "rate D", "delete"]
    );
    assert_eq!(
        card_actions(Category::Deleted),
        vec!["restore", "delete permanently"]
    );
}

#[tokio::test]
async fn test_gallery_lists_visible_cards() {
    let engine = TemplateEngine::new().unwrap();
    let library = loaded_library(vec![
        image("first.png", Category::Unclassified),
        image("gone.png", Category::Deleted),
        image("best.png", Category::Rated(Rating::S)),
    ])
    .await;

    let output = engine.render(&GalleryView::new("Sikority", &library)).unwrap();

    assert!(output.starts_with("== Sikority | Gallery =="));
    assert!(output.contains("Filter: all"));
    assert!(output.contains("Showing 2 of 3"));
    assert!(output.contains("[1] first.png  (unclassified)"));
    assert!(output.contains("[2] best.png  <S>"));
    assert!(output.contains("http://fake.test/api/serve-image/S/best.png"));
    assert!(!output.contains("gone.png"));
    assert!(!output.contains("purge:"));
}

#[tokio::test]
async fn test_gallery_before_first_load() {
    let engine = TemplateEngine::new().unwrap();
    let library = ImageLibrary::new(Arc::new(FakeBackend::default()));

    let output = engine.render(&GalleryView::new("Sikority", &library)).unwrap();
    assert!(output.contains("Loading images..."));
    assert!(!output.contains("No images."));
}

#[tokio::test]
async fn test_gallery_after_failed_first_load() {
    let engine = TemplateEngine::new().unwrap();
    let backend = Arc::new(FakeBackend::with_images(vec![image(
        "a.png",
        Category::Unclassified,
    )]));
    backend.fail("list");
    let mut library = ImageLibrary::new(backend);
    let _ = library.fetch_all().await;

    let output = engine.render(&GalleryView::new("Sikority", &library)).unwrap();
    assert!(output.contains("! list failed"));
    assert!(output.contains("No images."));
    assert!(!output.contains("Loading images..."));
}

#[tokio::test]
async fn test_gallery_deleted_filter_offers_purge() {
    let engine = TemplateEngine::new().unwrap();
    let mut library = loaded_library(vec![
        image("a.png", Category::Deleted),
        image("b.png", Category::Deleted),
    ])
    .await;
    library.set_filter(Some(Category::Deleted));
    library.request_purge();

    let output = engine.render(&GalleryView::new("Sikority", &library)).unwrap();
    assert!(output.contains("Filter: deleted"));
    assert!(output.contains("actions: restore, delete permanently"));
    assert!(output.contains("purge: permanently delete all 2 images"));
    assert!(output.contains("? Permanently delete every image in the deleted folder? (yes/no)"));
}

#[tokio::test]
async fn test_gallery_empty_filter() {
    let engine = TemplateEngine::new().unwrap();
    let mut library = loaded_library(vec![image("a.png", Category::Unclassified)]).await;
    library.set_filter(Some(Category::Rated(Rating::D)));

    let output = engine.render(&GalleryView::new("Sikority", &library)).unwrap();
    assert!(output.contains("No images."));
}

#[tokio::test]
async fn test_viewer_closed_has_no_view() {
    let library = loaded_library(vec![image("a.png", Category::Unclassified)]).await;
    let feedback = CopyFeedback::new(Duration::from_secs(2));
    assert!(ViewerView::new("Sikority", &library, &feedback).is_none());
}

#[tokio::test]
async fn test_viewer_metadata_panel() {
    let engine = TemplateEngine::new().unwrap();
    let mut library = loaded_library(vec![image_with_parameters(
        "harbor.png",
        Category::Rated(Rating::A),
        PARAMETERS,
    )])
    .await;
    library.open(0).unwrap();

    let mut feedback = CopyFeedback::new(Duration::from_secs(2));
    let view = ViewerView::new("Sikority", &library, &feedback).unwrap();
    let output = engine.render(&view).unwrap();
    assert!(output.contains("Image 1 of 1: harbor.png  <A>"));
    assert!(output.contains("keys: left, right, esc, info"));
    assert!(!output.contains("-- Metadata --"));

    library.toggle_metadata();
    feedback.record("a quiet harbor at dawn");
    let view = ViewerView::new("Sikority", &library, &feedback).unwrap();
    let output = engine.render(&view).unwrap();

    assert!(output.contains("-- Metadata --"));
    assert!(output.contains("Prompt (copied):\n  a quiet harbor at dawn"));
    assert!(output.contains("Negative prompt:\n  blurry, watermark"));
    assert!(output.contains("  Steps: 20 | Sampler: Euler a | CFG scale: 7"));
}

#[tokio::test]
async fn test_viewer_without_metadata_has_no_info_key() {
    let engine = TemplateEngine::new().unwrap();
    let mut library = loaded_library(vec![image("plain.png", Category::Unclassified)]).await;
    library.open(0).unwrap();

    let feedback = CopyFeedback::new(Duration::from_secs(2));
    let view = ViewerView::new("Sikority", &library, &feedback).unwrap();
    let output = engine.render(&view).unwrap();

    assert!(output.contains("keys: left, right, esc\n"));
    assert!(!view.has_metadata);
}

#[tokio::test]
async fn test_generate_view() {
    let engine = TemplateEngine::new().unwrap();
    let backend = Arc::new(FakeBackend::default());
    *backend.models.lock().unwrap() = vec![model("sdxl"), model("anime")];
    let mut form = GenerationForm::new(backend, &GenerationDefaults::default());
    form.load_models().await.unwrap();
    form.params.prompt = "glass city".to_string();

    let output = engine.render(&GenerateView::new("Sikority", &form)).unwrap();

    assert!(output.contains("== Sikority | Generate =="));
    assert!(output.contains("prompt:           glass city"));
    assert!(output.contains("width x height:   768 x 1344"));
    assert!(output.contains("seed:             random"));
    assert!(output.contains("  * sdxl  sdxl"));
    assert!(output.contains("DPM++ 2M Karras, Euler a, Euler"));
    assert!(!output.contains("Last result"));

    form.submit().await.unwrap();
    let output = engine.render(&GenerateView::new("Sikority", &form)).unwrap();
    assert!(output.contains(
        "Last result: http://fake.test/api/serve-image/unclassified/generated_1.png"
    ));
}

#[tokio::test]
async fn test_status_view_when_setup_required() {
    let engine = TemplateEngine::new().unwrap();
    let mut wizard = SetupWizard::new(Arc::new(FakeBackend::default()));
    wizard.check_status().await;

    let output = engine
        .render(&StatusView::new("Sikority", "fake backend", &wizard))
        .unwrap();
    assert!(output.contains("Backend: fake backend"));
    assert!(output.contains("Unclassified folder: not set  (setup required"));
}

#[test]
fn test_help_lists_ratings_and_fields() {
    let engine = TemplateEngine::new().unwrap();
    let output = engine.render(&HelpView::new("Sikority")).unwrap();
    assert!(output.contains("S, A, B, C, D"));
    assert!(output.contains("prompt, negative, width, height, steps, cfg, sampler, seed"));
}
