// Image library - the full listing from the server plus the filtered view the user sees
mod core;
mod error;
mod types;

pub use error::LibraryError;
pub use types::PendingAction;

use crate::api::{Category, DynBackend, ImageRecord};
use crate::viewer::ModalViewer;


pub struct ImageLibrary {
    pub(crate) backend: DynBackend,
    pub(crate) all_images: Vec<ImageRecord>,
    /// Indices into `all_images`, in the same order.
    pub(crate) visible: Vec<usize>,
    pub(crate) filter: Option<Category>,
    pub(crate) loaded: bool,
    pub(crate) last_error: Option<String>,
    pub(crate) pending: Option<PendingAction>,
    pub(crate) viewer: ModalViewer,
}

/// `None` shows everything except the deleted folder.
pub fn matches_filter(category: Category, filter: Option<Category>) -> bool {
    match filter {
        Some(wanted) => category == wanted,
        None => !category.is_deleted(),
    }
}

impl ImageLibrary {
    pub fn new(backend: DynBackend) -> Self {
        Self {
            backend,
            all_images: Vec::new(),
            visible: Vec::new(),
            filter: None,
            loaded: false,
            last_error: None,
            pending: None,
            viewer: ModalViewer::new(),
        }
    }

    pub fn backend(&self) -> &DynBackend {
        &self.backend
    }

    pub fn all_images(&self) -> &[ImageRecord] {
        &self.all_images
    }

    pub fn visible(&self) -> impl Iterator<Item = &ImageRecord> + '_ {
        self.visible.iter().map(|&i| &self.all_images[i])
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    pub fn visible_at(&self, position: usize) -> Option<&ImageRecord> {
        self.visible.get(position).map(|&i| &self.all_images[i])
    }

    pub fn filter(&self) -> Option<Category> {
        self.filter
    }

    /// Whether a listing request has finished, successfully or not.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn pending(&self) -> Option<&PendingAction> {
        self.pending.as_ref()
    }

    pub fn viewer(&self) -> &ModalViewer {
        &self.viewer
    }

    /// The image open in the viewer.
    pub fn current(&self) -> Option<&ImageRecord> {
        self.viewer.index().and_then(|i| self.visible_at(i))
    }

    /// "Delete all" is offered only while looking at a non-empty deleted folder.
    pub fn can_purge(&self) -> bool {
        self.filter == Some(Category::Deleted) && !self.visible.is_empty()
    }

    pub fn image_url(&self, record: &ImageRecord) -> String {
        self.backend.image_url(&record.path)
    }
}
