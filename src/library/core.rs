use super::{ImageLibrary, LibraryError, PendingAction, matches_filter};
use crate::api::{ApiError, Category, Rating};
use crate::viewer::ViewerKey;
use tracing::{debug, error, info};

impl ImageLibrary {
    /// Replaces the local listing with the server's.
    ///
    /// On failure the visible list is emptied but the previous listing is kept, so a later
    /// filter change still has something to show.
    pub async fn fetch_all(&mut self) -> Result<(), LibraryError> {
        self.last_error = None;

        match self.backend.list_images().await {
            Ok(images) => {
                info!("Loaded {} images", images.len());
                self.all_images = images;
                self.loaded = true;
                self.recompute_visible();
                Ok(())
            }
            Err(e) => {
                self.loaded = true;
                self.visible.clear();
                self.viewer.close();
                Err(self.record_error(e))
            }
        }
    }

    pub fn set_filter(&mut self, filter: Option<Category>) {
        debug!(
            "Filter set to {}",
            filter.map(|c| c.as_str()).unwrap_or("all")
        );
        self.filter = filter;
        self.recompute_visible();
    }

    /// Rates an image, then patches the local record in place without re-fetching.
    pub async fn classify(&mut self, filename: &str, rating: Rating) -> Result<(), LibraryError> {
        if let Err(e) = self.backend.classify(filename, rating).await {
            return Err(self.record_error(e));
        }

        let category = Category::Rated(rating);
        for record in self
            .all_images
            .iter_mut()
            .filter(|img| img.filename == filename && !img.category.is_deleted())
        {
            record.category = category;
            record.path = category.serve_path(filename);
        }

        info!("Classified {} as {}", filename, rating);
        self.recompute_visible();
        Ok(())
    }

    pub async fn classify_current(&mut self, rating: Rating) -> Result<(), LibraryError> {
        let filename = self
            .current()
            .map(|img| img.filename.clone())
            .ok_or(LibraryError::ViewerClosed)?;
        self.classify(&filename, rating).await
    }

    pub fn request_delete(&mut self, filename: impl Into<String>, category: Category) {
        self.pending = Some(PendingAction::Delete {
            filename: filename.into(),
            category,
        });
    }

    pub fn request_restore(&mut self, filename: impl Into<String>) {
        self.pending = Some(PendingAction::Restore {
            filename: filename.into(),
        });
    }

    pub fn request_purge(&mut self) {
        self.pending = Some(PendingAction::PurgeDeleted);
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Runs whatever is waiting for confirmation. The pending action is cleared whether it
    /// succeeds or not.
    pub async fn confirm(&mut self) -> Result<(), LibraryError> {
        let action = self.pending.take().ok_or(LibraryError::NothingPending)?;

        match action {
            PendingAction::Delete { filename, category } => {
                self.execute_delete(&filename, category).await
            }
            PendingAction::Restore { filename } => self.execute_restore(&filename).await,
            PendingAction::PurgeDeleted => self.execute_purge().await,
        }
    }

    async fn execute_delete(&mut self, filename: &str, category: Category) -> Result<(), LibraryError> {
        if let Err(e) = self.backend.delete_image(filename, category).await {
            return Err(self.record_error(e));
        }

        if category.is_deleted() {
            self.all_images
                .retain(|img| !(img.filename == filename && img.category.is_deleted()));
            info!("Permanently deleted {}", filename);
        } else {
            for record in self
                .all_images
                .iter_mut()
                .filter(|img| img.filename == filename && img.category == category)
            {
                record.category = Category::Deleted;
                record.path = Category::Deleted.serve_path(filename);
            }
            info!("Moved {} to the deleted folder", filename);
        }

        if self.viewer.selected_filename() == Some(filename) {
            self.viewer.close();
        }
        self.recompute_visible();
        Ok(())
    }

    async fn execute_restore(&mut self, filename: &str) -> Result<(), LibraryError> {
        if let Err(e) = self.backend.restore(filename).await {
            return Err(self.record_error(e));
        }
        info!("Restored {}", filename);
        self.fetch_all().await
    }

    async fn execute_purge(&mut self) -> Result<(), LibraryError> {
        if let Err(e) = self.backend.purge_deleted().await {
            return Err(self.record_error(e));
        }

        // The whole local set is dropped, not only the deleted folder; the next fetch
        // brings the rest back.
        info!("Purged deleted images");
        self.all_images.clear();
        self.viewer.close();
        self.recompute_visible();
        Ok(())
    }

    pub fn open(&mut self, position: usize) -> Result<(), LibraryError> {
        let filename = self
            .visible_at(position)
            .map(|img| img.filename.clone())
            .ok_or(LibraryError::NoSuchPosition(position))?;
        self.viewer.open(position, filename);
        Ok(())
    }

    pub fn close(&mut self) {
        self.viewer.close();
    }

    pub fn next(&mut self) {
        let len = self.visible.len();
        if self.viewer.next(len).is_some() {
            self.sync_selected();
        }
    }

    pub fn previous(&mut self) {
        let len = self.visible.len();
        if self.viewer.previous(len).is_some() {
            self.sync_selected();
        }
    }

    /// The metadata panel only exists for images that carry metadata.
    pub fn toggle_metadata(&mut self) {
        if self.current().is_some_and(|img| img.has_metadata()) {
            self.viewer.toggle_metadata();
        }
    }

    /// Applies a key press. Returns `false` when the viewer is closed and the key was ignored.
    pub fn handle_key(&mut self, key: ViewerKey) -> bool {
        if !self.viewer.is_open() {
            return false;
        }

        match key {
            ViewerKey::Escape => self.close(),
            ViewerKey::ArrowRight => self.next(),
            ViewerKey::ArrowLeft => self.previous(),
        }
        true
    }

    fn sync_selected(&mut self) {
        if let Some(filename) = self.current().map(|img| img.filename.clone()) {
            self.viewer.set_selected(filename);
        }
    }

    fn recompute_visible(&mut self) {
        let filter = self.filter;
        self.visible = self
            .all_images
            .iter()
            .enumerate()
            .filter(|(_, img)| matches_filter(img.category, filter))
            .map(|(i, _)| i)
            .collect();

        let position = self.viewer.selected_filename().and_then(|selected| {
            self.visible
                .iter()
                .position(|&i| self.all_images[i].filename == selected)
        });
        self.viewer.resync(position, self.visible.len());
        self.sync_selected();
    }

    fn record_error(&mut self, err: ApiError) -> LibraryError {
        error!("{}", err);
        self.last_error = Some(err.to_string());
        LibraryError::Api(err)
    }
}
