//! Full-size image viewer with wrap-around navigation over the visible list.

use std::str::FromStr;

/// Keys the viewer reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerKey {
    Escape,
    ArrowRight,
    ArrowLeft,
}

impl FromStr for ViewerKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "esc" | "escape" | "close" => Ok(ViewerKey::Escape),
            "right" | "arrowright" | "next" | "l" => Ok(ViewerKey::ArrowRight),
            "left" | "arrowleft" | "prev" | "previous" | "h" => Ok(ViewerKey::ArrowLeft),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalViewer {
    index: Option<usize>,
    selected: Option<String>,
    show_metadata: bool,
}

impl ModalViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn selected_filename(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn show_metadata(&self) -> bool {
        self.show_metadata
    }

    pub fn open(&mut self, index: usize, filename: impl Into<String>) {
        self.index = Some(index);
        self.selected = Some(filename.into());
    }

    pub fn close(&mut self) {
        self.index = None;
        self.selected = None;
        self.show_metadata = false;
    }

    pub fn toggle_metadata(&mut self) {
        if self.is_open() {
            self.show_metadata = !self.show_metadata;
        }
    }

    /// Advances one image. `len` must be the visible list's length right now.
    pub fn next(&mut self, len: usize) -> Option<usize> {
        let current = self.index?;
        if len == 0 {
            return None;
        }
        let next = (current + 1) % len;
        self.index = Some(next);
        Some(next)
    }

    /// Steps back one image. `len` must be the visible list's length right now.
    pub fn previous(&mut self, len: usize) -> Option<usize> {
        let current = self.index?;
        if len == 0 {
            return None;
        }
        let previous = (current % len + len - 1) % len;
        self.index = Some(previous);
        Some(previous)
    }

    /// Records which file ended up under the cursor after navigating.
    pub fn set_selected(&mut self, filename: impl Into<String>) {
        if self.is_open() {
            self.selected = Some(filename.into());
        }
    }

    /// Re-anchors the viewer after the visible list changed.
    ///
    /// `position` is where the selected file now sits, if it is still visible. When it is
    /// gone the cursor stays put, clamped to the new length, and an empty list closes the
    /// viewer.
    pub fn resync(&mut self, position: Option<usize>, len: usize) {
        let Some(current) = self.index else {
            return;
        };

        if len == 0 {
            self.close();
            return;
        }

        self.index = Some(position.unwrap_or_else(|| current.min(len - 1)));
    }
}
