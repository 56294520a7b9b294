use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{Duration, Instant};
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClipboardError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError>;
    fn name(&self) -> &str;
}

pub type DynClipboard = Arc<dyn Clipboard>;

/// Copies through the terminal with an OSC 52 escape sequence.
///
/// Works over SSH and inside most modern terminal emulators without touching the local
/// display server.
pub struct TerminalClipboard;

impl TerminalClipboard {
    pub fn new() -> Self {
        Self
    }

    pub fn sequence(text: &str) -> String {
        format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
    }
}

impl Default for TerminalClipboard {
    fn default() -> Self {
        Self::new()
    }
}

impl Clipboard for TerminalClipboard {
    fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(Self::sequence(text).as_bytes())?;
        stdout.flush()?;
        debug!("Copied {} bytes to the terminal clipboard", text.len());
        Ok(())
    }

    fn name(&self) -> &str {
        "terminal (OSC 52)"
    }
}

/// The "copied" marker shown next to a prompt after copying it.
///
/// There is one slot: copying anything replaces the remembered text and restarts the timer.
#[derive(Debug, Clone)]
pub struct CopyFeedback {
    last: Option<(String, Instant)>,
    ttl: Duration,
}

impl CopyFeedback {
    pub fn new(ttl: Duration) -> Self {
        Self { last: None, ttl }
    }

    pub fn record(&mut self, text: impl Into<String>) {
        self.last = Some((text.into(), Instant::now()));
    }

    /// The text whose marker is still showing.
    pub fn current(&self) -> Option<&str> {
        match &self.last {
            Some((text, at)) if at.elapsed() < self.ttl => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn is_copied(&self, text: &str) -> bool {
        self.current() == Some(text)
    }
}
