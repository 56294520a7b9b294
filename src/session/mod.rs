// Interactive session - reads one command per line and re-renders the active view
mod command;

pub use command::{Command, CommandError, CopyTarget, Tab};

use crate::Config;
use crate::api::{Category, DynBackend};
use crate::clipboard::{CopyFeedback, DynClipboard};
use crate::generation::GenerationForm;
use crate::library::{ImageLibrary, LibraryError};
use crate::metadata::GenerationInfo;
use crate::render::{
    GalleryView, GenerateView, HelpView, RenderError, StatusView, TemplateEngine, ViewerView,
};
use crate::setup::SetupWizard;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};


const PROMPT: &str = "> ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Tab(Tab),
    Status,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    Quit,
}

pub struct Session {
    app_name: String,
    library: ImageLibrary,
    form: GenerationForm,
    setup: SetupWizard,
    clipboard: DynClipboard,
    feedback: CopyFeedback,
    engine: TemplateEngine,
    screen: Screen,
    notice: Option<String>,
}

impl Session {
    pub fn new(
        config: &Config,
        backend: DynBackend,
        clipboard: DynClipboard,
    ) -> Result<Self, RenderError> {
        Ok(Self {
            app_name: config.app.name.clone(),
            library: ImageLibrary::new(backend.clone()),
            form: GenerationForm::new(backend.clone(), &config.generation),
            setup: SetupWizard::new(backend),
            clipboard,
            feedback: CopyFeedback::new(Duration::from_millis(config.app.copy_feedback_millis)),
            engine: TemplateEngine::new()?,
            screen: Screen::Tab(Tab::Gallery),
            notice: None,
        })
    }

    pub fn library(&self) -> &ImageLibrary {
        &self.library
    }

    pub fn form(&self) -> &GenerationForm {
        &self.form
    }

    pub fn setup(&self) -> &SetupWizard {
        &self.setup
    }

    pub fn feedback(&self) -> &CopyFeedback {
        &self.feedback
    }

    /// Message about the last command that has no better place to be shown.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn tab(&self) -> Option<Tab> {
        match self.screen {
            Screen::Tab(tab) => Some(tab),
            _ => None,
        }
    }

    /// Checks setup, then loads images and models. Failures end up in the rendered views.
    pub async fn start(&mut self) {
        let required = self.setup.check_status().await.required;
        if required {
            info!("Unclassified folder is not configured");
            self.screen = Screen::Status;
            return;
        }

        let _ = self.library.fetch_all().await;
        let _ = self.form.load_models().await;
    }

    pub async fn execute(&mut self, command: Command) -> Outcome {
        debug!("Executing {:?}", command);
        self.notice = None;

        match command {
            Command::Quit => return Outcome::Quit,
            Command::Help => self.screen = Screen::Help,
            Command::Tab(tab) => {
                if tab == Tab::Generate && self.form.models().is_empty() {
                    let _ = self.form.load_models().await;
                }
                self.screen = Screen::Tab(tab);
            }
            Command::Status => {
                self.setup.check_status().await;
                self.screen = Screen::Status;
            }
            Command::Setup(path) => {
                let _ = self.setup.submit(&path).await;
                self.screen = Screen::Status;
            }
            Command::Set { field, value } => {
                if let Err(e) = self.form.params.set(&field, &value) {
                    self.notice = Some(e.to_string());
                }
                self.screen = Screen::Tab(Tab::Generate);
            }
            Command::Model(id) => {
                if let Err(e) = self.form.select_model(&id) {
                    self.notice = Some(e.to_string());
                }
                self.screen = Screen::Tab(Tab::Generate);
            }
            Command::Generate => {
                self.screen = Screen::Tab(Tab::Generate);
                if self.form.submit().await.is_ok() {
                    // The new image lands in the unclassified folder
                    let _ = self.library.fetch_all().await;
                }
            }
            Command::Copy(target) => self.copy(target),
            other => {
                self.screen = Screen::Tab(Tab::Gallery);
                let result = self.execute_gallery(other).await;
                self.report(result);
            }
        }

        Outcome::Continue
    }

    async fn execute_gallery(&mut self, command: Command) -> Result<(), LibraryError> {
        match command {
            Command::Refresh => self.library.fetch_all().await,
            Command::Filter(filter) => {
                self.library.set_filter(filter);
                Ok(())
            }
            Command::Open(position) => self.library.open(position),
            Command::Key(key) => {
                if !self.library.handle_key(key) {
                    return Err(LibraryError::ViewerClosed);
                }
                Ok(())
            }
            Command::Info => {
                if !self.library.viewer().is_open() {
                    return Err(LibraryError::ViewerClosed);
                }
                self.library.toggle_metadata();
                Ok(())
            }
            Command::Rate {
                position: None,
                rating,
            } => self.library.classify_current(rating).await,
            Command::Rate {
                position: Some(position),
                rating,
            } => {
                let (filename, _) = self.target(Some(position))?;
                self.library.classify(&filename, rating).await
            }
            Command::Delete(position) => {
                let (filename, category) = self.target(position)?;
                self.library.request_delete(filename, category);
                Ok(())
            }
            Command::Restore(position) => {
                let (filename, category) = self.target(position)?;
                if !category.is_deleted() {
                    self.notice = Some(format!("{} is not in the deleted folder", filename));
                    return Ok(());
                }
                self.library.request_restore(filename);
                Ok(())
            }
            Command::Purge => {
                if !self.library.can_purge() {
                    self.notice =
                        Some("Purge is offered under `filter deleted` when it has images".to_string());
                    return Ok(());
                }
                self.library.request_purge();
                Ok(())
            }
            Command::Yes => self.library.confirm().await,
            Command::No => {
                self.library.cancel();
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// The image at `position`, or the open one when no position is given.
    fn target(&self, position: Option<usize>) -> Result<(String, Category), LibraryError> {
        let record = match position {
            Some(p) => self
                .library
                .visible_at(p)
                .ok_or(LibraryError::NoSuchPosition(p))?,
            None => self.library.current().ok_or(LibraryError::ViewerClosed)?,
        };
        Ok((record.filename.clone(), record.category))
    }

    /// Backend failures already sit in the library's error slot; only local refusals need a
    /// notice.
    fn report(&mut self, result: Result<(), LibraryError>) {
        match result {
            Ok(()) | Err(LibraryError::Api(_)) => {}
            Err(e) => self.notice = Some(e.to_string()),
        }
    }

    fn copy(&mut self, target: CopyTarget) {
        self.screen = Screen::Tab(Tab::Gallery);

        let info = self
            .library
            .current()
            .and_then(|record| GenerationInfo::from_metadata(record.metadata.as_ref()));
        let Some(info) = info else {
            self.notice = Some("Open an image with generation parameters first".to_string());
            return;
        };

        let text = match target {
            CopyTarget::Prompt => Some(info.prompt),
            CopyTarget::NegativePrompt => info.negative_prompt,
        };
        let Some(text) = text else {
            self.notice = Some("This image has no negative prompt".to_string());
            return;
        };

        match self.clipboard.write_text(&text) {
            Ok(()) => self.feedback.record(text),
            Err(e) => {
                warn!("Copy through {} failed: {}", self.clipboard.name(), e);
                self.notice = Some(format!("Copy failed: {}", e));
            }
        }
    }

    pub fn render(&self) -> Result<String, RenderError> {
        let mut output = match self.screen {
            Screen::Help => self.engine.render(&HelpView::new(&self.app_name))?,
            Screen::Status => self.engine.render(&StatusView::new(
                &self.app_name,
                self.library.backend().name(),
                &self.setup,
            ))?,
            Screen::Tab(Tab::Generate) => self
                .engine
                .render(&GenerateView::new(&self.app_name, &self.form))?,
            Screen::Tab(Tab::Gallery) => {
                match ViewerView::new(&self.app_name, &self.library, &self.feedback) {
                    Some(view) => self.engine.render(&view)?,
                    None => self
                        .engine
                        .render(&GalleryView::new(&self.app_name, &self.library))?,
                }
            }
        };

        if let Some(notice) = &self.notice {
            output.push_str(&format!("* {}\n", notice));
        }
        Ok(output)
    }

    /// Runs until `quit` or end of input.
    pub async fn run<R, W>(&mut self, input: R, mut output: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.start().await;
        self.write_view(&mut output).await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command).await == Outcome::Quit {
                        break;
                    }
                }
                Err(CommandError::Empty) => {}
                Err(e) => self.notice = Some(e.to_string()),
            }
            self.write_view(&mut output).await?;
        }

        info!("Session ended");
        Ok(())
    }

    async fn write_view<W: AsyncWrite + Unpin>(&self, output: &mut W) -> std::io::Result<()> {
        let view = self.render().unwrap_or_else(|e| {
            error!("Rendering failed: {}", e);
            format!("Rendering failed: {}\n", e)
        });
        output.write_all(view.as_bytes()).await?;
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await
    }
}
