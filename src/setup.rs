//! First-run setup: pointing the backend at the folder new images land in.

use crate::api::{ApiError, DynBackend};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

pub const FOLDER_NOT_SET: &str = "not set";
pub const FOLDER_ERROR: &str = "error";

pub const RESTART_MESSAGE: &str =
    "Folder configured. Restart the backend server for the change to take effect.";

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("A folder path is required")]
    EmptyPath,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SetupState {
    pub required: bool,
    /// The configured folder, or a placeholder when there is none or it could not be read.
    pub current_folder: String,
    pub folder_exists: bool,
}

impl Default for SetupState {
    fn default() -> Self {
        Self {
            required: false,
            current_folder: FOLDER_NOT_SET.to_string(),
            folder_exists: false,
        }
    }
}

pub struct SetupWizard {
    backend: DynBackend,
    state: SetupState,
    message: Option<String>,
    error: Option<String>,
}

impl SetupWizard {
    pub fn new(backend: DynBackend) -> Self {
        Self {
            backend,
            state: SetupState::default(),
            message: None,
            error: None,
        }
    }

    pub fn state(&self) -> &SetupState {
        &self.state
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Asks the backend whether the unclassified folder is configured.
    ///
    /// A failed check counts as "setup required" and never returns an error.
    pub async fn check_status(&mut self) -> &SetupState {
        self.state = match self.backend.status().await {
            Ok(status) => {
                let path = status.unclassified_path.filter(|p| !p.is_empty());
                SetupState {
                    required: path.is_none(),
                    current_folder: path.unwrap_or_else(|| FOLDER_NOT_SET.to_string()),
                    folder_exists: status.unclassified_path_exists,
                }
            }
            Err(e) => {
                error!("Setup status check failed: {}", e);
                SetupState {
                    required: true,
                    current_folder: FOLDER_ERROR.to_string(),
                    folder_exists: false,
                }
            }
        };
        &self.state
    }

    /// Sends the folder path to the backend. The backend only picks it up after a restart, so
    /// the local state is left as it was.
    pub async fn submit(&mut self, folder_path: &str) -> Result<(), SetupError> {
        self.message = None;
        self.error = None;

        let folder_path = folder_path.trim();
        if folder_path.is_empty() {
            self.error = Some(SetupError::EmptyPath.to_string());
            return Err(SetupError::EmptyPath);
        }

        match self.backend.setup_unclassified_folder(folder_path).await {
            Ok(_) => {
                info!("Unclassified folder set to {}", folder_path);
                self.message = Some(RESTART_MESSAGE.to_string());
                Ok(())
            }
            Err(e) => {
                error!("Folder setup failed: {}", e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}
