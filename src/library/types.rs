use crate::api::Category;
use serde::Serialize;

/// A destructive action waiting for the user to say yes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PendingAction {
    Delete { filename: String, category: Category },
    Restore { filename: String },
    PurgeDeleted,
}

impl PendingAction {
    pub fn prompt(&self) -> String {
        match self {
            PendingAction::Delete { filename, category } if category.is_deleted() => {
                format!("Permanently delete {}? This cannot be undone.", filename)
            }
            PendingAction::Delete { filename, .. } => {
                format!("Move {} to the deleted folder?", filename)
            }
            PendingAction::Restore { filename } => format!("Restore {}?", filename),
            PendingAction::PurgeDeleted => {
                "Permanently delete every image in the deleted folder?".to_string()
            }
        }
    }
}
