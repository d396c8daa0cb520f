//! Error types for the fitroom composition engine.

use crate::catalog::Category;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the composition engine.
///
/// Variants fall into three classes:
/// - user-recoverable conditions (nothing selected, locked or empty slot),
///   reported to the user with no state change;
/// - collaborator failures (catalog fetch, snapshot render, upload, persist),
///   reported with the failing stage, session state preserved for retry;
/// - invariant violations (programmer error), handled as logged no-ops so an
///   unsaved composition is never lost to a crash.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum FitroomError {
    /// Navigation or shuffle attempted on a locked slot
    #[error("Slot '{category}' is locked")]
    SlotLocked { category: Category },

    /// Navigation attempted on a slot with no available items
    #[error("Slot '{category}' has no items to browse")]
    SlotEmpty { category: Category },

    /// Commit requested with no resolved slot item or empty canvas
    #[error("Nothing to save")]
    NothingToSave,

    /// Wardrobe catalog could not be fetched
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A commit is already running for this session
    #[error("A save is already in progress")]
    CommitInFlight,

    /// An external collaborator call failed
    #[error("Save failed during {stage}: {message}")]
    Collaborator { stage: String, message: String },

    /// Slot operation targeted a category outside the active configuration
    #[error("Category '{category}' is not part of the active configuration")]
    SlotNotInConfiguration { category: Category },

    /// Slot index pointed past the end of a category's item list
    #[error("Index {index} is out of range for slot '{category}'")]
    SlotIndexOutOfRange { category: Category, index: usize },

    /// Canvas operation targeted an item id that does not exist
    #[error("Canvas item '{id}' not found")]
    UnknownCanvasItem { id: String },

    /// Operation requires the other composition mode
    #[error("Operation requires {expected} mode")]
    WrongMode { expected: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl FitroomError {
    /// Creates a CatalogUnavailable error
    pub fn catalog_unavailable(message: impl Into<String>) -> Self {
        Self::CatalogUnavailable(message.into())
    }

    /// Creates a Collaborator error for the given pipeline stage
    pub fn collaborator(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Creates a WrongMode error
    pub fn wrong_mode(expected: impl Into<String>) -> Self {
        Self::WrongMode {
            expected: expected.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// True for conditions the user can resolve by changing their selection
    /// or retrying; state is untouched when these are returned.
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::SlotLocked { .. }
                | Self::SlotEmpty { .. }
                | Self::NothingToSave
                | Self::CatalogUnavailable(_)
                | Self::CommitInFlight
        )
    }

    /// True when an external collaborator (catalog, renderer, storage,
    /// persistence) failed.
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(self, Self::Collaborator { .. } | Self::CatalogUnavailable(_))
    }

    /// True for programmer errors that are handled as no-ops rather than
    /// crashing the session.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::SlotNotInConfiguration { .. }
                | Self::SlotIndexOutOfRange { .. }
                | Self::UnknownCanvasItem { .. }
                | Self::WrongMode { .. }
        )
    }
}

impl From<anyhow::Error> for FitroomError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, FitroomError>`.
pub type Result<T> = std::result::Result<T, FitroomError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(
            FitroomError::SlotLocked {
                category: Category::Tops
            }
            .is_user_recoverable()
        );
        assert!(FitroomError::NothingToSave.is_user_recoverable());
        assert!(FitroomError::collaborator("uploading", "timeout").is_collaborator_failure());
        assert!(
            FitroomError::SlotNotInConfiguration {
                category: Category::Dresses
            }
            .is_invariant_violation()
        );
        assert!(
            FitroomError::SlotIndexOutOfRange {
                category: Category::Tops,
                index: 9
            }
            .is_invariant_violation()
        );
        assert!(!FitroomError::NothingToSave.is_invariant_violation());
    }

    #[test]
    fn test_collaborator_error_names_stage() {
        let err = FitroomError::collaborator("uploading", "503 from storage");
        assert!(err.to_string().contains("uploading"));
    }
}
