//! The outfit save pipeline.
//!
//! Committing a composition session walks a linear state machine:
//! `idle → validating → generating → uploading → saving → idle`, with a
//! failure edge from any non-idle stage straight back to idle. Whatever
//! happens, the in-memory session is left exactly as it was — either all
//! stages complete and an outfit id comes back, or the user can retry
//! without re-composing. Only one commit may run per pipeline at a time; a
//! second request is rejected, not queued.

use fitroom_core::catalog::ItemCatalog;
use fitroom_core::collaborators::{ImageStore, OutfitStore, SnapshotRenderer};
use fitroom_core::error::{FitroomError, Result};
use fitroom_core::session::CompositionSession;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// The stage a save attempt is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveStage {
    /// No save in progress.
    Idle,
    /// Checking the composition has anything to save.
    Validating,
    /// Rendering the flattened preview image.
    Generating,
    /// Uploading the preview to storage.
    Uploading,
    /// Persisting the outfit record.
    Saving,
}

/// Transient progress of a save attempt. Resets to `{idle, 0}` on
/// completion or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProgress {
    pub stage: SaveStage,
    /// Overall percent in `[0, 100]`
    pub percent: u8,
}

impl SaveProgress {
    fn idle() -> Self {
        Self {
            stage: SaveStage::Idle,
            percent: 0,
        }
    }
}

impl Default for SaveProgress {
    fn default() -> Self {
        Self::idle()
    }
}

/// Callback type for save progress updates (for UI notifications).
pub type ProgressCallback = Arc<dyn Fn(SaveProgress) + Send + Sync>;

/// Orchestrates the render → upload → persist collaborators for one save
/// attempt at a time.
pub struct CommitPipeline {
    /// Renders the composition into a preview image
    renderer: Arc<dyn SnapshotRenderer>,
    /// Stores rendered preview images
    images: Arc<dyn ImageStore>,
    /// Persists outfit records
    outfits: Arc<dyn OutfitStore>,
    /// Current stage/percent; doubles as the in-flight flag
    progress: Mutex<SaveProgress>,
    /// Optional observer for progress updates
    on_progress: Option<ProgressCallback>,
}

impl CommitPipeline {
    /// Creates a pipeline over the three save collaborators.
    pub fn new(
        renderer: Arc<dyn SnapshotRenderer>,
        images: Arc<dyn ImageStore>,
        outfits: Arc<dyn OutfitStore>,
    ) -> Self {
        Self {
            renderer,
            images,
            outfits,
            progress: Mutex::new(SaveProgress::idle()),
            on_progress: None,
        }
    }

    /// Registers a progress observer, called on every stage or percent
    /// change.
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.on_progress = Some(callback);
        self
    }

    /// The current save progress.
    pub fn progress(&self) -> SaveProgress {
        *self.lock_progress()
    }

    /// Runs the full save pipeline for `session`.
    ///
    /// # Returns
    ///
    /// The id of the created or updated outfit record.
    ///
    /// # Errors
    ///
    /// - [`FitroomError::CommitInFlight`] if a save is already running
    /// - [`FitroomError::NothingToSave`] if no slot resolves to an item
    ///   (guided mode) or the canvas is empty (spatial mode); the renderer
    ///   is never called in this case
    /// - [`FitroomError::Collaborator`] naming the failing stage when a
    ///   collaborator call fails
    ///
    /// Every error path resets progress to `{idle, 0}` and leaves the
    /// session untouched.
    pub async fn commit(
        &self,
        session: &CompositionSession,
        catalog: &ItemCatalog,
    ) -> Result<String> {
        self.begin()?;

        if !session.has_content(catalog) {
            tracing::info!(session_id = %session.id, "nothing to save");
            self.reset();
            return Err(FitroomError::NothingToSave);
        }

        let mut payload = session.to_payload(catalog);

        self.set_progress(SaveStage::Generating, 0);
        let snapshot = match self
            .renderer
            .render(&payload, &|percent| {
                self.set_progress(SaveStage::Generating, scale_render_percent(percent));
            })
            .await
        {
            Ok(snapshot) => snapshot,
            Err(err) => return Err(self.fail("generating", err)),
        };

        self.set_progress(SaveStage::Uploading, 90);
        let stored = match self.images.upload(&snapshot.image_bytes).await {
            Ok(stored) => stored,
            Err(err) => return Err(self.fail("uploading", err)),
        };

        self.set_progress(SaveStage::Saving, 90);
        payload.preview_image = Some(stored);
        payload.derived_composition = Some(snapshot.derived_composition);
        let outfit_id = match self.outfits.create_or_update(&payload).await {
            Ok(id) => id,
            Err(err) => return Err(self.fail("saving", err)),
        };

        self.set_progress(SaveStage::Saving, 100);
        tracing::info!(session_id = %session.id, outfit_id, "outfit saved");
        self.reset();
        Ok(outfit_id)
    }

    /// Atomically checks that no save is running and enters `Validating`.
    fn begin(&self) -> Result<()> {
        let mut progress = self.lock_progress();
        if progress.stage != SaveStage::Idle {
            return Err(FitroomError::CommitInFlight);
        }
        *progress = SaveProgress {
            stage: SaveStage::Validating,
            percent: 0,
        };
        let snapshot = *progress;
        drop(progress);
        self.notify(snapshot);
        Ok(())
    }

    fn set_progress(&self, stage: SaveStage, percent: u8) {
        let snapshot = SaveProgress { stage, percent };
        *self.lock_progress() = snapshot;
        tracing::info!(stage = ?stage, percent, "save progress");
        self.notify(snapshot);
    }

    fn fail(&self, stage: &'static str, err: anyhow::Error) -> FitroomError {
        tracing::warn!(stage, error = %err, "save pipeline failed");
        self.reset();
        FitroomError::collaborator(stage, err.to_string())
    }

    fn reset(&self) {
        *self.lock_progress() = SaveProgress::idle();
        self.notify(SaveProgress::idle());
    }

    fn notify(&self, progress: SaveProgress) {
        if let Some(callback) = &self.on_progress {
            callback(progress);
        }
    }

    fn lock_progress(&self) -> std::sync::MutexGuard<'_, SaveProgress> {
        self.progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Maps the renderer's own 0–100 progress into the 0–90 band the render
/// stage occupies in the overall pipeline.
fn scale_render_percent(percent: u8) -> u8 {
    ((percent.min(100) as u16 * 90) / 100) as u8
}
