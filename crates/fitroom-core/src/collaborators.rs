//! External collaborator interfaces for the save pipeline.
//!
//! The engine owns no wire protocol or storage format; committing an outfit
//! means calling out to three collaborators in turn: render a preview image,
//! upload it, persist the outfit record. Each seam is an async trait so the
//! pipeline can be exercised against mocks.

use crate::session::OutfitPayload;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Render progress callback, fed percentages in `[0, 100]` of the render
/// work done so far.
pub type RenderProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// The output of a snapshot render.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSnapshot {
    /// Encoded preview image
    pub image_bytes: Vec<u8>,
    /// Renderer's own description of what was rendered; opaque to the engine
    /// and passed through to persistence for consistency checks
    pub derived_composition: serde_json::Value,
}

/// Renders the current composition into a flattened preview image.
#[async_trait]
pub trait SnapshotRenderer: Send + Sync {
    /// Renders `payload`'s composition, reporting incremental progress.
    ///
    /// This is a pure read of the composition: it must not mutate anything,
    /// and a failure leaves the session exactly as it was.
    async fn render(
        &self,
        payload: &OutfitPayload,
        on_progress: RenderProgressFn<'_>,
    ) -> anyhow::Result<RenderedSnapshot>;
}

/// Handle to an uploaded preview image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredImage {
    /// Public URL of the stored image
    pub url: String,
    /// Storage-side identifier, used for later cleanup
    pub storage_id: String,
}

/// Stores rendered preview images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Uploads an encoded image, returning its storage handle.
    async fn upload(&self, image: &[u8]) -> anyhow::Result<StoredImage>;
}

/// Persists completed outfit records.
#[async_trait]
pub trait OutfitStore: Send + Sync {
    /// Creates or updates the outfit described by `payload`.
    ///
    /// # Returns
    ///
    /// The identifier of the new or updated outfit record.
    async fn create_or_update(&self, payload: &OutfitPayload) -> anyhow::Result<String>;
}
