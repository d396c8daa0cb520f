//! Composition use case.
//!
//! Ties the session lifecycle together for the host application: load the
//! wardrobe catalog once, start sessions (fresh or from a persisted outfit),
//! and hand finished sessions to the commit pipeline. The catalog cache is
//! owned here and shared read-only with every session operation.

use crate::commit::{CommitPipeline, SaveProgress};
use fitroom_core::catalog::{CatalogProvider, ItemCatalog};
use fitroom_core::config::EngineConfig;
use fitroom_core::error::Result;
use fitroom_core::session::{CompositionSession, OutfitPayload};
use fitroom_core::slot::SlotConfiguration;
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockReadGuard};

/// Entry point for the composition screen.
///
/// Owns the item catalog cache and the commit pipeline; sessions themselves
/// are plain values handed back to the caller, which passes them into every
/// operation and drops them to discard unsaved work.
pub struct CompositionUseCase {
    /// Source of the user's wardrobe items
    provider: Arc<dyn CatalogProvider>,
    /// The save pipeline
    pipeline: CommitPipeline,
    /// Engine tunables applied to new sessions
    config: EngineConfig,
    /// Session-scoped wardrobe cache
    catalog: RwLock<ItemCatalog>,
}

impl CompositionUseCase {
    /// Creates a use case with default engine configuration.
    pub fn new(provider: Arc<dyn CatalogProvider>, pipeline: CommitPipeline) -> Self {
        Self::with_config(provider, pipeline, EngineConfig::default())
    }

    /// Creates a use case with an explicit engine configuration.
    pub fn with_config(
        provider: Arc<dyn CatalogProvider>,
        pipeline: CommitPipeline,
        config: EngineConfig,
    ) -> Self {
        Self {
            provider,
            pipeline,
            config,
            catalog: RwLock::new(ItemCatalog::new()),
        }
    }

    /// Fetches the wardrobe catalog once for this session scope.
    ///
    /// On failure the catalog stays empty and the error is surfaced as
    /// recoverable; composition still works, with every slot unset and no
    /// canvas drag sources, until a retry succeeds.
    pub async fn load_catalog(&self, user_id: &str) -> Result<()> {
        let mut catalog = self.catalog.write().await;
        catalog.load(self.provider.as_ref(), user_id).await
    }

    /// Read access to the catalog cache.
    pub async fn catalog(&self) -> RwLockReadGuard<'_, ItemCatalog> {
        self.catalog.read().await
    }

    /// Starts a fresh guided-mode session.
    pub async fn start_slot_session(&self, configuration: SlotConfiguration) -> CompositionSession {
        let catalog = self.catalog.read().await;
        CompositionSession::new_slot(configuration, &catalog)
    }

    /// Starts a fresh canvas-mode session.
    pub fn start_spatial_session(&self) -> CompositionSession {
        CompositionSession::new_spatial(self.config.clone())
    }

    /// Rebuilds a session from a persisted outfit, for edit flows.
    pub async fn start_session_from(&self, payload: &OutfitPayload) -> CompositionSession {
        let catalog = self.catalog.read().await;
        CompositionSession::from_payload(payload, &catalog, self.config.clone())
    }

    /// Saves a session through the commit pipeline.
    ///
    /// # Returns
    ///
    /// The id of the created or updated outfit record.
    pub async fn save(&self, session: &CompositionSession) -> Result<String> {
        let catalog = self.catalog.read().await;
        self.pipeline.commit(session, &catalog).await
    }

    /// Current progress of the save pipeline.
    pub fn save_progress(&self) -> SaveProgress {
        self.pipeline.progress()
    }
}
