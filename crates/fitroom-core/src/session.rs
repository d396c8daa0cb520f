//! Composition session: the explicit, per-user editing state.
//!
//! A session is created when the user enters the composition screen, mutated
//! only through the operations here, and either discarded on navigation away
//! or turned into a persisted outfit by the commit pipeline. It is an
//! explicit value passed to every operation; there is no ambient global
//! store.
//!
//! The two composition modes are a tagged union: a slot-mode session carries
//! its history stack and no canvas state, a spatial session carries only the
//! canvas. "Slot mode has no canvas state" is a compile-time property.

use crate::canvas::{CanvasItem, Point, SpatialComposition, Viewport};
use crate::catalog::{Category, ItemCatalog, WardrobeItemRef};
use crate::collaborators::StoredImage;
use crate::config::EngineConfig;
use crate::error::{FitroomError, Result};
use crate::history::HistoryStack;
use crate::slot::{NavDirection, SlotComposition, SlotConfiguration};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// User-facing outfit metadata. Opaque to the engine; passed through to
/// persistence unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitMetadata {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub seasons: Vec<String>,
}

/// The active composition mode and its state.
#[derive(Debug, Clone)]
pub enum CompositionMode {
    /// Guided mode: fixed category slots plus undo/redo history.
    Slot {
        composition: SlotComposition,
        history: HistoryStack,
    },
    /// Free-form mode: the spatial canvas.
    Spatial { composition: SpatialComposition },
}

/// The serializable form of a composition, as handed to collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompositionPayload {
    /// Guided mode: the chosen configuration and the resolved item id per
    /// filled slot.
    Slot {
        configuration: SlotConfiguration,
        items: BTreeMap<Category, String>,
    },
    /// Free-form mode: every placed item plus the viewport.
    Spatial {
        items: Vec<CanvasItem>,
        viewport: Viewport,
    },
}

/// The full outfit record sent to the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutfitPayload {
    pub metadata: OutfitMetadata,
    #[serde(flatten)]
    pub composition: CompositionPayload,
    /// Uploaded preview image; attached by the commit pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_image: Option<StoredImage>,
    /// Renderer-derived description of what the preview shows; opaque
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derived_composition: Option<serde_json::Value>,
}

/// One user's in-progress outfit composition.
#[derive(Debug, Clone)]
pub struct CompositionSession {
    /// Unique session identifier (UUID format)
    pub id: String,
    /// Outfit metadata edited alongside the composition
    pub metadata: OutfitMetadata,
    /// Timestamp when the session was created (RFC 3339)
    pub created_at: String,
    /// Timestamp of the last mutation (RFC 3339)
    pub updated_at: String,
    mode: CompositionMode,
}

impl CompositionSession {
    /// Starts a fresh guided-mode session.
    pub fn new_slot(configuration: SlotConfiguration, catalog: &ItemCatalog) -> Self {
        let composition = SlotComposition::new(configuration, catalog);
        let history = HistoryStack::new(composition.snapshot());
        Self::with_mode(CompositionMode::Slot {
            composition,
            history,
        })
    }

    /// Starts a fresh canvas-mode session.
    pub fn new_spatial(config: EngineConfig) -> Self {
        Self::with_mode(CompositionMode::Spatial {
            composition: SpatialComposition::new(config),
        })
    }

    /// Rebuilds a session from a persisted outfit, for edit flows.
    ///
    /// Slot items are matched back to catalog positions; items that are no
    /// longer in the wardrobe leave their slot unset. The restored zoom is
    /// re-clamped against `config`.
    pub fn from_payload(
        payload: &OutfitPayload,
        catalog: &ItemCatalog,
        config: EngineConfig,
    ) -> Self {
        let mode = match &payload.composition {
            CompositionPayload::Slot {
                configuration,
                items,
            } => {
                let mut composition = SlotComposition::new(*configuration, catalog);
                for (&category, item_id) in items {
                    let position = catalog
                        .items_of(category)
                        .iter()
                        .position(|item| &item.id == item_id);
                    match position {
                        Some(index) => {
                            let _ = composition.select(category, index, catalog);
                        }
                        None => tracing::debug!(
                            %category,
                            item_id,
                            "persisted slot item no longer in wardrobe"
                        ),
                    }
                }
                let history = HistoryStack::new(composition.snapshot());
                CompositionMode::Slot {
                    composition,
                    history,
                }
            }
            CompositionPayload::Spatial { items, viewport } => CompositionMode::Spatial {
                composition: SpatialComposition::from_parts(items.clone(), *viewport, config),
            },
        };

        let mut session = Self::with_mode(mode);
        session.metadata = payload.metadata.clone();
        session
    }

    fn with_mode(mode: CompositionMode) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4().to_string(),
            metadata: OutfitMetadata::default(),
            created_at: now.clone(),
            updated_at: now,
            mode,
        }
    }

    /// The active mode and its state.
    pub fn mode(&self) -> &CompositionMode {
        &self.mode
    }

    /// True for guided-mode sessions.
    pub fn is_slot_mode(&self) -> bool {
        matches!(self.mode, CompositionMode::Slot { .. })
    }

    /// The slot composition, in guided mode.
    pub fn slot(&self) -> Option<&SlotComposition> {
        match &self.mode {
            CompositionMode::Slot { composition, .. } => Some(composition),
            CompositionMode::Spatial { .. } => None,
        }
    }

    /// The canvas, in spatial mode.
    pub fn spatial(&self) -> Option<&SpatialComposition> {
        match &self.mode {
            CompositionMode::Spatial { composition } => Some(composition),
            CompositionMode::Slot { .. } => None,
        }
    }

    /// Mutable canvas access for gesture handling, in spatial mode.
    pub fn spatial_mut(&mut self) -> Option<&mut SpatialComposition> {
        if matches!(self.mode, CompositionMode::Spatial { .. }) {
            self.touch();
        }
        match &mut self.mode {
            CompositionMode::Spatial { composition } => Some(composition),
            CompositionMode::Slot { .. } => None,
        }
    }

    /// Replaces the slot configuration and records the change in history.
    pub fn set_configuration(
        &mut self,
        configuration: SlotConfiguration,
        catalog: &ItemCatalog,
    ) -> Result<()> {
        let (composition, history) = self.slot_state_mut()?;
        composition.set_configuration(configuration, catalog);
        history.push(composition.snapshot());
        self.touch();
        Ok(())
    }

    /// Steps a slot one item forward or backward and records the change.
    ///
    /// Locked and empty slots report a user-recoverable error and leave both
    /// the composition and history untouched.
    pub fn navigate(
        &mut self,
        category: Category,
        direction: NavDirection,
        catalog: &ItemCatalog,
    ) -> Result<usize> {
        let (composition, history) = self.slot_state_mut()?;
        let index = composition
            .navigate(category, direction, catalog)
            .inspect_err(Self::report_invariant)?;
        history.push(composition.snapshot());
        self.touch();
        Ok(index)
    }

    /// Flips a slot's lock flag. Lock changes are not undoable and are not
    /// recorded in history.
    pub fn toggle_lock(&mut self, category: Category) -> Result<bool> {
        let (composition, _history) = self.slot_state_mut()?;
        let locked = composition.toggle_lock(category);
        self.touch();
        Ok(locked)
    }

    /// Shuffles all unlocked, non-empty slots and records the change.
    pub fn shuffle(&mut self, catalog: &ItemCatalog) -> Result<()> {
        let (composition, history) = self.slot_state_mut()?;
        composition.shuffle(catalog);
        history.push(composition.snapshot());
        self.touch();
        Ok(())
    }

    /// Shuffle with a caller-supplied RNG, for deterministic tests.
    pub fn shuffle_with<R: rand::Rng>(&mut self, catalog: &ItemCatalog, rng: &mut R) -> Result<()> {
        let (composition, history) = self.slot_state_mut()?;
        composition.shuffle_with(catalog, rng);
        history.push(composition.snapshot());
        self.touch();
        Ok(())
    }

    /// Steps the slot state back one history entry. Returns false when there
    /// is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Ok((composition, history)) = self.slot_state_mut() else {
            return false;
        };
        match history.undo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                composition.restore(&snapshot);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Steps the slot state forward one history entry. Returns false when
    /// there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Ok((composition, history)) = self.slot_state_mut() else {
            return false;
        };
        match history.redo() {
            Some(snapshot) => {
                let snapshot = snapshot.clone();
                composition.restore(&snapshot);
                self.touch();
                true
            }
            None => false,
        }
    }

    /// Whether an undo step is available (guided mode only).
    pub fn can_undo(&self) -> bool {
        match &self.mode {
            CompositionMode::Slot { history, .. } => history.can_undo(),
            CompositionMode::Spatial { .. } => false,
        }
    }

    /// Whether a redo step is available (guided mode only).
    pub fn can_redo(&self) -> bool {
        match &self.mode {
            CompositionMode::Slot { history, .. } => history.can_redo(),
            CompositionMode::Spatial { .. } => false,
        }
    }

    /// Places a wardrobe item on the canvas (spatial mode). Returns the new
    /// placement id.
    pub fn add_canvas_item(&mut self, item: &WardrobeItemRef, position: Point) -> Result<String> {
        match &mut self.mode {
            CompositionMode::Spatial { composition } => {
                let id = composition.add_item(item.id.clone(), position);
                self.touch();
                Ok(id)
            }
            CompositionMode::Slot { .. } => {
                let err = FitroomError::wrong_mode("spatial");
                Self::report_invariant(&err);
                Err(err)
            }
        }
    }

    /// True when the composition has anything worth saving: at least one
    /// resolved slot item, or at least one canvas placement.
    pub fn has_content(&self, catalog: &ItemCatalog) -> bool {
        match &self.mode {
            CompositionMode::Slot { composition, .. } => composition.has_any_selection(catalog),
            CompositionMode::Spatial { composition } => !composition.items().is_empty(),
        }
    }

    /// Serializes the active composition for the commit pipeline.
    ///
    /// The preview image and derived composition are attached later by the
    /// pipeline, after the render and upload stages.
    pub fn to_payload(&self, catalog: &ItemCatalog) -> OutfitPayload {
        let composition = match &self.mode {
            CompositionMode::Slot { composition, .. } => {
                let mut items = BTreeMap::new();
                for &category in composition.configuration().slots() {
                    if let Some(item) = composition.resolve_item(category, catalog) {
                        items.insert(category, item.id.clone());
                    }
                }
                CompositionPayload::Slot {
                    configuration: composition.configuration(),
                    items,
                }
            }
            CompositionMode::Spatial { composition } => CompositionPayload::Spatial {
                items: composition.items().to_vec(),
                viewport: *composition.viewport(),
            },
        };

        OutfitPayload {
            metadata: self.metadata.clone(),
            composition,
            preview_image: None,
            derived_composition: None,
        }
    }

    fn slot_state_mut(&mut self) -> Result<(&mut SlotComposition, &mut HistoryStack)> {
        match &mut self.mode {
            CompositionMode::Slot {
                composition,
                history,
            } => Ok((composition, history)),
            CompositionMode::Spatial { .. } => {
                let err = FitroomError::wrong_mode("slot");
                Self::report_invariant(&err);
                Err(err)
            }
        }
    }

    fn report_invariant(err: &FitroomError) {
        if err.is_invariant_violation() {
            tracing::debug!(error = %err, "composition operation ignored");
        }
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}
