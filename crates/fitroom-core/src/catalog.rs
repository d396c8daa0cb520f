//! Wardrobe item catalog.
//!
//! The catalog is a session-scoped, read-only cache of the user's active
//! wardrobe items, fetched once from the external wardrobe service and
//! grouped by category. Both composition modes read from it; nothing in the
//! engine ever writes an item back.

use crate::error::{FitroomError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::Display;

/// Clothing category of a wardrobe item.
///
/// Also identifies a slot in guided composition mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    Tops,
    Bottoms,
    Dresses,
    Outerwear,
    Footwear,
    Accessories,
}

/// A reference to a single wardrobe item.
///
/// Owned by the external wardrobe collaborator; immutable for the duration of
/// a composition session. The engine only ever reads these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WardrobeItemRef {
    /// Unique item identifier assigned by the wardrobe service
    pub id: String,
    /// Clothing category, also the slot this item can fill
    pub category: Category,
    /// URL of the full display asset (background-removed image)
    pub image_url: String,
    /// URL of the thumbnail asset, if one was generated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
}

/// An abstract source of the user's active wardrobe items.
///
/// Implemented by the external wardrobe service client; called once per
/// composition session.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetches every active item in the user's wardrobe.
    ///
    /// # Returns
    ///
    /// - `Ok(items)`: all active items, in the service's display order
    /// - `Err(_)`: fetch failed (network/server error)
    async fn fetch_active_items(&self, user_id: &str) -> anyhow::Result<Vec<WardrobeItemRef>>;
}

/// In-memory, session-scoped cache of wardrobe items grouped by category.
///
/// Item order within a category is the service's return order and is stable
/// for the life of the session. On a fetch failure the catalog stays empty
/// and composition operations degrade gracefully: slots stay unset and the
/// canvas has no drag sources.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: HashMap<Category, Vec<WardrobeItemRef>>,
    loaded: bool,
}

impl ItemCatalog {
    /// Creates an empty, unloaded catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an already-loaded catalog from a list of items.
    ///
    /// Grouping preserves the order items appear in `items`.
    pub fn from_items(items: Vec<WardrobeItemRef>) -> Self {
        let mut grouped: HashMap<Category, Vec<WardrobeItemRef>> = HashMap::new();
        for item in items {
            grouped.entry(item.category).or_default().push(item);
        }
        Self {
            items: grouped,
            loaded: true,
        }
    }

    /// Fetches the active wardrobe once and fills the cache.
    ///
    /// A second call on an already-loaded catalog is a no-op. On fetch
    /// failure the catalog is left empty and a recoverable
    /// [`FitroomError::CatalogUnavailable`] is returned.
    pub async fn load(&mut self, provider: &dyn CatalogProvider, user_id: &str) -> Result<()> {
        if self.loaded {
            return Ok(());
        }

        match provider.fetch_active_items(user_id).await {
            Ok(items) => {
                *self = Self::from_items(items);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(user_id, error = %err, "wardrobe catalog fetch failed");
                Err(FitroomError::catalog_unavailable(err.to_string()))
            }
        }
    }

    /// True once a fetch has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Items available for a category, in stable session order.
    pub fn items_of(&self, category: Category) -> &[WardrobeItemRef] {
        self.items.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of items available for a category.
    pub fn count_of(&self, category: Category) -> usize {
        self.items_of(category).len()
    }

    /// Looks up an item anywhere in the catalog by id.
    pub fn find(&self, item_id: &str) -> Option<&WardrobeItemRef> {
        self.items
            .values()
            .flat_map(|items| items.iter())
            .find(|item| item.id == item_id)
    }
}
