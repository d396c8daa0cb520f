//! Guided (slot-based) composition model.
//!
//! In guided mode an outfit is assembled by filling a fixed list of category
//! slots. Each slot carries a cyclic index into the catalog's item list for
//! that category; browsing wraps at both ends. Slots can be locked so that
//! shuffling leaves them untouched.

use crate::catalog::{Category, ItemCatalog, WardrobeItemRef};
use crate::error::{FitroomError, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The slot layout of a guided composition.
///
/// Each configuration maps to a fixed, ordered list of category slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotConfiguration {
    /// Dress and shoes.
    TwoPart,
    /// Top, bottom and shoes.
    ThreePart,
    /// Top, outer layer, bottom and shoes.
    FourPart,
}

impl SlotConfiguration {
    /// The ordered category slots this configuration is made of.
    pub fn slots(&self) -> &'static [Category] {
        match self {
            Self::TwoPart => &[Category::Dresses, Category::Footwear],
            Self::ThreePart => &[Category::Tops, Category::Bottoms, Category::Footwear],
            Self::FourPart => &[
                Category::Tops,
                Category::Outerwear,
                Category::Bottoms,
                Category::Footwear,
            ],
        }
    }

    /// Whether `category` is one of this configuration's slots.
    pub fn contains(&self, category: Category) -> bool {
        self.slots().contains(&category)
    }
}

/// Browsing direction for [`SlotComposition::navigate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavDirection {
    Previous,
    Next,
}

impl NavDirection {
    fn offset(&self) -> i64 {
        match self {
            Self::Previous => -1,
            Self::Next => 1,
        }
    }
}

/// An undo/redo snapshot of the browsable slot state.
///
/// Lock flags are deliberately absent: locking is a browsing aid, not an
/// editing action, and is excluded from history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSnapshot {
    pub configuration: SlotConfiguration,
    pub indices: HashMap<Category, usize>,
}

/// The guided composition state: active configuration, one cyclic index per
/// populated slot, and the set of locked slots.
///
/// Indices are only ever present for categories with at least one catalog
/// item, and always lie in `[0, count)` for that category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotComposition {
    configuration: SlotConfiguration,
    indices: HashMap<Category, usize>,
    locked: HashSet<Category>,
}

impl SlotComposition {
    /// Creates a composition for `configuration`, pointing every slot that
    /// has catalog items at its first item.
    pub fn new(configuration: SlotConfiguration, catalog: &ItemCatalog) -> Self {
        let mut composition = Self {
            configuration,
            indices: HashMap::new(),
            locked: HashSet::new(),
        };
        composition.initialize_missing_indices(catalog);
        composition
    }

    /// The active configuration.
    pub fn configuration(&self) -> SlotConfiguration {
        self.configuration
    }

    /// Current index for a slot, if any item is selected.
    pub fn index_of(&self, category: Category) -> Option<usize> {
        self.indices.get(&category).copied()
    }

    /// Whether a slot is locked against navigation and shuffling.
    pub fn is_locked(&self, category: Category) -> bool {
        self.locked.contains(&category)
    }

    /// Replaces the active configuration.
    ///
    /// Indices for slots that remain in the new layout are kept; indices for
    /// slots leaving it are dropped; slots newly entering it start at the
    /// first available item.
    pub fn set_configuration(&mut self, configuration: SlotConfiguration, catalog: &ItemCatalog) {
        self.configuration = configuration;
        self.indices
            .retain(|category, _| configuration.contains(*category));
        self.initialize_missing_indices(catalog);
    }

    /// Steps a slot's index one item forward or backward, wrapping at both
    /// ends.
    ///
    /// # Errors
    ///
    /// - [`FitroomError::SlotNotInConfiguration`] if the category is not a
    ///   slot of the active configuration
    /// - [`FitroomError::SlotLocked`] if the slot is locked
    /// - [`FitroomError::SlotEmpty`] if the catalog has no items for it
    pub fn navigate(
        &mut self,
        category: Category,
        direction: NavDirection,
        catalog: &ItemCatalog,
    ) -> Result<usize> {
        if !self.configuration.contains(category) {
            return Err(FitroomError::SlotNotInConfiguration { category });
        }
        if self.is_locked(category) {
            return Err(FitroomError::SlotLocked { category });
        }
        let count = catalog.count_of(category);
        if count == 0 {
            return Err(FitroomError::SlotEmpty { category });
        }

        let current = self.indices.get(&category).copied().unwrap_or(0) as i64;
        let next = (current + direction.offset()).rem_euclid(count as i64) as usize;
        self.indices.insert(category, next);
        Ok(next)
    }

    /// Points a slot directly at a catalog position, used when rebuilding a
    /// composition from persisted item ids.
    ///
    /// # Errors
    ///
    /// - [`FitroomError::SlotNotInConfiguration`] if the category is not a
    ///   slot of the active configuration
    /// - [`FitroomError::SlotIndexOutOfRange`] if `index` is past the end of
    ///   the category's item list
    pub fn select(&mut self, category: Category, index: usize, catalog: &ItemCatalog) -> Result<()> {
        if !self.configuration.contains(category) {
            return Err(FitroomError::SlotNotInConfiguration { category });
        }
        if index >= catalog.count_of(category) {
            return Err(FitroomError::SlotIndexOutOfRange { category, index });
        }
        self.indices.insert(category, index);
        Ok(())
    }

    /// Flips a slot's lock flag. Returns the new lock state.
    pub fn toggle_lock(&mut self, category: Category) -> bool {
        if !self.locked.remove(&category) {
            self.locked.insert(category);
            true
        } else {
            false
        }
    }

    /// Re-rolls every unlocked, non-empty slot to a uniformly random index.
    ///
    /// Locked slots and slots without catalog items are never touched.
    pub fn shuffle_with<R: Rng>(&mut self, catalog: &ItemCatalog, rng: &mut R) {
        for &category in self.configuration.slots() {
            if self.is_locked(category) {
                continue;
            }
            let count = catalog.count_of(category);
            if count == 0 {
                continue;
            }
            self.indices.insert(category, rng.gen_range(0..count));
        }
    }

    /// [`Self::shuffle_with`] using the thread-local RNG.
    pub fn shuffle(&mut self, catalog: &ItemCatalog) {
        self.shuffle_with(catalog, &mut rand::thread_rng());
    }

    /// The item currently selected for a slot, if any.
    pub fn resolve_item<'a>(
        &self,
        category: Category,
        catalog: &'a ItemCatalog,
    ) -> Option<&'a WardrobeItemRef> {
        let index = self.index_of(category)?;
        catalog.items_of(category).get(index)
    }

    /// True when at least one slot of the active configuration resolves to an
    /// item. A composition failing this has nothing to save.
    pub fn has_any_selection(&self, catalog: &ItemCatalog) -> bool {
        self.configuration
            .slots()
            .iter()
            .any(|&category| self.resolve_item(category, catalog).is_some())
    }

    /// Captures the browsable state (configuration + indices) for history.
    pub fn snapshot(&self) -> SlotSnapshot {
        SlotSnapshot {
            configuration: self.configuration,
            indices: self.indices.clone(),
        }
    }

    /// Restores a history snapshot, preserving the current lock flags.
    pub fn restore(&mut self, snapshot: &SlotSnapshot) {
        self.configuration = snapshot.configuration;
        self.indices = snapshot.indices.clone();
    }

    fn initialize_missing_indices(&mut self, catalog: &ItemCatalog) {
        for &category in self.configuration.slots() {
            if !self.indices.contains_key(&category) && catalog.count_of(category) > 0 {
                self.indices.insert(category, 0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn item(id: &str, category: Category) -> WardrobeItemRef {
        WardrobeItemRef {
            id: id.to_string(),
            category,
            image_url: format!("https://img.example/{id}.png"),
            thumbnail_url: None,
        }
    }

    fn three_part_catalog() -> ItemCatalog {
        ItemCatalog::from_items(vec![
            item("t1", Category::Tops),
            item("t2", Category::Tops),
            item("t3", Category::Tops),
            item("b1", Category::Bottoms),
            item("b2", Category::Bottoms),
            item("b3", Category::Bottoms),
            item("f1", Category::Footwear),
            item("f2", Category::Footwear),
            item("f3", Category::Footwear),
        ])
    }

    #[test]
    fn test_new_points_populated_slots_at_first_item() {
        let catalog = three_part_catalog();
        let composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        assert_eq!(composition.index_of(Category::Tops), Some(0));
        assert_eq!(composition.index_of(Category::Bottoms), Some(0));
        assert_eq!(composition.resolve_item(Category::Tops, &catalog).unwrap().id, "t1");
    }

    #[test]
    fn test_empty_category_leaves_slot_unset() {
        let catalog = ItemCatalog::from_items(vec![item("f1", Category::Footwear)]);
        let composition = SlotComposition::new(SlotConfiguration::TwoPart, &catalog);

        assert_eq!(composition.index_of(Category::Dresses), None);
        assert!(composition.resolve_item(Category::Dresses, &catalog).is_none());
        assert!(composition.has_any_selection(&catalog));
    }

    #[test]
    fn test_navigate_wraps_both_directions() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        // Forward from the last index wraps to 0.
        composition.navigate(Category::Tops, NavDirection::Next, &catalog).unwrap();
        composition.navigate(Category::Tops, NavDirection::Next, &catalog).unwrap();
        assert_eq!(composition.index_of(Category::Tops), Some(2));
        let wrapped = composition
            .navigate(Category::Tops, NavDirection::Next, &catalog)
            .unwrap();
        assert_eq!(wrapped, 0);

        // Backward from 0 wraps to the last index.
        let wrapped_back = composition
            .navigate(Category::Tops, NavDirection::Previous, &catalog)
            .unwrap();
        assert_eq!(wrapped_back, 2);
    }

    #[test]
    fn test_navigate_locked_slot_is_rejected_without_change() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        assert!(composition.toggle_lock(Category::Tops));
        let err = composition
            .navigate(Category::Tops, NavDirection::Next, &catalog)
            .unwrap_err();

        assert!(matches!(err, FitroomError::SlotLocked { .. }));
        assert_eq!(composition.index_of(Category::Tops), Some(0));
    }

    #[test]
    fn test_navigate_empty_slot_is_rejected() {
        let catalog = ItemCatalog::from_items(vec![item("f1", Category::Footwear)]);
        let mut composition = SlotComposition::new(SlotConfiguration::TwoPart, &catalog);

        let err = composition
            .navigate(Category::Dresses, NavDirection::Next, &catalog)
            .unwrap_err();
        assert!(matches!(err, FitroomError::SlotEmpty { .. }));
    }

    #[test]
    fn test_navigate_outside_configuration_is_invariant_violation() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        let err = composition
            .navigate(Category::Dresses, NavDirection::Next, &catalog)
            .unwrap_err();
        assert!(err.is_invariant_violation());
    }

    #[test]
    fn test_set_configuration_keeps_shared_slots_and_drops_others() {
        let catalog = ItemCatalog::from_items(vec![
            item("t1", Category::Tops),
            item("t2", Category::Tops),
            item("b1", Category::Bottoms),
            item("f1", Category::Footwear),
            item("d1", Category::Dresses),
        ]);
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);
        composition.navigate(Category::Tops, NavDirection::Next, &catalog).unwrap();

        composition.set_configuration(SlotConfiguration::TwoPart, &catalog);
        assert_eq!(composition.index_of(Category::Tops), None);
        assert_eq!(composition.index_of(Category::Dresses), Some(0));

        // Switching back re-initializes tops at the first item.
        composition.set_configuration(SlotConfiguration::ThreePart, &catalog);
        assert_eq!(composition.index_of(Category::Tops), Some(0));
    }

    #[test]
    fn test_select_validates_category_and_range() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        composition.select(Category::Tops, 2, &catalog).unwrap();
        assert_eq!(composition.resolve_item(Category::Tops, &catalog).unwrap().id, "t3");

        let err = composition.select(Category::Tops, 3, &catalog).unwrap_err();
        assert!(matches!(err, FitroomError::SlotIndexOutOfRange { index: 3, .. }));
        assert!(err.is_invariant_violation());
        assert_eq!(composition.index_of(Category::Tops), Some(2));

        let err = composition.select(Category::Dresses, 0, &catalog).unwrap_err();
        assert!(matches!(err, FitroomError::SlotNotInConfiguration { .. }));
    }

    #[test]
    fn test_shuffle_never_touches_locked_slots() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);
        composition.navigate(Category::Tops, NavDirection::Next, &catalog).unwrap();
        composition.toggle_lock(Category::Tops);

        let mut rng = StdRng::seed_from_u64(7);
        let mut bottoms_seen = HashSet::new();
        let mut footwear_seen = HashSet::new();
        for _ in 0..20 {
            composition.shuffle_with(&catalog, &mut rng);
            assert_eq!(composition.index_of(Category::Tops), Some(1));

            let bottoms = composition.index_of(Category::Bottoms).unwrap();
            let footwear = composition.index_of(Category::Footwear).unwrap();
            assert!(bottoms < 3);
            assert!(footwear < 3);
            bottoms_seen.insert(bottoms);
            footwear_seen.insert(footwear);
        }

        assert!(bottoms_seen.len() >= 2);
        assert!(footwear_seen.len() >= 2);
    }

    #[test]
    fn test_shuffle_skips_empty_slots() {
        let catalog = ItemCatalog::from_items(vec![
            item("t1", Category::Tops),
            item("f1", Category::Footwear),
        ]);
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);

        let mut rng = StdRng::seed_from_u64(1);
        composition.shuffle_with(&catalog, &mut rng);
        assert_eq!(composition.index_of(Category::Bottoms), None);
    }

    #[test]
    fn test_snapshot_excludes_locks() {
        let catalog = three_part_catalog();
        let mut composition = SlotComposition::new(SlotConfiguration::ThreePart, &catalog);
        composition.toggle_lock(Category::Tops);

        let snapshot = composition.snapshot();
        composition.toggle_lock(Category::Tops);
        composition.restore(&snapshot);

        // Restoring never resurrects the lock flag captured at snapshot time.
        assert!(!composition.is_locked(Category::Tops));
    }
}
