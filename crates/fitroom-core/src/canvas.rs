//! Free-form (spatial canvas) composition model.
//!
//! Canvas mode places wardrobe items anywhere on a 2D surface. Items carry a
//! position, size, display rotation and a stacking order; the viewport adds a
//! zoom factor and pan offset on top. Placement is axis-aligned bounding
//! boxes only: rotation is visual, there is no collision detection and no
//! layering beyond the single integer z-order.

use crate::config::EngineConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Smallest edge a canvas item can be resized to, in canvas pixels.
const MIN_ITEM_EDGE: f32 = 1.0;

/// A 2D point or offset in canvas or screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl std::ops::Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height pair in canvas pixels. Both edges are always positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizePx {
    pub width: f32,
    pub height: f32,
}

/// One wardrobe item placed on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasItem {
    /// Session-local placement id (UUID), never reused within a session
    pub id: String,
    /// Id of the wardrobe item being displayed
    pub item_ref: String,
    /// Top-left corner in canvas space
    pub position: Point,
    /// Display size in canvas pixels
    pub size: SizePx,
    /// Display rotation in degrees, normalized into `[0, 360)`
    pub rotation: f32,
    /// Stacking order; strictly increasing with insertion, gaps allowed
    pub z_index: i64,
}

impl CanvasItem {
    /// Whether a canvas-space point falls inside this item's axis-aligned
    /// bounding box. Rotation is display-only and ignored here.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.position.x
            && point.x <= self.position.x + self.size.width
            && point.y >= self.position.y
            && point.y <= self.position.y + self.size.height
    }
}

/// A partial update to a canvas item. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Point>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizePx>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f32>,
}

/// The canvas view transform: zoom factor plus pan offset.
///
/// The zoom field is private so every write goes through the clamping paths
/// on [`SpatialComposition`]; a stored zoom is never out of range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Viewport {
    zoom: f32,
    pub pan: Point,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: Point::default(),
        }
    }
}

impl Viewport {
    /// Current zoom factor.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Converts a screen-space point into canvas space.
    pub fn to_canvas(&self, screen: Point) -> Point {
        Point::new(
            (screen.x - self.pan.x) / self.zoom,
            (screen.y - self.pan.y) / self.zoom,
        )
    }

    /// Converts a canvas-space point into screen space.
    pub fn to_screen(&self, canvas: Point) -> Point {
        Point::new(
            canvas.x * self.zoom + self.pan.x,
            canvas.y * self.zoom + self.pan.y,
        )
    }
}

/// A partial update to the viewport. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zoom: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pan: Option<Point>,
}

/// The free-form composition state: placed items plus the viewport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpatialComposition {
    items: Vec<CanvasItem>,
    viewport: Viewport,
    /// Next stacking order to hand out; never decremented, so removed items'
    /// z-indices are never reused.
    next_z: i64,
    config: EngineConfig,
}

impl Default for SpatialComposition {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl SpatialComposition {
    /// Creates an empty canvas governed by `config`.
    pub fn new(config: EngineConfig) -> Self {
        Self {
            items: Vec::new(),
            viewport: Viewport::default(),
            next_z: 0,
            config,
        }
    }

    /// Rebuilds a canvas from previously persisted items (edit flow).
    ///
    /// Stacking continues above the highest restored z-index. Persisted data
    /// is not trusted to respect the model's invariants: the restored zoom is
    /// re-clamped, item sizes are floored at the positive minimum, and
    /// rotations are normalized into `[0, 360)`, the same as any live write.
    pub fn from_parts(items: Vec<CanvasItem>, viewport: Viewport, config: EngineConfig) -> Self {
        let next_z = items.iter().map(|item| item.z_index).max().unwrap_or(-1) + 1;
        let items = items
            .into_iter()
            .map(|mut item| {
                item.size = SizePx {
                    width: item.size.width.max(MIN_ITEM_EDGE),
                    height: item.size.height.max(MIN_ITEM_EDGE),
                };
                item.rotation = item.rotation.rem_euclid(360.0);
                item
            })
            .collect();
        let mut composition = Self {
            items,
            viewport,
            next_z,
            config,
        };
        composition.set_zoom(viewport.zoom);
        composition
    }

    /// The placed items, in insertion order.
    pub fn items(&self) -> &[CanvasItem] {
        &self.items
    }

    /// The current view transform.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// The engine configuration governing this canvas.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Looks up an item by placement id.
    pub fn item(&self, id: &str) -> Option<&CanvasItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// The topmost item whose bounding box contains a canvas-space point.
    pub fn item_at(&self, point: Point) -> Option<&CanvasItem> {
        self.items
            .iter()
            .filter(|item| item.contains(point))
            .max_by_key(|item| item.z_index)
    }

    /// Places a wardrobe item on the canvas at `position` with the default
    /// size, no rotation, and a stacking order above every existing item.
    ///
    /// Returns the fresh placement id.
    pub fn add_item(&mut self, item_ref: impl Into<String>, position: Point) -> String {
        let id = Uuid::new_v4().to_string();
        self.items.push(CanvasItem {
            id: id.clone(),
            item_ref: item_ref.into(),
            position,
            size: self.config.default_item_size,
            rotation: 0.0,
            z_index: self.next_z,
        });
        self.next_z += 1;
        id
    }

    /// Merges a partial update into the matching item.
    ///
    /// Sizes are floored at a positive minimum and rotation is normalized
    /// into `[0, 360)`. An unknown id is a logged no-op.
    pub fn update_item(&mut self, id: &str, patch: CanvasItemPatch) -> bool {
        let Some(item) = self.items.iter_mut().find(|item| item.id == id) else {
            tracing::debug!(id, "update for unknown canvas item ignored");
            return false;
        };

        if let Some(position) = patch.position {
            item.position = position;
        }
        if let Some(size) = patch.size {
            item.size = SizePx {
                width: size.width.max(MIN_ITEM_EDGE),
                height: size.height.max(MIN_ITEM_EDGE),
            };
        }
        if let Some(rotation) = patch.rotation {
            item.rotation = rotation.rem_euclid(360.0);
        }
        true
    }

    /// Removes an item. Remaining z-indices are left as they are; gaps are
    /// fine. An unknown id is a logged no-op.
    pub fn remove_item(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            tracing::debug!(id, "remove for unknown canvas item ignored");
            return false;
        }
        true
    }

    /// Empties the canvas. The stacking counter keeps running so cleared
    /// z-indices are not handed out again.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sets the zoom factor, clamped into the configured range.
    pub fn set_zoom(&mut self, zoom: f32) {
        self.viewport.zoom = self.config.clamp_zoom(zoom);
    }

    /// Sets the pan offset.
    pub fn set_pan(&mut self, pan: Point) {
        self.viewport.pan = pan;
    }

    /// Merges a partial viewport update; zoom is clamped on write.
    pub fn set_viewport(&mut self, patch: ViewportPatch) {
        if let Some(zoom) = patch.zoom {
            self.set_zoom(zoom);
        }
        if let Some(pan) = patch.pan {
            self.viewport.pan = pan;
        }
    }

    /// Counts placements per wardrobe item id, for display badges.
    pub fn placements_by_item(&self) -> HashMap<&str, usize> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for item in &self.items {
            *counts.entry(item.item_ref.as_str()).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_item_assigns_strictly_increasing_z() {
        let mut canvas = SpatialComposition::default();
        let a = canvas.add_item("w1", Point::new(0.0, 0.0));
        let b = canvas.add_item("w2", Point::new(10.0, 10.0));
        let c = canvas.add_item("w3", Point::new(20.0, 20.0));

        let zs: Vec<_> = [&a, &b, &c]
            .iter()
            .map(|id| canvas.item(id).unwrap().z_index)
            .collect();
        assert_eq!(zs, vec![0, 1, 2]);
    }

    #[test]
    fn test_removed_z_index_is_never_reused() {
        let mut canvas = SpatialComposition::default();
        canvas.add_item("w1", Point::new(0.0, 0.0));
        let middle = canvas.add_item("w2", Point::new(0.0, 0.0));
        canvas.add_item("w3", Point::new(0.0, 0.0));

        canvas.remove_item(&middle);
        let fourth = canvas.add_item("w4", Point::new(0.0, 0.0));

        assert_eq!(canvas.item(&fourth).unwrap().z_index, 3);
        assert_ne!(fourth, middle);
    }

    #[test]
    fn test_z_survives_clear() {
        let mut canvas = SpatialComposition::default();
        canvas.add_item("w1", Point::new(0.0, 0.0));
        canvas.clear();
        let id = canvas.add_item("w2", Point::new(0.0, 0.0));
        assert_eq!(canvas.item(&id).unwrap().z_index, 1);
    }

    #[test]
    fn test_from_parts_sanitizes_restored_items() {
        let restored = CanvasItem {
            id: "placement-1".to_string(),
            item_ref: "w1".to_string(),
            position: Point::new(10.0, 10.0),
            size: SizePx {
                width: -5.0,
                height: 0.0,
            },
            rotation: 720.0,
            z_index: 4,
        };
        let viewport = Viewport {
            zoom: 99.0,
            pan: Point::default(),
        };

        let canvas =
            SpatialComposition::from_parts(vec![restored], viewport, EngineConfig::default());

        let item = &canvas.items()[0];
        assert_eq!(item.size.width, 1.0);
        assert_eq!(item.size.height, 1.0);
        assert_eq!(item.rotation, 0.0);
        assert_eq!(canvas.viewport().zoom(), 4.0);

        // Stacking continues above the restored z-index.
        let mut canvas = canvas;
        let id = canvas.add_item("w2", Point::default());
        assert_eq!(canvas.item(&id).unwrap().z_index, 5);
    }

    #[test]
    fn test_update_item_merges_and_normalizes() {
        let mut canvas = SpatialComposition::default();
        let id = canvas.add_item("w1", Point::new(5.0, 5.0));

        let applied = canvas.update_item(
            &id,
            CanvasItemPatch {
                size: Some(SizePx {
                    width: -20.0,
                    height: 300.0,
                }),
                rotation: Some(725.0),
                ..Default::default()
            },
        );
        assert!(applied);

        let item = canvas.item(&id).unwrap();
        assert_eq!(item.position, Point::new(5.0, 5.0));
        assert_eq!(item.size.width, 1.0);
        assert_eq!(item.size.height, 300.0);
        assert!((item.rotation - 5.0).abs() < 1e-3);
    }

    #[test]
    fn test_update_unknown_item_is_noop() {
        let mut canvas = SpatialComposition::default();
        assert!(!canvas.update_item("ghost", CanvasItemPatch::default()));
        assert!(!canvas.remove_item("ghost"));
    }

    #[test]
    fn test_zoom_is_always_clamped() {
        let mut canvas = SpatialComposition::default();
        for _ in 0..100 {
            let zoom = canvas.viewport().zoom();
            canvas.set_zoom(zoom + 0.5);
        }
        assert_eq!(canvas.viewport().zoom(), 4.0);

        for _ in 0..100 {
            let zoom = canvas.viewport().zoom();
            canvas.set_zoom(zoom - 0.5);
        }
        assert_eq!(canvas.viewport().zoom(), 0.25);

        canvas.set_viewport(ViewportPatch {
            zoom: Some(99.0),
            pan: None,
        });
        assert_eq!(canvas.viewport().zoom(), 4.0);
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let mut canvas = SpatialComposition::default();
        let below = canvas.add_item("w1", Point::new(0.0, 0.0));
        let above = canvas.add_item("w2", Point::new(50.0, 50.0));

        let hit = canvas.item_at(Point::new(60.0, 60.0)).unwrap();
        assert_eq!(hit.id, above);

        let only_below = canvas.item_at(Point::new(10.0, 10.0)).unwrap();
        assert_eq!(only_below.id, below);

        assert!(canvas.item_at(Point::new(-500.0, -500.0)).is_none());
    }

    #[test]
    fn test_viewport_round_trip_transform() {
        let mut canvas = SpatialComposition::default();
        canvas.set_zoom(2.0);
        canvas.set_pan(Point::new(100.0, -40.0));

        let screen = Point::new(260.0, 120.0);
        let canvas_point = canvas.viewport().to_canvas(screen);
        assert_eq!(canvas_point, Point::new(80.0, 80.0));
        assert_eq!(canvas.viewport().to_screen(canvas_point), screen);
    }
}
