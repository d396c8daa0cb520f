//! Pointer gesture interpretation for the spatial canvas.
//!
//! Raw pointer/touch input is folded into an explicit state machine with one
//! active gesture at a time: dragging an item, panning the canvas, or a
//! two-finger pinch zoom. Exclusivity is structural — an event that would
//! start a second gesture while one is active is simply ignored, so no two
//! gestures can ever interleave mid-update.
//!
//! The controller is fed pre-hit-tested events (`press_item` vs
//! `press_background`); explicit item controls such as delete buttons are hit
//! outside the controller and never start a drag.

use crate::canvas::{CanvasItemPatch, Point, SpatialComposition};
use serde::{Deserialize, Serialize};

/// Zoom direction for discrete wheel/scroll events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomDirection {
    In,
    Out,
}

/// The currently active gesture, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GesturePhase {
    /// No pointer interaction in progress.
    Idle,
    /// An item follows the pointer.
    DraggingItem {
        /// Placement id of the item being dragged
        id: String,
        /// Canvas-space offset from the item's top-left corner to the point
        /// where it was grabbed
        grab_offset: Point,
    },
    /// The viewport pan follows the pointer.
    Panning {
        /// Screen position where the pan started
        pointer_origin: Point,
        /// Pan offset at the moment the pan started
        pan_origin: Point,
    },
    /// A two-finger pinch is scaling the zoom.
    Pinching {
        /// Finger distance at the previous pinch frame; rebased every frame
        /// so successive pinches compound instead of jumping
        last_distance: f32,
    },
}

/// Interprets discrete pointer events into canvas mutations.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    phase: GesturePhase,
}

impl Default for GesturePhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl GestureController {
    /// Creates a controller with no active gesture.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current gesture phase.
    pub fn phase(&self) -> &GesturePhase {
        &self.phase
    }

    /// True while any gesture is in progress.
    pub fn is_active(&self) -> bool {
        self.phase != GesturePhase::Idle
    }

    /// Pointer pressed on an item: starts a drag, recording where inside the
    /// item it was grabbed. Ignored while another gesture is active or when
    /// the id does not resolve.
    pub fn press_item(&mut self, canvas: &SpatialComposition, id: &str, pointer_screen: Point) {
        if self.is_active() {
            return;
        }
        let Some(item) = canvas.item(id) else {
            tracing::debug!(id, "drag start on unknown canvas item ignored");
            return;
        };
        let grab = canvas.viewport().to_canvas(pointer_screen) - item.position;
        self.phase = GesturePhase::DraggingItem {
            id: id.to_string(),
            grab_offset: grab,
        };
    }

    /// Pointer pressed on empty canvas background: starts a pan. Ignored
    /// while another gesture is active.
    pub fn press_background(&mut self, canvas: &SpatialComposition, pointer_screen: Point) {
        if self.is_active() {
            return;
        }
        self.phase = GesturePhase::Panning {
            pointer_origin: pointer_screen,
            pan_origin: canvas.viewport().pan,
        };
    }

    /// Pointer moved: advances whichever gesture is active.
    pub fn pointer_move(&mut self, canvas: &mut SpatialComposition, pointer_screen: Point) {
        match &self.phase {
            GesturePhase::DraggingItem { id, grab_offset } => {
                let position = canvas.viewport().to_canvas(pointer_screen) - *grab_offset;
                let id = id.clone();
                canvas.update_item(
                    &id,
                    CanvasItemPatch {
                        position: Some(position),
                        ..Default::default()
                    },
                );
            }
            GesturePhase::Panning {
                pointer_origin,
                pan_origin,
            } => {
                let pan = *pan_origin + (pointer_screen - *pointer_origin);
                canvas.set_pan(pan);
            }
            GesturePhase::Idle | GesturePhase::Pinching { .. } => {}
        }
    }

    /// Two fingers down: starts a pinch from the given finger distance.
    /// Ignored while another gesture is active or for degenerate distances.
    pub fn pinch_begin(&mut self, distance: f32) {
        if self.is_active() || distance <= 0.0 {
            return;
        }
        self.phase = GesturePhase::Pinching {
            last_distance: distance,
        };
    }

    /// Pinch frame: scales the zoom by the distance ratio since the previous
    /// frame, then rebases so the next frame compounds from here.
    pub fn pinch_move(&mut self, canvas: &mut SpatialComposition, distance: f32) {
        if distance <= 0.0 {
            return;
        }
        if let GesturePhase::Pinching { last_distance } = &mut self.phase {
            let scale = distance / *last_distance;
            let zoom = canvas.viewport().zoom() * scale;
            canvas.set_zoom(zoom);
            *last_distance = distance;
        }
    }

    /// Wheel/scroll event: one configured zoom step in or out. Independent of
    /// the gesture phase.
    pub fn wheel(&self, canvas: &mut SpatialComposition, direction: ZoomDirection) {
        let step = canvas.config().wheel_zoom_step;
        let delta = match direction {
            ZoomDirection::In => step,
            ZoomDirection::Out => -step,
        };
        let zoom = canvas.viewport().zoom() + delta;
        canvas.set_zoom(zoom);
    }

    /// Pointer or touch released: ends whatever gesture was active.
    pub fn release(&mut self) {
        self.phase = GesturePhase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ViewportPatch;

    fn canvas_with_item() -> (SpatialComposition, String) {
        let mut canvas = SpatialComposition::default();
        let id = canvas.add_item("w1", Point::new(100.0, 100.0));
        (canvas, id)
    }

    #[test]
    fn test_drag_moves_item_through_view_transform() {
        let (mut canvas, id) = canvas_with_item();
        canvas.set_viewport(ViewportPatch {
            zoom: Some(2.0),
            pan: Some(Point::new(50.0, 50.0)),
        });

        let mut gestures = GestureController::new();
        // Item top-left (100,100) in canvas space is (250,250) on screen;
        // grab it 10 screen px inside.
        gestures.press_item(&canvas, &id, Point::new(260.0, 260.0));
        assert!(gestures.is_active());

        gestures.pointer_move(&mut canvas, Point::new(300.0, 260.0));
        let item = canvas.item(&id).unwrap();
        assert_eq!(item.position, Point::new(120.0, 100.0));

        gestures.release();
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_pan_follows_pointer_delta() {
        let (mut canvas, _id) = canvas_with_item();
        let mut gestures = GestureController::new();

        gestures.press_background(&canvas, Point::new(10.0, 10.0));
        gestures.pointer_move(&mut canvas, Point::new(40.0, -20.0));

        assert_eq!(canvas.viewport().pan, Point::new(30.0, -30.0));
    }

    #[test]
    fn test_drag_and_pan_are_mutually_exclusive() {
        let (mut canvas, id) = canvas_with_item();
        let mut gestures = GestureController::new();

        gestures.press_item(&canvas, &id, Point::new(110.0, 110.0));
        let before = canvas.viewport().pan;

        // Background press while dragging must not demote the drag to a pan.
        gestures.press_background(&canvas, Point::new(0.0, 0.0));
        assert!(matches!(gestures.phase(), GesturePhase::DraggingItem { .. }));

        gestures.pointer_move(&mut canvas, Point::new(150.0, 150.0));
        assert_eq!(canvas.viewport().pan, before);

        gestures.release();
        gestures.press_background(&canvas, Point::new(0.0, 0.0));
        gestures.press_item(&canvas, &id, Point::new(110.0, 110.0));
        assert!(matches!(gestures.phase(), GesturePhase::Panning { .. }));
    }

    #[test]
    fn test_pinch_compounds_across_frames() {
        let (mut canvas, _id) = canvas_with_item();
        let mut gestures = GestureController::new();

        gestures.pinch_begin(100.0);
        gestures.pinch_move(&mut canvas, 150.0);
        assert!((canvas.viewport().zoom() - 1.5).abs() < 1e-4);

        // Second frame scales from the rebased distance, not the initial one.
        gestures.pinch_move(&mut canvas, 300.0);
        assert!((canvas.viewport().zoom() - 3.0).abs() < 1e-4);

        gestures.release();
        assert!(!gestures.is_active());
    }

    #[test]
    fn test_pinch_zoom_is_clamped() {
        let (mut canvas, _id) = canvas_with_item();
        let mut gestures = GestureController::new();

        gestures.pinch_begin(10.0);
        gestures.pinch_move(&mut canvas, 10_000.0);
        assert_eq!(canvas.viewport().zoom(), 4.0);

        gestures.pinch_move(&mut canvas, 1.0);
        assert!(canvas.viewport().zoom() >= 0.25);
    }

    #[test]
    fn test_wheel_steps_zoom_within_bounds() {
        let (mut canvas, _id) = canvas_with_item();
        let gestures = GestureController::new();

        gestures.wheel(&mut canvas, ZoomDirection::In);
        assert!((canvas.viewport().zoom() - 1.1).abs() < 1e-4);

        for _ in 0..100 {
            gestures.wheel(&mut canvas, ZoomDirection::Out);
        }
        assert_eq!(canvas.viewport().zoom(), 0.25);
    }

    #[test]
    fn test_press_unknown_item_does_not_start_drag() {
        let (canvas, _id) = canvas_with_item();
        let mut gestures = GestureController::new();

        gestures.press_item(&canvas, "ghost", Point::new(0.0, 0.0));
        assert!(!gestures.is_active());
    }
}
