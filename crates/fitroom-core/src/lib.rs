//! Fitroom core: the outfit composition engine.
//!
//! Users assemble outfits from their wardrobe in one of two mutually
//! exclusive modes: a guided slot mode (fixed category slots, cyclic
//! browsing, locking, shuffling, undo/redo) and a free-form canvas mode
//! (arbitrary placement, resizing, rotation, z-ordering, pan/zoom). A
//! session holding either mode is serialized and handed to the commit
//! pipeline in `fitroom-application` for rendering, upload and persistence.
//!
//! # Module Structure
//!
//! - `catalog`: read-only wardrobe item cache and its provider seam
//! - `slot`: guided composition model
//! - `history`: linear undo/redo over slot snapshots
//! - `canvas`: spatial composition model and viewport
//! - `gesture`: pointer gesture state machine for the canvas
//! - `session`: the per-user composition session and its payloads
//! - `collaborators`: async seams for render/upload/persist
//! - `config`: engine tunables
//! - `error`: shared error type

pub mod canvas;
pub mod catalog;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod gesture;
pub mod history;
pub mod session;
pub mod slot;

// Re-export common error type
pub use error::FitroomError;
