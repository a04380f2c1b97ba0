//! Highlight state handoff from the coordinating thread to the renderer.
//!
//! The coordinator is the only writer; each frame it publishes a
//! [`HighlightUniform`] through a lock-free triple buffer so the render
//! thread never waits on input handling.

/// Writer/reader pair for the published uniform.
pub mod coordinator;
/// GPU uniform block and its CPU mirror.
pub mod uniform;

pub use coordinator::{DragOverlay, HighlightCoordinator, HighlightReader};
pub use uniform::HighlightUniform;
