//! Camera collaborator for the selection subsystem.
//!
//! The selection core only needs two things from a camera: the current
//! projection-view matrix (captured when a drag locks) and a switch to
//! disable orbit/pan/zoom while a drag is active. [`CameraControls`] is that
//! seam; [`controller::OrbitCamera`] is the stock implementation.

/// Orbital camera controller.
pub mod controller;
/// Core camera struct.
pub mod core;
/// Pointer-event routing for the orbital camera.
pub mod input;

use glam::Mat4;

use crate::selection::SurfaceRect;

pub use self::controller::OrbitCamera;
pub use self::core::Camera;
pub use self::input::CameraInput;

/// What the selection subsystem needs from the camera component.
pub trait CameraControls {
    /// Enable or disable user camera motion.
    fn set_enabled(&mut self, enabled: bool);
    /// Current projection times inverse world transform.
    fn projection_view(&self) -> Mat4;
}

/// Render-engine state at the instant an input event is handled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Render surface bounds in window pixels.
    pub surface: SurfaceRect,
    /// Live projection-view matrix.
    pub projection_view: Mat4,
}

impl FrameContext {
    /// Combine the renderer's projection and inverse-view matrices.
    #[must_use]
    pub fn from_matrices(
        surface: SurfaceRect,
        projection: Mat4,
        view: Mat4,
    ) -> Self {
        Self {
            surface,
            projection_view: projection * view,
        }
    }

    /// Snapshot the current camera.
    #[must_use]
    pub fn from_camera(
        surface: SurfaceRect,
        camera: &(impl CameraControls + ?Sized),
    ) -> Self {
        Self {
            surface,
            projection_view: camera.projection_view(),
        }
    }
}
