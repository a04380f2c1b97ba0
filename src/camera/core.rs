use glam::{Mat4, Vec3};

/// Perspective camera defined by eye position, target, and projection
/// parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// Eye (camera) position in world space.
    pub eye: Vec3,
    /// Look-at target position.
    pub target: Vec3,
    /// Up direction vector.
    pub up: Vec3,
    /// Viewport aspect ratio (width / height).
    pub aspect: f32,
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Near clipping plane distance.
    pub znear: f32,
    /// Far clipping plane distance.
    pub zfar: f32,
}

impl Camera {
    /// Build the combined projection-view matrix.
    #[must_use]
    pub fn build_matrix(&self) -> Mat4 {
        self.build_projection() * self.build_view()
    }

    /// World-to-camera (inverse world) transform.
    #[must_use]
    pub fn build_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Projection matrix alone.
    #[must_use]
    pub fn build_projection(&self) -> Mat4 {
        // perspective_rh already uses [0,1] depth range (wgpu/Vulkan
        // convention)
        Mat4::perspective_rh(
            self.fovy.to_radians(),
            self.aspect,
            self.znear,
            self.zfar,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::kernel::project_to_screen;

    fn camera() -> Camera {
        Camera {
            eye: Vec3::new(0.0, 0.0, 50.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect: 1.0,
            fovy: 45.0,
            znear: 0.1,
            zfar: 500.0,
        }
    }

    #[test]
    fn matrix_is_projection_times_view() {
        let cam = camera();
        assert_eq!(
            cam.build_matrix(),
            cam.build_projection() * cam.build_view()
        );
    }

    #[test]
    fn screen_axes_follow_camera_orientation() {
        let pv = camera().build_matrix();
        let right = project_to_screen(Vec3::new(5.0, 0.0, 0.0), &pv).unwrap();
        let up = project_to_screen(Vec3::new(0.0, 5.0, 0.0), &pv).unwrap();
        assert!(right.x > 0.5);
        assert!((right.y - 0.5).abs() < 1e-5);
        assert!(up.y > 0.5);
    }
}
