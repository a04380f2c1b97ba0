use glam::{Mat4, Quat, Vec2, Vec3};

use super::core::Camera;
use super::CameraControls;
use crate::options::CameraOptions;

/// Orbit/pan/zoom camera controller.
///
/// While disabled (during a selection drag) every motion request is
/// ignored, so the projection stays fixed under the rectangle.
pub struct OrbitCamera {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,
    enabled: bool,

    /// Camera derived from the orbit parameters.
    pub camera: Camera,

    rotate_speed: f32,
    pan_speed: f32,
    zoom_speed: f32,
}

impl OrbitCamera {
    /// Orbit `focus_point` from `distance` units along +Z.
    #[must_use]
    pub fn new(
        focus_point: Vec3,
        distance: f32,
        aspect: f32,
        options: &CameraOptions,
    ) -> Self {
        let orientation = Quat::IDENTITY;
        let camera = Camera {
            eye: focus_point + Vec3::new(0.0, 0.0, distance),
            target: focus_point,
            up: Vec3::Y,
            aspect,
            fovy: options.fovy,
            znear: options.znear,
            zfar: options.zfar,
        };

        Self {
            orientation,
            distance,
            focus_point,
            enabled: true,
            camera,
            rotate_speed: options.rotate_speed,
            pan_speed: options.pan_speed,
            zoom_speed: options.zoom_speed,
        }
    }

    /// Place the eye at `eye` looking at `focus_point`, keeping `up` as
    /// close to the camera's vertical as possible.
    #[must_use]
    pub fn looking_at(
        mut self,
        eye: Vec3,
        focus_point: Vec3,
        up: Vec3,
    ) -> Self {
        let view = Mat4::look_at_rh(eye, focus_point, up);
        self.orientation = Quat::from_mat4(&view.inverse());
        self.distance = (eye - focus_point).length();
        self.focus_point = focus_point;
        self.update_camera_pos();
        self
    }

    /// Whether orbit/pan/zoom requests are currently applied.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Distance from the eye to the focus point.
    #[must_use]
    pub fn distance(&self) -> f32 {
        self.distance
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;

        self.camera.eye = self.focus_point + (dir * self.distance);
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// Orbit around the focus point by a pointer delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        // Horizontal rotation around camera's up vector
        let up = self.orientation * Vec3::Y;
        let horizontal_rotation =
            Quat::from_axis_angle(up, -delta.x * self.rotate_speed * 0.01);
        self.orientation = horizontal_rotation * self.orientation;

        // Vertical rotation around camera's right vector (after horizontal
        // rotation)
        let right = self.orientation * Vec3::X;
        let vertical_rotation =
            Quat::from_axis_angle(right, -delta.y * self.rotate_speed * 0.01);
        self.orientation = (vertical_rotation * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Translate the focus point in the view plane.
    pub fn pan(&mut self, delta: Vec2) {
        if !self.enabled {
            return;
        }
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;

        let translation = right * (-delta.x * self.pan_speed)
            + up * (delta.y * self.pan_speed);

        self.focus_point += translation;
        self.update_camera_pos();
    }

    /// Move toward (positive) or away from (negative) the focus point.
    pub fn zoom(&mut self, delta: f32) {
        if !self.enabled {
            return;
        }
        self.distance *= 1.0 - delta * self.zoom_speed;
        self.distance = self.distance.clamp(1.0, 1000.0);
        self.update_camera_pos();
    }
}

impl CameraControls for OrbitCamera {
    fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            log::debug!(
                "camera controls {}",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        self.enabled = enabled;
    }

    fn projection_view(&self) -> Mat4 {
        self.camera.build_matrix()
    }
}
