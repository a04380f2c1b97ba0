use glam::{Mat4, Vec2, Vec3};

use crate::selection::{classify, NormalizedBounds};

/// Highlight state shared with the point shaders.
/// NOTE: Must match the WGSL `Highlight` struct layout exactly (112 bytes)
///
/// WGSL layout:
///   locked_pv: mat4x4<f32>    (offset 0,  align 16)
///   rect_min: vec2<f32>       (offset 64, align 8)
///   rect_max: vec2<f32>       (offset 72)
///   selecting: u32            (offset 80)
///   locked: u32               (offset 84)
///   _pad: vec2<u32>           (offset 88)
///   color: vec4<f32>          (offset 96, align 16)
///   Total: 112 bytes
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct HighlightUniform {
    /// Projection-view matrix frozen at release (column-major).
    pub locked_pv: [[f32; 4]; 4],
    /// Lower-left corner of the rectangle in normalized coordinates.
    pub rect_min: [f32; 2],
    /// Upper-right corner of the rectangle in normalized coordinates.
    pub rect_max: [f32; 2],
    /// Nonzero while a drag is active.
    pub selecting: u32,
    /// Nonzero while a released rectangle is locked.
    pub locked: u32,
    _pad: [u32; 2],
    /// RGBA color of highlighted points.
    pub color: [f32; 4],
}

impl Default for HighlightUniform {
    fn default() -> Self {
        Self {
            locked_pv: Mat4::IDENTITY.to_cols_array_2d(),
            rect_min: [0.0; 2],
            rect_max: [0.0; 2],
            selecting: 0,
            locked: 0,
            _pad: [0; 2],
            color: [1.0, 0.0, 0.0, 1.0],
        }
    }
}

impl HighlightUniform {
    /// Whether anything is highlighted at all.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.selecting != 0 || self.locked != 0
    }

    /// Rectangle bounds as stored in the uniform.
    #[must_use]
    pub fn bounds(&self) -> NormalizedBounds {
        NormalizedBounds {
            min: Vec2::from_array(self.rect_min),
            max: Vec2::from_array(self.rect_max),
        }
    }

    /// Set the highlight color from an RGB triple (opaque).
    pub fn set_color(&mut self, rgb: [f32; 3]) {
        self.color = [rgb[0], rgb[1], rgb[2], 1.0];
    }

    /// Store `bounds` as the highlighted rectangle.
    pub fn set_bounds(&mut self, bounds: &NormalizedBounds) {
        self.rect_min = bounds.min.to_array();
        self.rect_max = bounds.max.to_array();
    }

    /// CPU mirror of `is_in_selection` in `highlight.wgsl`.
    ///
    /// While selecting the live matrix is used, so the highlight tracks the
    /// camera; once locked only the frozen matrix is.
    #[must_use]
    pub fn is_highlighted(&self, world_pos: Vec3, live_pv: &Mat4) -> bool {
        if self.selecting != 0 {
            return classify(world_pos, live_pv, &self.bounds());
        }
        if self.locked != 0 {
            let locked_pv = Mat4::from_cols_array_2d(&self.locked_pv);
            return classify(world_pos, &locked_pv, &self.bounds());
        }
        false
    }
}
