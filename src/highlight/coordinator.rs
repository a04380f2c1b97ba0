use glam::Mat4;

use super::uniform::HighlightUniform;
use crate::input::{GestureEvent, GestureMachine, GestureState};
use crate::options::HighlightOptions;
use crate::selection::PixelBox;

/// Sole writer of the highlight uniform.
///
/// Lives on the coordinating thread next to the [`GestureMachine`];
/// renderers only ever see published snapshots through a
/// [`HighlightReader`].
pub struct HighlightCoordinator {
    uniform: HighlightUniform,
    input: triple_buffer::Input<HighlightUniform>,
    options: HighlightOptions,
}

/// Drag box to draw over the surface, with its colors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOverlay {
    /// Box in surface pixels.
    pub rect: PixelBox,
    /// RGBA fill.
    pub fill: [f32; 4],
    /// RGBA border.
    pub border: [f32; 4],
}

/// Read-only view of the latest published [`HighlightUniform`].
///
/// Reading never blocks the writer.
pub struct HighlightReader {
    output: triple_buffer::Output<HighlightUniform>,
}

impl HighlightReader {
    /// Latest published uniform.
    pub fn read(&mut self) -> HighlightUniform {
        *self.output.read()
    }

    /// Raw bytes of the latest uniform, ready for a GPU buffer upload.
    pub fn read_bytes(&mut self) -> [u8; 112] {
        bytemuck::cast(self.read())
    }
}

impl HighlightCoordinator {
    /// Create the coordinator and the paired reader for the renderer.
    #[must_use]
    pub fn new(options: HighlightOptions) -> (Self, HighlightReader) {
        let mut uniform = HighlightUniform::default();
        uniform.set_color(options.highlight_color);
        let (input, output) = triple_buffer::triple_buffer(&uniform);
        (
            Self {
                uniform,
                input,
                options,
            },
            HighlightReader { output },
        )
    }

    /// Current (last published) uniform as seen by the writer.
    #[must_use]
    pub fn uniform(&self) -> &HighlightUniform {
        &self.uniform
    }

    /// Colors used for highlighted points and the drag box.
    #[must_use]
    pub fn options(&self) -> &HighlightOptions {
        &self.options
    }

    /// Apply a gesture transition to the uniform and publish it.
    pub fn apply(&mut self, event: &GestureEvent) {
        match event {
            GestureEvent::DragStart { rect, .. } => {
                self.uniform.selecting = 1;
                self.uniform.locked = 0;
                self.uniform.set_bounds(&rect.bounds());
            }
            GestureEvent::DragUpdate { rect, .. } => {
                self.uniform.set_bounds(&rect.bounds());
            }
            GestureEvent::DragEnd {
                rect,
                projection_view,
                ..
            } => {
                self.uniform.selecting = 0;
                self.uniform.locked = 1;
                self.uniform.locked_pv = projection_view.to_cols_array_2d();
                self.uniform.set_bounds(&rect.bounds());
            }
            GestureEvent::Clear => {
                self.uniform.selecting = 0;
                self.uniform.locked = 0;
                self.uniform.locked_pv = Mat4::IDENTITY.to_cols_array_2d();
            }
        }
        self.publish();
    }

    /// Per-frame refresh: while dragging, publish the live rectangle.
    ///
    /// Other states were already published by [`Self::apply`].
    pub fn update_frame(&mut self, gesture: &GestureMachine) {
        if let GestureState::Dragging { rect, .. } = gesture.state() {
            self.uniform.selecting = 1;
            self.uniform.set_bounds(&rect.bounds());
            self.publish();
        }
    }

    /// On-screen drag box, shown only while dragging.
    #[must_use]
    pub fn overlay(&self, gesture: &GestureMachine) -> Option<DragOverlay> {
        match gesture.state() {
            GestureState::Dragging { rect, .. } => Some(DragOverlay {
                rect: rect.pixel_box(),
                fill: self.options.overlay_fill,
                border: self.options.overlay_border,
            }),
            GestureState::Idle | GestureState::Locked { .. } => None,
        }
    }

    fn publish(&mut self) {
        self.input.write(self.uniform);
    }
}
