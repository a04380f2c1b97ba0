//! Drag-to-select gesture state machine.
//!
//! The machine turns raw pointer and modifier events into a live selection
//! rectangle plus discrete transition events:
//!
//! ```text
//! Idle/Locked --modifier + press over surface--> Dragging
//! Dragging    --cursor moved (anywhere)--------> Dragging
//! Dragging    --release (anywhere)-------------> Locked
//! Dragging/Locked --clear----------------------> Idle
//! ```
//!
//! Every drag-start opens a new drag with its own id; move handling for the
//! previous drag ends with it, so no move can leak into a later drag and no
//! rectangle survives a release except as the locked one.

use std::sync::mpsc;

use glam::Mat4;

use super::event::{InputEvent, ModifierKey, Modifiers, MouseButton};
use crate::camera::FrameContext;
use crate::selection::SelectionRect;

/// Current phase of the selection gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No rectangle; highlight off.
    Idle,
    /// Rectangle follows the pointer; camera controls are disabled.
    Dragging {
        /// Id of the drag in progress.
        drag_id: u64,
        /// Live rectangle.
        rect: SelectionRect,
    },
    /// Rectangle frozen together with the camera matrix at release.
    Locked {
        /// Id of the drag that produced the lock.
        drag_id: u64,
        /// Final rectangle.
        rect: SelectionRect,
        /// Projection-view matrix captured at release.
        projection_view: Mat4,
    },
}

/// Transition emitted by the [`GestureMachine`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// A drag began; start and end corners coincide.
    DragStart {
        /// Id of the new drag.
        drag_id: u64,
        /// Initial (zero-area) rectangle.
        rect: SelectionRect,
    },
    /// The end corner of the active drag moved.
    DragUpdate {
        /// Id of the active drag.
        drag_id: u64,
        /// Updated rectangle.
        rect: SelectionRect,
    },
    /// The drag was released and locked.
    DragEnd {
        /// Id of the finished drag.
        drag_id: u64,
        /// Final rectangle.
        rect: SelectionRect,
        /// Camera matrix captured at release.
        projection_view: Mat4,
    },
    /// Rectangle and lock were discarded.
    Clear,
}

/// Explicit state machine for the drag-to-select gesture.
pub struct GestureMachine {
    state: GestureState,
    modifier: ModifierKey,
    modifiers: Modifiers,
    cursor: Option<(f32, f32)>,
    next_drag_id: u64,
    subscribers: Vec<mpsc::Sender<GestureEvent>>,
}

impl GestureMachine {
    /// Create an idle machine that starts drags on `modifier` + left press.
    #[must_use]
    pub fn new(modifier: ModifierKey) -> Self {
        Self {
            state: GestureState::Idle,
            modifier,
            modifiers: Modifiers::default(),
            cursor: None,
            next_drag_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Whether a rectangle is locked.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        matches!(self.state, GestureState::Locked { .. })
    }

    /// Camera controls are disabled exactly while dragging.
    #[must_use]
    pub fn controls_enabled(&self) -> bool {
        !self.is_dragging()
    }

    /// Live or locked rectangle, if any.
    #[must_use]
    pub fn rect(&self) -> Option<SelectionRect> {
        match self.state {
            GestureState::Idle => None,
            GestureState::Dragging { rect, .. }
            | GestureState::Locked { rect, .. } => Some(rect),
        }
    }

    /// Matrix captured at the last release, while locked.
    #[must_use]
    pub fn locked_matrix(&self) -> Option<Mat4> {
        match self.state {
            GestureState::Locked {
                projection_view, ..
            } => Some(projection_view),
            _ => None,
        }
    }

    /// Modifier that starts a drag.
    #[must_use]
    pub fn modifier(&self) -> ModifierKey {
        self.modifier
    }

    /// Receive every event this machine emits from now on.
    ///
    /// Dropping the receiver unsubscribes.
    pub fn subscribe(&mut self) -> mpsc::Receiver<GestureEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Feed one raw input event.
    ///
    /// `frame` supplies the surface bounds for coordinate conversion and the
    /// camera matrix captured on release. Key presses are not handled here;
    /// see [`Self::clear`].
    pub fn handle_event(
        &mut self,
        event: &InputEvent,
        frame: &FrameContext,
    ) -> Option<GestureEvent> {
        match *event {
            InputEvent::CursorMoved { x, y } => self.cursor_moved(x, y, frame),
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: true,
            } => self.press(frame),
            InputEvent::MouseButton {
                button: MouseButton::Left,
                pressed: false,
            } => self.release(frame),
            InputEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers;
                None
            }
            InputEvent::MouseButton { .. } | InputEvent::KeyPressed { .. } => {
                None
            }
        }
    }

    /// Discard the rectangle and lock from any state.
    ///
    /// Emits [`GestureEvent::Clear`] unless already idle.
    pub fn clear(&mut self) -> Option<GestureEvent> {
        if self.state == GestureState::Idle {
            return None;
        }
        self.state = GestureState::Idle;
        log::debug!("selection cleared");
        self.emit(GestureEvent::Clear)
    }

    fn cursor_moved(
        &mut self,
        x: f32,
        y: f32,
        frame: &FrameContext,
    ) -> Option<GestureEvent> {
        self.cursor = Some((x, y));
        let GestureState::Dragging { drag_id, rect } = &mut self.state else {
            return None;
        };
        rect.end = frame.surface.coords(x, y);
        let event = GestureEvent::DragUpdate {
            drag_id: *drag_id,
            rect: *rect,
        };
        self.emit(event)
    }

    fn press(&mut self, frame: &FrameContext) -> Option<GestureEvent> {
        if self.is_dragging() || !self.modifiers.holds(self.modifier) {
            return None;
        }
        let (x, y) = self.cursor?;
        if !frame.surface.contains(x, y) {
            return None;
        }

        let drag_id = self.next_drag_id;
        self.next_drag_id += 1;
        let rect = SelectionRect::at(frame.surface.coords(x, y));
        self.state = GestureState::Dragging { drag_id, rect };
        log::debug!("drag {drag_id} started at ({x}, {y})");
        self.emit(GestureEvent::DragStart { drag_id, rect })
    }

    fn release(&mut self, frame: &FrameContext) -> Option<GestureEvent> {
        let GestureState::Dragging { drag_id, rect } = self.state else {
            return None;
        };
        let projection_view = frame.projection_view;
        self.state = GestureState::Locked {
            drag_id,
            rect,
            projection_view,
        };
        log::debug!("drag {drag_id} locked: {:?}", rect.bounds());
        self.emit(GestureEvent::DragEnd {
            drag_id,
            rect,
            projection_view,
        })
    }

    fn emit(&mut self, event: GestureEvent) -> Option<GestureEvent> {
        self.subscribers.retain(|tx| tx.send(event).is_ok());
        Some(event)
    }
}
