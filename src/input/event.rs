use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Platform-agnostic input events.
///
/// These are fed into a [`SelectionSession`](crate::session::SelectionSession)
/// (directly or through an [`InputQueue`](super::InputQueue)), which routes
/// them to the [`GestureMachine`](super::GestureMachine).
///
/// # Example
///
/// ```ignore
/// session.handle_event(
///     &InputEvent::CursorMoved { x: 100.0, y: 200.0 },
///     &frame,
///     &mut camera,
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Cursor moved to an absolute window position.
    CursorMoved {
        /// Horizontal position in window pixels.
        x: f32,
        /// Vertical position in window pixels.
        y: f32,
    },
    /// Mouse button pressed or released.
    MouseButton {
        /// Which button changed.
        button: MouseButton,
        /// `true` for press, `false` for release.
        pressed: bool,
    },
    /// Modifier key state changed.
    ModifiersChanged(Modifiers),
    /// A key was pressed.
    KeyPressed {
        /// Physical key name in `KeyCode` debug format (`"Escape"`,
        /// `"KeyR"`).
        key: String,
    },
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Secondary (right) mouse button.
    Right,
    /// Middle mouse button (wheel click).
    Middle,
}

/// Currently held modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Modifiers {
    /// Shift is held.
    pub shift: bool,
    /// Control is held.
    pub control: bool,
    /// Alt / Option is held.
    pub alt: bool,
}

impl Modifiers {
    /// Only shift held.
    pub const SHIFT: Self = Self {
        shift: true,
        control: false,
        alt: false,
    };

    /// Whether `key` is among the held modifiers.
    #[must_use]
    pub fn holds(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Shift => self.shift,
            ModifierKey::Control => self.control,
            ModifierKey::Alt => self.alt,
        }
    }
}

/// Modifier that turns a left press over the surface into a selection drag.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ModifierKey {
    /// Shift (default).
    #[default]
    Shift,
    /// Control.
    Control,
    /// Alt / Option.
    Alt,
}
