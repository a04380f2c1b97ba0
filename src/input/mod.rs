//! Input handling: event types, the drag-to-select state machine, and the
//! queue that carries raw events to the coordinating thread.

/// Platform-agnostic input events.
pub mod event;
/// Drag-to-select gesture state machine.
pub mod gesture;
/// Bindable keyboard actions.
pub mod keyboard;
/// Channel from input producers to the dispatcher.
pub mod queue;

pub use event::{InputEvent, ModifierKey, Modifiers, MouseButton};
pub use gesture::{GestureEvent, GestureMachine, GestureState};
pub use keyboard::KeyAction;
pub use queue::{InputQueue, InputSender};
