use serde::{Deserialize, Serialize};

/// Selection actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// clear_selection = "Escape"
/// retry_selection = "KeyR"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Drop the current rectangle and lock.
    ClearSelection,
    /// Reissue the query for the last locked rectangle.
    RetrySelection,
}
