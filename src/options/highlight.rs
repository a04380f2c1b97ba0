use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Highlight", inline)]
#[serde(default)]
/// Colors for highlighted points and the on-screen drag box.
pub struct HighlightOptions {
    /// RGB color of points inside the selection.
    #[schemars(title = "Highlight Color")]
    pub highlight_color: [f32; 3],
    /// RGBA fill of the drag box.
    #[schemars(title = "Overlay Fill")]
    pub overlay_fill: [f32; 4],
    /// RGBA border of the drag box.
    #[schemars(skip)]
    pub overlay_border: [f32; 4],
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            highlight_color: [1.0, 0.0, 0.0],
            // gold, rgba(255, 215, 0, 0.2)
            overlay_fill: [1.0, 0.843, 0.0, 0.2],
            overlay_border: [1.0, 0.843, 0.0, 1.0],
        }
    }
}
