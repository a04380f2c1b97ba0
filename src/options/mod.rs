//! Selection options with TOML preset support.
//!
//! Every tweakable setting (drag modifier, worker count, stale-result
//! policy, highlight colors, camera, keybindings) lives here. Options
//! serialize to/from TOML so a preset file only needs the sections it
//! overrides.

mod camera;
mod highlight;
mod keybindings;
mod selection;

use std::path::Path;

pub use camera::CameraOptions;
pub use highlight::HighlightOptions;
pub use keybindings::KeybindingOptions;
use schemars::JsonSchema;
pub use selection::SelectionOptions;
use serde::{Deserialize, Serialize};

use crate::error::CloudpickError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[selection]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Drag modifier, worker pool and stale-result policy.
    pub selection: SelectionOptions,
    /// Highlight and overlay colors.
    pub highlight: HighlightOptions,
    /// Camera projection and control parameters.
    pub camera: CameraOptions,
    /// Keyboard binding options.
    #[schemars(skip)]
    pub keybindings: KeybindingOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Parse options from TOML text. Missing fields use defaults.
    pub fn from_toml(content: &str) -> Result<Self, CloudpickError> {
        let mut opts: Self = toml::from_str(content)
            .map_err(|e| CloudpickError::OptionsParse(e.to_string()))?;
        opts.keybindings.rebuild_reverse_map();
        Ok(opts)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    pub fn load(path: &Path) -> Result<Self, CloudpickError> {
        let content =
            std::fs::read_to_string(path).map_err(CloudpickError::Io)?;
        let opts = Self::from_toml(&content)?;
        log::debug!("loaded options from {}", path.display());
        Ok(opts)
    }

    /// Save options to a TOML file (pretty-printed).
    pub fn save(&self, path: &Path) -> Result<(), CloudpickError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CloudpickError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(CloudpickError::Io)?;
        }
        std::fs::write(path, content).map_err(CloudpickError::Io)
    }

    /// List available preset names (TOML file stems) in a directory.
    #[must_use]
    pub fn list_presets(dir: &Path) -> Vec<String> {
        let mut names = Vec::new();
        if let Ok(entries) = std::fs::read_dir(dir) {
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().is_some_and(|ext| ext == "toml") {
                    if let Some(stem) =
                        path.file_stem().and_then(|s| s.to_str())
                    {
                        names.push(stem.to_owned());
                    }
                }
            }
        }
        names.sort();
        names
    }
}
