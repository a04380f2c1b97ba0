use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::input::ModifierKey;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[schemars(title = "Selection", inline)]
#[serde(default)]
/// Rectangle selection behaviour.
pub struct SelectionOptions {
    /// Modifier that must be held to start a selection drag.
    #[schemars(title = "Drag Modifier")]
    pub modifier: ModifierKey,
    /// Number of scan workers; 0 picks from available parallelism.
    #[schemars(title = "Worker Threads", range(min = 0, max = 64))]
    pub worker_count: usize,
    /// Drop results of queries superseded by a newer drag instead of
    /// applying them late.
    #[schemars(title = "Discard Stale Results")]
    pub discard_stale_results: bool,
}

impl Default for SelectionOptions {
    fn default() -> Self {
        Self {
            modifier: ModifierKey::Shift,
            worker_count: 0,
            discard_stale_results: false,
        }
    }
}
