use quotetree_tree::{TreeLimits, DEFAULT_MAX_DEPTH};
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESOURCE_TYPE: &str = "quote_version";

/// Editor session settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Lock resource type the version id is registered under
    #[serde(default = "default_resource_type")]
    pub resource_type: String,

    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Re-fetch positions when entering edit mode
    #[serde(default = "default_true")]
    pub reload_on_enter: bool,
}

fn default_resource_type() -> String {
    DEFAULT_RESOURCE_TYPE.to_string()
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_true() -> bool {
    true
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            resource_type: default_resource_type(),
            max_depth: default_max_depth(),
            reload_on_enter: true,
        }
    }
}

impl EditorConfig {
    pub fn limits(&self) -> TreeLimits {
        TreeLimits::new(self.max_depth)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
