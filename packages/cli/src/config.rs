use quotetree_editor::EditorConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "quotetree.config.json";

/// Quotetree configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Session and tree settings shared with the editor
    #[serde(default)]
    pub editor: EditorConfig,

    /// Pretty-print JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

fn default_pretty() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            pretty: default_pretty(),
        }
    }
}

impl Config {
    /// Load config from a directory, falling back to defaults
    pub fn load(cwd: &Path) -> anyhow::Result<Self> {
        let config_path = cwd.join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|err| anyhow::anyhow!("{}: {}", config_path.display(), err))?;
            tracing::debug!(path = %config_path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn path(cwd: &Path) -> PathBuf {
        cwd.join(DEFAULT_CONFIG_NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let json = r#"{
            "editor": { "maxDepth": 3, "reloadOnEnter": false },
            "pretty": false
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.editor.max_depth, 3);
        assert!(!config.editor.reload_on_enter);
        assert_eq!(config.editor.resource_type, "quote_version");
        assert!(!config.pretty);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.editor.max_depth, 4);
        assert!(config.pretty);
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path(dir.path()), r#"{ "editor": { "maxDepth": 2 } }"#).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.editor.max_depth, 2);
        assert!(config.pretty);
    }

    #[test]
    fn test_invalid_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(Config::path(dir.path()), "{ not json").unwrap();

        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains(DEFAULT_CONFIG_NAME));
    }
}
