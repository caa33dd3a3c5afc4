pub mod moves;
pub mod renumber;
pub mod show;
pub mod validate;

pub use moves::{move_positions, MoveArgs};
pub use renumber::{renumber, RenumberArgs};
pub use show::{show, ShowArgs};
pub use validate::{validate, ValidateArgs};

use anyhow::{Context, Result};
use quotetree_editor::{EditorConfig, PositionRecord, PositionTree};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Read a JSON array of position records
pub fn read_records(path: &Path) -> Result<Vec<PositionRecord>> {
    if !path.is_file() {
        return Err(anyhow::anyhow!("Input file does not exist: {}", path.display()));
    }
    let source = fs::read_to_string(path)?;
    serde_json::from_str(&source).with_context(|| format!("Invalid records in {}", path.display()))
}

/// Read records and assemble them with the configured limits
pub fn load_tree(path: &Path, config: &EditorConfig) -> Result<PositionTree> {
    let records = read_records(path)?;
    tracing::debug!(path = %path.display(), records = records.len(), "Read records");
    PositionTree::from_records_with_limits(records, config.limits())
        .with_context(|| format!("Cannot build position tree from {}", path.display()))
}

/// Write the tree back as numbered records
pub fn write_records(path: &Path, tree: &PositionTree, pretty: bool) -> Result<()> {
    fs::write(path, to_json(&tree.to_records(), pretty)?)?;
    Ok(())
}

pub fn to_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::PathBuf;
    use tempfile::TempDir;

    pub const QUOTE: &str = r#"[
        { "id": "hw", "title": "Hardware", "type": "textblock", "positionNumber": 1 },
        { "id": "cable", "parentId": "hw", "title": "Cable", "type": "article", "positionNumber": 2 },
        { "id": "switch", "parentId": "hw", "title": "Switch", "type": "article", "positionNumber": 1 },
        { "id": "sv", "title": "Services", "type": "textblock", "positionNumber": 2 },
        { "id": "install", "parentId": "sv", "title": "Installation", "type": "article" }
    ]"#;

    pub fn write_quote(contents: &str) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("positions.json");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }
}
