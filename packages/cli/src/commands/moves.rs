use super::{load_tree, to_json, write_records};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quotetree_editor::{MoveOutcome, MoveRequest, PositionId, PositionTree};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// JSON file with the version's position records
    pub input: PathBuf,

    /// Ids of the positions to move (comma separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    pub drag: Vec<String>,

    /// New parent id; omit to move to the top level
    #[arg(short, long)]
    pub parent: Option<String>,

    /// Index within the new sibling group; appends when omitted
    #[arg(short, long)]
    pub index: Option<usize>,

    /// Rewrite the input file with the new order
    #[arg(short, long)]
    pub write: bool,
}

impl MoveArgs {
    pub fn request(&self) -> MoveRequest {
        MoveRequest {
            drag_ids: self.drag.iter().map(|id| PositionId::from(id.as_str())).collect(),
            target_parent_id: self.parent.as_deref().map(PositionId::from),
            target_index: self.index.unwrap_or(usize::MAX),
        }
    }
}

pub fn apply_move(tree: &PositionTree, args: &MoveArgs) -> Result<MoveOutcome> {
    let request = args.request();
    let outcome = tree.move_positions(&request)?;
    Ok(outcome)
}

pub fn move_positions(args: MoveArgs, config: &Config) -> Result<()> {
    let tree = load_tree(&args.input, &config.editor)?;
    let outcome = apply_move(&tree, &args)?;

    for id in &outcome.missing {
        eprintln!("{} unknown position {}, ignored", "warning:".yellow().bold(), id);
    }
    if outcome.is_noop() {
        eprintln!("{} nothing to move", "warning:".yellow().bold());
        return Ok(());
    }

    println!("{}", to_json(&outcome.tree.renumber(), config.pretty)?);

    if args.write {
        write_records(&args.input, &outcome.tree, config.pretty)?;
        eprintln!(
            "{} moved {} position(s), wrote {}",
            "✓".green(),
            outcome.moved.len(),
            args.input.display()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::*;
    use quotetree_editor::{EditorConfig, TreeError, ValidationError};

    fn args(path: PathBuf, drag: &[&str], parent: Option<&str>, index: Option<usize>) -> MoveArgs {
        MoveArgs {
            input: path,
            drag: drag.iter().map(|s| s.to_string()).collect(),
            parent: parent.map(str::to_string),
            index,
            write: true,
        }
    }

    #[test]
    fn test_move_appends_by_default() {
        let (_dir, path) = write_quote(QUOTE);
        let tree = load_tree(&path, &EditorConfig::default()).unwrap();

        let outcome = apply_move(&tree, &args(path, &["switch"], Some("sv"), None)).unwrap();
        let sv = outcome.tree.locate("sv").unwrap();
        let children: Vec<&str> = sv.children.iter().map(|n| n.id.as_str()).collect();

        assert_eq!(children, vec!["install", "switch"]);
    }

    #[test]
    fn test_move_under_article_fails() {
        let (_dir, path) = write_quote(QUOTE);
        let tree = load_tree(&path, &EditorConfig::default()).unwrap();

        let result = apply_move(&tree, &args(path, &["sv"], Some("cable"), Some(0)));
        let err = result.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<TreeError>(),
            Some(TreeError::Validation(ValidationError::ArticleCannotHaveChildren(_)))
        ));
    }

    #[test]
    fn test_move_writes_file() {
        let (_dir, path) = write_quote(QUOTE);

        move_positions(
            args(path.clone(), &["sv"], None, Some(0)),
            &Config::default(),
        )
        .unwrap();

        let tree = load_tree(&path, &EditorConfig::default()).unwrap();
        let roots: Vec<&str> = tree.roots().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["sv", "hw"]);
    }

    #[test]
    fn test_unknown_ids_leave_file_alone() {
        let (_dir, path) = write_quote(QUOTE);
        let before = std::fs::read_to_string(&path).unwrap();

        move_positions(args(path.clone(), &["ghost"], None, None), &Config::default()).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }
}
