use super::{load_tree, to_json};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quotetree_editor::{
    tree_rows, ChangeTrackingStore, FieldOverlay, PositionKind, PositionTree, TreeRow,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// JSON file with the version's position records
    pub input: PathBuf,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text")]
    pub format: String,

    /// Also print descriptions
    #[arg(short, long)]
    pub descriptions: bool,
}

pub fn show(args: ShowArgs, config: &Config) -> Result<()> {
    let tree = load_tree(&args.input, &config.editor)?;

    match args.format.as_str() {
        "json" => println!("{}", to_json(tree.roots(), config.pretty)?),
        "text" => print!("{}", render_tree(&tree, args.descriptions)),
        other => {
            return Err(anyhow::anyhow!(
                "Unknown format: {}. Use: text or json",
                other
            ))
        }
    }
    Ok(())
}

/// Outline of the tree, one position per line
pub fn render_tree(tree: &PositionTree, descriptions: bool) -> String {
    if tree.is_empty() {
        return format!("{}\n", "(no positions)".dimmed());
    }

    let store = ChangeTrackingStore::new();
    let rows = tree_rows(tree, FieldOverlay::new(tree, &store), None);
    let mut out = String::new();

    let mut numbers: Vec<usize> = Vec::new();
    for row in &rows {
        numbers.truncate(row.depth - 1);
        numbers.push(sibling_number(&rows, row));
        let label = numbers
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(".");

        let indent = "  ".repeat(row.depth - 1);
        let name = match row.kind {
            PositionKind::Textblock => row.name.bold(),
            PositionKind::Article => row.name.cyan(),
        };
        out.push_str(&format!(
            "{indent}{} {} {}\n",
            label.dimmed(),
            name,
            format!("[{}]", row.id).dimmed()
        ));

        if descriptions {
            if let Some(node) = tree.locate(row.id.as_str()) {
                if !node.description.is_empty() {
                    out.push_str(&format!("{indent}   {}\n", node.description.italic()));
                }
            }
        }
    }
    out
}

/// 1-based position of `row` among its siblings
fn sibling_number(rows: &[TreeRow], row: &TreeRow) -> usize {
    rows.iter()
        .filter(|other| other.parent_id == row.parent_id)
        .position(|other| other.id == row.id)
        .map_or(1, |index| index + 1)
}
