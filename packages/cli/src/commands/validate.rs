use super::load_tree;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quotetree_editor::{PositionKind, PositionTree};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON files with position records
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeSummary {
    pub positions: usize,
    pub textblocks: usize,
    pub articles: usize,
    pub depth: usize,
}

impl TreeSummary {
    pub fn of(tree: &PositionTree) -> Self {
        let ids = tree.ids();
        let articles = ids
            .iter()
            .filter_map(|id| tree.locate(id.as_str()))
            .filter(|node| node.kind == PositionKind::Article)
            .count();
        let depth = tree.roots().iter().map(|root| root.height()).max().unwrap_or(0);

        Self {
            positions: ids.len(),
            textblocks: ids.len() - articles,
            articles,
            depth,
        }
    }
}

pub fn validate(args: ValidateArgs, config: &Config) -> Result<()> {
    let mut failed = 0;

    for input in &args.inputs {
        match load_tree(input, &config.editor).and_then(|tree| {
            tree.validate()?;
            Ok(TreeSummary::of(&tree))
        }) {
            Ok(summary) => println!(
                "{} {} ({} positions: {} textblocks, {} articles, depth {}/{})",
                "✓".green(),
                input.display(),
                summary.positions,
                summary.textblocks,
                summary.articles,
                summary.depth,
                config.editor.max_depth
            ),
            Err(err) => {
                failed += 1;
                println!("{} {}: {:#}", "✗".red(), input.display(), err);
            }
        }
    }

    if failed > 0 {
        return Err(anyhow::anyhow!(
            "{} of {} file(s) failed validation",
            failed,
            args.inputs.len()
        ));
    }
    Ok(())
}
