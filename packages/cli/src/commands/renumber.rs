use super::{load_tree, to_json, write_records};
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use quotetree_editor::{PositionRecord, PositionTree, PositionUpdate};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct RenumberArgs {
    /// JSON file with the version's position records
    pub input: PathBuf,

    /// Rewrite the input file with contiguous position numbers
    #[arg(short, long)]
    pub write: bool,
}

/// Updates whose number or parent differ from what the records carry
pub fn stale_updates(tree: &PositionTree, records: &[PositionRecord]) -> Vec<PositionUpdate> {
    tree.renumber()
        .into_iter()
        .filter(|update| {
            records
                .iter()
                .find(|record| record.id == update.id)
                .map_or(true, |record| {
                    record.position_number != Some(update.position_number)
                        || record.parent_id != update.parent_id
                })
        })
        .collect()
}

pub fn renumber(args: RenumberArgs, config: &Config) -> Result<()> {
    let records = super::read_records(&args.input)?;
    let tree = load_tree(&args.input, &config.editor)?;
    let stale = stale_updates(&tree, &records);

    println!("{}", to_json(&tree.renumber(), config.pretty)?);

    if args.write {
        write_records(&args.input, &tree, config.pretty)?;
    }
    eprintln!(
        "{} {} of {} position(s) renumbered",
        "✓".green(),
        stale.len(),
        tree.len()
    );
    Ok(())
}
