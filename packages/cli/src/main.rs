mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{
    move_positions, renumber, show, validate, MoveArgs, RenumberArgs, ShowArgs, ValidateArgs,
};
use config::Config;
use tracing_subscriber::EnvFilter;

/// Quotetree CLI - inspect and reorganize quote position trees
#[derive(Parser, Debug)]
#[command(name = "quotetree")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log structural decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the position tree as an outline
    Show(ShowArgs),

    /// Check position files against the tree invariants
    Validate(ValidateArgs),

    /// Move positions and print the resulting reorder payload
    Move(MoveArgs),

    /// Print absolute position numbers for every position
    Renumber(RenumberArgs),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let config = Config::load(&cwd)?;

    match cli.command {
        Command::Show(args) => show(args, &config),
        Command::Validate(args) => validate(args, &config),
        Command::Move(args) => move_positions(args, &config),
        Command::Renumber(args) => renumber(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(cli) {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
