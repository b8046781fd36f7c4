//! Command-line interface definition.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Read sanitized chapters from the command line.
#[derive(Parser, Debug)]
#[command(name = "quire", version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON), layered over the user config
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace); overrides RUST_LOG
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Load a chapter and print its sanitized markup
    Read {
        /// Chapter number, starting at 1
        id: u32,
        /// Print the chapter (number, title, content, load time) as JSON
        #[arg(long)]
        json: bool,
    },
    /// List every chapter with its title
    #[command(alias = "toc")]
    Menu,
    /// Sanitize a local file with the configured policy and print the result
    Sanitize {
        file: PathBuf,
        /// Print the extracted title instead of the markup
        #[arg(long)]
        title: bool,
    },
}
