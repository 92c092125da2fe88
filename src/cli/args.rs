use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::exchange::ExportSource;
use crate::merge::MergePolicy;

#[derive(Parser, Debug)]
#[command(name = "design-tokens")]
#[command(version)]
#[command(
    about = "Keep page-builder kit colors and fonts in sync with the plugin option store",
    long_about = None
)]
pub struct Cli {
    /// Directory holding options.json and documents/ (overrides config.json)
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,

    /// Site URL written into exports (overrides config.json)
    #[arg(long, global = true, value_name = "URL")]
    pub site_url: Option<String>,

    /// Edit kit document metadata directly instead of going through the kit API
    #[arg(long, global = true)]
    pub no_api: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Export tokens as JSON, to stdout or a file
    Export {
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Read tokens from the kit or from the plugin option store
        #[arg(long, default_value = "kit", value_name = "kit|plugin")]
        source: ExportSource,

        /// Keep token ids in the export
        #[arg(long)]
        preserve_ids: bool,
    },
    /// Import tokens from a JSON exchange file
    Import {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// `merge` keeps kit tokens missing from the file, `replace` drops them
        #[arg(long, default_value = "merge", value_name = "merge|replace")]
        mode: MergePolicy,

        /// Keep token ids from the file
        #[arg(long)]
        preserve_ids: bool,
    },
    /// Re-push option-store tokens to the kit, keeping kit-only tokens
    Sync,
    /// Copy kit tokens into the option store
    Pull,
    /// Overwrite kit tokens with the option-store tokens
    Push,
    /// Replay a queued kit write
    Drain,
    /// Show the current token rows
    #[command(alias = "ls")]
    List {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },
    /// Append bulk `Name: value, ...` text to the current rows and save
    Save {
        /// Bulk color lines, e.g. `Primary: #1e73be`
        #[arg(long, value_name = "FILE")]
        colors: Option<PathBuf>,

        /// Bulk font lines, e.g. `Body: Inter, 16px, 400, 1.5em`
        #[arg(long, value_name = "FILE")]
        fonts: Option<PathBuf>,
    },
}
