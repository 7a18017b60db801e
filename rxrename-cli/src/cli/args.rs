use clap::Parser;
use std::path::PathBuf;

use super::types::{OutputFormat, PreviewArg, RenumberArg};

/// Rename batches of files by matching their names against a regex and expanding a template
///
/// Without --doit the planned renames are only listed.
#[derive(Parser, Debug)]
#[command(name = "rxrename")]
#[command(author, version, about)]
pub struct Cli {
    /// Names to rename [default: every non-hidden entry of the working directory]
    #[arg(value_name = "FILES")]
    pub files: Vec<String>,

    /// Perform the renames instead of listing them
    #[arg(long)]
    pub doit: bool,

    /// Create missing destination directories
    #[arg(short = 'm', long)]
    pub mkdir: bool,

    /// Pattern with named groups [default: contents of renamer.regex]
    #[arg(short = 'r', long, value_name = "REGEX")]
    pub regex: Option<String>,

    /// Output template, e.g. "{name}.{frame:04}.exr" [default: first line of renamer.format]
    #[arg(short = 'o', long, value_name = "TEMPLATE")]
    pub out: Option<String>,

    /// List renames when applying, report duplicate names and enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Report names that do not match the pattern
    #[arg(short = 's', long)]
    pub strict: bool,

    /// Rewrite the `frame` group before expanding the template
    #[arg(long, value_enum)]
    pub renumber: Option<RenumberArg>,

    /// Run as if started in <PATH> instead of the current working directory
    #[arg(short = 'C', value_name = "PATH")]
    pub directory: Option<PathBuf>,

    /// Read defaults from a TOML file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "summary")]
    pub output: OutputFormat,

    /// How to list planned renames
    #[arg(long, value_enum)]
    pub preview: Option<PreviewArg>,

    /// Append every performed action to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,
}
