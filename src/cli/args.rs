use crate::cli::config::parse_range;
use clap::{Args, Subcommand};
use std::path::PathBuf;

/// Where the code point set comes from
///
/// Sources combine: a charset, extra chars, ranges and a text file may all be
/// given at once. With none of them, the configured default charset is used.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Named charset (see `config list`)
    #[arg(short = 'c', long)]
    pub charset: Option<String>,

    /// Explicit characters to include
    #[arg(long)]
    pub chars: Option<String>,

    /// Inclusive code point range, e.g. 0x41-0x5A, U+0391-U+03A9 or 48-57
    #[arg(long = "range", value_name = "LOW-HIGH", value_parser = parse_range)]
    pub ranges: Vec<(u32, u32)>,

    /// Include every distinct character of a UTF-8 text file
    #[arg(long, value_name = "FILE")]
    pub from_file: Option<PathBuf>,
}

impl SourceArgs {
    pub fn is_empty(&self) -> bool {
        self.charset.is_none() && self.chars.is_none() && self.ranges.is_empty() && self.from_file.is_none()
    }
}

/// Arguments for building a table
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output file (writes to stdout if not provided)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

/// Arguments for resolving text against a table
#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Text to resolve (reads --file or stdin if not provided)
    pub text: Option<String>,

    /// Table file produced by `build`
    #[arg(short = 't', long, conflicts_with_all = ["charset", "chars", "ranges", "from_file"])]
    pub table: Option<PathBuf>,

    /// Build the table on the fly from these sources
    #[command(flatten)]
    pub source: SourceArgs,

    /// Input file
    #[arg(short = 'f', long, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Code points resolved per batch (default from settings)
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

/// Arguments for inspecting a table file
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Table file
    pub path: PathBuf,

    /// List every code point with its offset
    #[arg(long)]
    pub entries: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Config subcommand actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// List available charsets
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show details for a specific charset
    Show {
        /// Charset name
        charset: String,
    },
}
