//! Clap CLI definitions for the `colab-badge` command.
//!
//! Running `colab-badge` without a subcommand updates the given notebooks in
//! place; `check` runs the same logic without writing.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use colab_badge_core::BadgeStyle;

/// colab-badge -- keep "Open in Colab" badges current.
#[derive(Parser, Debug)]
#[command(
    name = "colab-badge",
    about = "Prepend an Open in Colab badge to Jupyter notebooks",
    long_about = "Prepend an Open in Colab badge to Jupyter notebooks. Existing badges are \
                  removed first, so re-running with the same repository and branch is a no-op.",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(flatten)]
    pub update: UpdateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Configuration file (default: nearest .colab-badge.yaml, or $COLAB_BADGE_CONFIG).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository root notebook paths are made relative to (default: enclosing git root).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Output a JSON report.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose/debug output.
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output (errors only).
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

/// All available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Report notebooks whose badge is missing or out of date, without writing.
    Check(UpdateArgs),

    /// Print version information.
    Version,

    /// Generate shell completion scripts.
    Completion(CompletionArgs),
}

/// Arguments shared by the default update mode and `check`.
#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Notebook files to process (already expanded by the caller).
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// GitHub repository the badge links to (owner/name).
    #[arg(short = 'r', long = "repo", visible_alias = "repository", value_name = "OWNER/NAME")]
    pub repo: Option<String>,

    /// Branch the badge links to.
    #[arg(short = 'b', long, value_name = "REF")]
    pub branch: Option<String>,

    /// Badge markup style: markdown or html.
    #[arg(long)]
    pub style: Option<BadgeStyle>,

    /// Percent-encode the branch name in the badge URL.
    #[arg(long)]
    pub encode_branch: bool,
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

/// Arguments for `colab-badge completion`.
#[derive(Args, Debug)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}
