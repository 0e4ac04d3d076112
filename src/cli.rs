//! CLI argument parsing for the curation workflow.
//!
//! The CLI is intentionally thin: it resolves configuration and hands off to
//! the workflow, so the same core logic stays reusable from tests.
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{DEFAULT_ROOT_DIR, DEFAULT_VOTE_THRESHOLD};

/// Root CLI entrypoint for the curation workflow.
///
/// Keeping a single `RootArgs` type makes command routing obvious and avoids
/// hidden defaults in subcommand constructors.
#[derive(Parser, Debug)]
#[command(
    name = "guide-bot",
    version,
    about = "Community place-guide curation workflow",
    after_help = "Commands:\n  process   Process approved submissions into the guide tree\n  reindex   Rebuild every index document from the tree on disk\n\nExamples:\n  GITHUB_TOKEN=... guide-bot process --repo octocat/guide\n  guide-bot process --repo octocat/guide --threshold 50\n  guide-bot reindex --root countries",
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct RootArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Top-level workflow commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    Process(ProcessArgs),
    Reindex(ReindexArgs),
}

/// Process command inputs for one workflow run.
#[derive(Parser, Debug)]
#[command(about = "Process approved submissions into the guide tree")]
pub struct ProcessArgs {
    /// Repository identifier (owner/name); defaults to GITHUB_REPOSITORY
    #[arg(long, value_name = "REPO")]
    pub repo: Option<String>,

    /// Minimum net votes required to accept a submission
    #[arg(long, value_name = "N", default_value_t = DEFAULT_VOTE_THRESHOLD)]
    pub threshold: i64,

    /// Root directory of the generated guide tree
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT_DIR)]
    pub root: PathBuf,

    /// Extra attempts for transient geocoder failures
    #[arg(long, value_name = "N", default_value_t = 0)]
    pub geocoder_retries: u32,
}

/// Reindex command inputs; requires no credentials.
#[derive(Parser, Debug)]
#[command(about = "Rebuild every index document from the tree on disk")]
pub struct ReindexArgs {
    /// Root directory of the generated guide tree
    #[arg(long, value_name = "DIR", default_value = DEFAULT_ROOT_DIR)]
    pub root: PathBuf,
}
