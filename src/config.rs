//! Process configuration resolved once at startup.
//!
//! Every component receives a `&Config`; nothing consults the environment
//! after startup.

use anyhow::{anyhow, Result};
use std::env;
use std::path::PathBuf;

use crate::cli::ProcessArgs;

/// Minimum net votes (thumbs up minus thumbs down) to accept a place.
pub const DEFAULT_VOTE_THRESHOLD: i64 = 100;

/// Default root of the generated Markdown tree.
pub const DEFAULT_ROOT_DIR: &str = "countries";

/// Label names driving the issue lifecycle.
#[derive(Debug, Clone)]
pub struct Labels {
    /// Applied by a moderator; gates automated processing.
    pub approved: String,
    /// Marks submissions still collecting votes.
    pub pending: String,
    /// Applied when a place is written and the issue closed.
    pub accepted: String,
    /// Reserved for manual moderation; no automated transition applies it.
    pub rejected: String,
    /// Applied when the city cannot be verified.
    pub validation_failed: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            approved: "mod-approved".to_string(),
            pending: "pending-votes".to_string(),
            accepted: "accepted".to_string(),
            rejected: "rejected".to_string(),
            validation_failed: "validation-failed".to_string(),
        }
    }
}

/// Resolved process configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository identifier in `owner/name` form.
    pub repo: String,
    /// API access credential.
    pub token: String,
    pub vote_threshold: i64,
    pub root_dir: PathBuf,
    pub labels: Labels,
    /// Extra attempts for transient geocoder failures; 0 keeps them
    /// indistinguishable from not-found.
    pub geocoder_retries: u32,
}

impl Config {
    /// Resolve configuration from CLI arguments and the environment.
    ///
    /// A missing repository or token is the only error that aborts a run
    /// before any issue is touched.
    pub fn resolve(args: &ProcessArgs) -> Result<Self> {
        let repo = args
            .repo
            .clone()
            .or_else(|| env_nonempty("GITHUB_REPOSITORY"))
            .ok_or_else(|| anyhow!("repository not set (pass --repo or set GITHUB_REPOSITORY)"))?;
        let token = env_nonempty("GITHUB_TOKEN")
            .ok_or_else(|| anyhow!("GITHUB_TOKEN environment variable not set"))?;
        Ok(Self {
            repo,
            token,
            vote_threshold: args.threshold,
            root_dir: args.root.clone(),
            labels: Labels::default(),
            geocoder_retries: args.geocoder_retries,
        })
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}
