//! Issue-tracker collaborator: the trait seam and the GitHub REST client.
//!
//! The workflow only sees the [`Tracker`] trait; tests substitute in-memory
//! fakes. All calls are synchronous and unauthenticated failures surface as
//! errors with enough context to identify the request.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use ureq::Agent;

use crate::config::Config;

/// User agent sent to every external service.
pub const USER_AGENT: &str = "git-guide-bot/1.0";

const API_ROOT: &str = "https://api.github.com";
const API_VERSION: &str = "2022-11-28";
const PAGE_SIZE: usize = 100;

/// An issue on the curation worklist.
#[derive(Debug, Clone)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub body: String,
}

/// Reaction content classifier. Anything beyond the two vote kinds is carried
/// as `Other` and ignored by the tally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ReactionKind {
    #[serde(rename = "+1")]
    ThumbsUp,
    #[serde(rename = "-1")]
    ThumbsDown,
    #[serde(other)]
    Other,
}

/// A single reaction event on an issue.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Reaction {
    pub content: ReactionKind,
}

/// Operations the workflow needs from the issue tracker.
pub trait Tracker {
    /// List open issues carrying the given label.
    fn open_issues_labeled(&self, label: &str) -> Result<Vec<Issue>>;

    /// List the reactions attached to an issue.
    fn reactions(&self, number: u64) -> Result<Vec<Reaction>>;

    /// Post a comment on an issue.
    fn post_comment(&self, number: u64, body: &str) -> Result<()>;

    /// Add a label to an issue.
    fn add_label(&self, number: u64, label: &str) -> Result<()>;

    /// Remove a label from an issue. Removing an absent label is not an
    /// error.
    fn remove_label(&self, number: u64, label: &str) -> Result<()>;

    /// Transition an issue to the closed state.
    fn close_issue(&self, number: u64) -> Result<()>;
}

/// Wire shape of an issue-list entry. The issues endpoint also returns pull
/// requests; those carry a `pull_request` key and are skipped.
#[derive(Debug, Deserialize)]
struct IssueRecord {
    number: u64,
    title: String,
    #[serde(default)]
    body: Option<String>,
    #[serde(default)]
    pull_request: Option<serde_json::Value>,
}

fn issues_from_records(records: Vec<IssueRecord>) -> Vec<Issue> {
    records
        .into_iter()
        .filter(|record| record.pull_request.is_none())
        .map(|record| Issue {
            number: record.number,
            title: record.title,
            body: record.body.unwrap_or_default(),
        })
        .collect()
}

/// GitHub REST API v3 client.
pub struct GitHubTracker {
    agent: Agent,
    repo: String,
    token: String,
}

impl GitHubTracker {
    pub fn new(config: &Config) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(30)))
            .build()
            .into();
        Self {
            agent,
            repo: config.repo.clone(),
            token: config.token.clone(),
        }
    }

    fn url(&self, rest: &str) -> String {
        format!("{API_ROOT}/repos/{}/{rest}", self.repo)
    }

    fn auth(&self) -> String {
        format!("Bearer {}", self.token)
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut response = self
            .agent
            .get(url)
            .header("Authorization", self.auth())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .call()
            .with_context(|| format!("GET {url}"))?;
        response
            .body_mut()
            .read_json()
            .with_context(|| format!("decode {url}"))
    }

    /// Follow `page=` pagination until a short page.
    fn get_paged<T: DeserializeOwned>(&self, path: &str, query: &str) -> Result<Vec<T>> {
        let sep = if query.is_empty() { "" } else { "&" };
        let mut all = Vec::new();
        for page in 1u32.. {
            let url = self.url(&format!("{path}?{query}{sep}per_page={PAGE_SIZE}&page={page}"));
            let batch: Vec<T> = self.get_json(&url)?;
            let count = batch.len();
            all.extend(batch);
            if count < PAGE_SIZE {
                break;
            }
        }
        Ok(all)
    }

    fn post_json(&self, url: &str, payload: serde_json::Value, action: &str) -> Result<()> {
        self.agent
            .post(url)
            .header("Authorization", self.auth())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .send_json(payload)
            .with_context(|| format!("{action} (POST {url})"))?;
        Ok(())
    }
}

impl Tracker for GitHubTracker {
    fn open_issues_labeled(&self, label: &str) -> Result<Vec<Issue>> {
        let records =
            self.get_paged::<IssueRecord>("issues", &format!("state=open&labels={label}"))?;
        let issues = issues_from_records(records);
        tracing::info!(label, count = issues.len(), "fetched worklist");
        Ok(issues)
    }

    fn reactions(&self, number: u64) -> Result<Vec<Reaction>> {
        self.get_paged(&format!("issues/{number}/reactions"), "")
    }

    fn post_comment(&self, number: u64, body: &str) -> Result<()> {
        self.post_json(
            &self.url(&format!("issues/{number}/comments")),
            serde_json::json!({ "body": body }),
            "post comment",
        )
    }

    fn add_label(&self, number: u64, label: &str) -> Result<()> {
        self.post_json(
            &self.url(&format!("issues/{number}/labels")),
            serde_json::json!({ "labels": [label] }),
            "add label",
        )
    }

    fn remove_label(&self, number: u64, label: &str) -> Result<()> {
        let url = self.url(&format!("issues/{number}/labels/{label}"));
        match self
            .agent
            .delete(url.as_str())
            .header("Authorization", self.auth())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .call()
        {
            Ok(_) => Ok(()),
            // 404 means the label is already absent.
            Err(ureq::Error::StatusCode(404)) => {
                tracing::debug!(issue = number, label, "label already absent");
                Ok(())
            }
            Err(err) => {
                Err(err).with_context(|| format!("remove label {label} from issue #{number}"))
            }
        }
    }

    fn close_issue(&self, number: u64) -> Result<()> {
        let url = self.url(&format!("issues/{number}"));
        self.agent
            .patch(url.as_str())
            .header("Authorization", self.auth())
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .header("User-Agent", USER_AGENT)
            .send_json(serde_json::json!({ "state": "closed" }))
            .with_context(|| format!("close issue #{number}"))?;
        Ok(())
    }
}
