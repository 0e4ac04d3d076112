//! Per-issue curation workflow and the top-level run loop.
//!
//! Each issue moves through the gates linearly: fields, votes, location,
//! filesystem, lifecycle mutations. Expected rejections are [`Disposition`]
//! values, not errors; anything else is caught at the per-issue boundary so
//! one bad issue never aborts the run.

use anyhow::{Context, Result};
use std::fs;

use crate::config::Config;
use crate::content::{self, Place};
use crate::form::Submission;
use crate::geocode::{Geocoder, ResolvedLocation};
use crate::index;
use crate::tracker::{Issue, Tracker};
use crate::votes;

/// Outcome of processing a single issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Place written, indexes rebuilt, issue closed.
    Accepted {
        city: String,
        country: String,
        votes: i64,
    },
    /// Required fields absent; issue untouched beyond the comment.
    MissingFields(Vec<&'static str>),
    /// Net votes below threshold; issue left open for a later run.
    InsufficientVotes(i64),
    /// Geocoder could not verify the city; approval label swapped out.
    LocationNotFound(String),
}

/// Aggregate counts for one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub processed: usize,
    pub failed: usize,
}

/// Process every open issue carrying the approval label.
///
/// Failures are isolated per issue: the error is logged, reported back as a
/// comment on the offending issue, counted, and the run moves on.
pub fn run(config: &Config, tracker: &dyn Tracker, geocoder: &dyn Geocoder) -> Result<RunSummary> {
    tracing::info!(repo = %config.repo, "starting vote processing");
    fs::create_dir_all(&config.root_dir)
        .with_context(|| format!("create {}", config.root_dir.display()))?;

    let issues = tracker.open_issues_labeled(&config.labels.approved)?;
    let mut summary = RunSummary::default();
    for issue in issues {
        match process_issue(config, tracker, geocoder, &issue) {
            Ok(Disposition::Accepted { .. }) => summary.processed += 1,
            Ok(_) => summary.failed += 1,
            Err(err) => {
                tracing::error!(issue = issue.number, error = %err, "processing failed");
                let body = format!("❌ An error occurred while processing: {err}");
                if let Err(comment_err) = tracker.post_comment(issue.number, &body) {
                    tracing::warn!(
                        issue = issue.number,
                        error = %comment_err,
                        "failed to report error"
                    );
                }
                summary.failed += 1;
            }
        }
    }
    tracing::info!(
        processed = summary.processed,
        failed = summary.failed,
        "run complete"
    );
    Ok(summary)
}

/// Run one issue through the gates.
pub fn process_issue(
    config: &Config,
    tracker: &dyn Tracker,
    geocoder: &dyn Geocoder,
    issue: &Issue,
) -> Result<Disposition> {
    tracing::info!(issue = issue.number, title = %issue.title, "processing");

    let submission = match Submission::parse(&issue.body) {
        Ok(submission) => submission,
        Err(missing) => {
            let list = missing.join(", ");
            tracker.post_comment(issue.number, &format!("❌ Missing required fields: {list}"))?;
            tracing::warn!(issue = issue.number, fields = %list, "missing required fields");
            return Ok(Disposition::MissingFields(missing));
        }
    };

    let net_votes = votes::net_votes(&tracker.reactions(issue.number)?);
    tracing::info!(
        issue = issue.number,
        net_votes,
        threshold = config.vote_threshold,
        "tallied votes"
    );
    if net_votes < config.vote_threshold {
        let body = format!(
            "⏳ Not enough votes yet. Current: {net_votes}, Required: {}",
            config.vote_threshold
        );
        tracker.post_comment(issue.number, &body)?;
        return Ok(Disposition::InsufficientVotes(net_votes));
    }

    let Some(ResolvedLocation { city, country }) = geocoder.resolve_city(&submission.city)? else {
        let body = format!(
            "❌ **Validation Failed**\n\nCould not verify the city: **{}**\n\nPlease check the spelling and try again. The `{}` label has been removed.",
            submission.city, config.labels.approved
        );
        tracker.post_comment(issue.number, &body)?;
        let swap = tracker
            .remove_label(issue.number, &config.labels.approved)
            .and_then(|()| tracker.add_label(issue.number, &config.labels.validation_failed));
        if let Err(err) = swap {
            tracing::warn!(issue = issue.number, error = %err, "label swap failed");
        }
        return Ok(Disposition::LocationNotFound(submission.city));
    };

    let place = Place {
        country: country.clone(),
        city: city.clone(),
        category: submission.category.clone(),
        place_name: submission.place_name.clone(),
        description: submission.description,
        address: submission.address,
        website: submission.website,
        issue_number: issue.number,
    };
    content::write_place(&config.root_dir, &place)?;

    // Each index level only lists children that already carry an index, so
    // the order city, country, root must hold.
    let country_path = config.root_dir.join(content::sanitize_dirname(&country));
    let city_path = country_path.join(content::sanitize_dirname(&city));
    index::rebuild_city_index(&city_path, &city)?;
    index::rebuild_country_index(&country_path, &country)?;
    index::rebuild_root_index(&config.root_dir)?;

    let body = format!(
        "✅ **Success!**\n\n**{}** has been added to the guide!\n\n📍 Location: {city}, {country}\n📁 Category: {}\n👍 Votes: {net_votes}\n\nThank you for your contribution! 🎉",
        submission.place_name, submission.category
    );
    tracker.post_comment(issue.number, &body)?;

    for label in [&config.labels.pending, &config.labels.approved] {
        if let Err(err) = tracker.remove_label(issue.number, label) {
            tracing::warn!(issue = issue.number, label = %label, error = %err, "label removal failed");
        }
    }
    tracker.add_label(issue.number, &config.labels.accepted)?;
    tracker.close_issue(issue.number)?;

    tracing::info!(issue = issue.number, city = %city, country = %country, "accepted");
    Ok(Disposition::Accepted {
        city,
        country,
        votes: net_votes,
    })
}
