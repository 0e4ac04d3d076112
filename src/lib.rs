//! Community place-guide curation workflow.
//!
//! Issues propose places, emoji reactions vote, and a moderator label gates
//! automated processing. Each run validates the proposed city against a
//! geocoder, writes the place record into the `countries/` Markdown tree,
//! regenerates the index documents at every tree level, and closes the issue
//! with a disposition comment.

pub mod cli;
pub mod config;
pub mod content;
pub mod form;
pub mod geocode;
pub mod index;
pub mod tracker;
pub mod votes;
pub mod workflow;
