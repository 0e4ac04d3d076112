//! City validation against the Nominatim geocoder.
//!
//! The workflow only sees the [`Geocoder`] trait. The Nominatim client asks
//! for exactly one best match with address details in English and reduces
//! every failure mode to "not found": a transient outage is reported the same
//! way as a misspelled city. The configurable retry count is the only
//! concession to that ambiguity and defaults to zero.

use anyhow::Result;
use serde::Deserialize;
use std::time::Duration;
use ureq::Agent;

use crate::content::capitalize;
use crate::tracker::USER_AGENT;

const SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";

/// A validated (city, country) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub city: String,
    pub country: String,
}

/// Resolves a free-text city name to a canonical location.
pub trait Geocoder {
    /// `Ok(None)` means the city could not be verified; transient service
    /// failures are reported the same way.
    fn resolve_city(&self, raw: &str) -> Result<Option<ResolvedLocation>>;
}

/// One search hit; only the structured address is consulted.
#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(default)]
    address: Option<Address>,
}

/// Structured address components, in city-selection priority order.
#[derive(Debug, Default, Deserialize)]
struct Address {
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    village: Option<String>,
    #[serde(default)]
    municipality: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

/// Nominatim (OpenStreetMap) client.
pub struct NominatimGeocoder {
    agent: Agent,
    retries: u32,
}

impl NominatimGeocoder {
    pub fn new(retries: u32) -> Self {
        let agent: Agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(10)))
            .build()
            .into();
        Self { agent, retries }
    }

    fn search(&self, raw: &str) -> Result<Vec<SearchHit>, ureq::Error> {
        let mut response = self
            .agent
            .get(SEARCH_URL)
            .query("q", raw)
            .query("format", "jsonv2")
            .query("limit", "1")
            .query("addressdetails", "1")
            .query("accept-language", "en")
            .header("User-Agent", USER_AGENT)
            .call()?;
        response.body_mut().read_json()
    }
}

impl Geocoder for NominatimGeocoder {
    fn resolve_city(&self, raw: &str) -> Result<Option<ResolvedLocation>> {
        let Some(hits) = with_retries(self.retries, raw, || self.search(raw)) else {
            return Ok(None);
        };
        let location = hits
            .into_iter()
            .next()
            .and_then(|hit| hit.address)
            .map(|address| resolve_from_address(&address, raw));
        match &location {
            Some(resolved) => tracing::info!(
                raw,
                city = %resolved.city,
                country = %resolved.country,
                "validated city"
            ),
            None => tracing::warn!(city = raw, "city not found"),
        }
        Ok(location)
    }
}

/// Run `op` up to `retries + 1` times, stopping early on success or on a
/// definitive service answer. `None` means every attempt failed.
fn with_retries<T>(
    retries: u32,
    raw: &str,
    mut op: impl FnMut() -> Result<T, ureq::Error>,
) -> Option<T> {
    let mut attempt = 0;
    loop {
        match op() {
            Ok(value) => return Some(value),
            Err(err) if attempt < retries && is_transient(&err) => {
                attempt += 1;
                tracing::warn!(city = raw, attempt, error = %err, "geocoder failure, retrying");
            }
            Err(err) => {
                tracing::error!(city = raw, error = %err, "geocoder error");
                return None;
            }
        }
    }
}

/// A 4xx response (other than 429) is a definitive answer from the service;
/// everything else may be a blip.
fn is_transient(err: &ureq::Error) -> bool {
    !matches!(err, ureq::Error::StatusCode(code) if *code < 500 && *code != 429)
}

/// Pick the city from address components in priority order, falling back to
/// a title-cased version of the raw input; country defaults to `Unknown`.
fn resolve_from_address(address: &Address, raw: &str) -> ResolvedLocation {
    let city = [
        &address.city,
        &address.town,
        &address.village,
        &address.municipality,
    ]
    .into_iter()
    .flatten()
    .next()
    .cloned()
    .unwrap_or_else(|| title_case(raw));
    let country = address
        .country
        .clone()
        .unwrap_or_else(|| "Unknown".to_string());
    ResolvedLocation { city, country }
}

fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}
