use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::fixtures::{FixtureDraft, FixtureWindow};
use crate::error::FeedError;
use crate::feeds::{decode_each, get_text, id_string, non_empty, FixtureSource};
use crate::models::fixture::{Match, SportType};

const CRICSCORE_URL: &str = "https://api.cricapi.com/v1/cricScore";

#[derive(Debug, Deserialize)]
struct CricScoreEnvelope {
    data: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CricScoreFixture {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default, rename = "dateTimeGMT")]
    date_time_gmt: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    match_started: Option<bool>,
    #[serde(default)]
    match_ended: Option<bool>,
    #[serde(default)]
    match_type: Option<String>,
    #[serde(default)]
    t1: Option<String>,
    #[serde(default)]
    t2: Option<String>,
    #[serde(default)]
    venue: Option<String>,
    #[serde(default)]
    series: Option<String>,
}

fn is_upcoming_status(status: &str) -> bool {
    let status = status.trim().to_ascii_lowercase();
    status.is_empty()
        || status.contains("not started")
        || status.contains("starts at")
        || matches!(status.as_str(), "fixture" | "upcoming" | "scheduled")
}

/// Drop a trailing bracketed abbreviation: `"India [IND]"` becomes `"India"`.
pub fn clean_team_name(raw: &str) -> String {
    raw.split('[').next().unwrap_or(raw).trim().to_string()
}

fn draft(fixture: CricScoreFixture) -> Option<FixtureDraft> {
    if fixture.match_started.unwrap_or(false) || fixture.match_ended.unwrap_or(false) {
        return None;
    }
    if !is_upcoming_status(fixture.status.as_deref().unwrap_or("")) {
        return None;
    }
    let date_time_gmt = non_empty(fixture.date_time_gmt)?;
    let start_utc = NaiveDateTime::parse_from_str(&date_time_gmt, "%Y-%m-%dT%H:%M:%S").ok()?;
    let match_id = fixture.id.as_ref().and_then(id_string)?;

    let match_type = non_empty(fixture.match_type);
    let league = non_empty(fixture.series)
        .or_else(|| match_type.clone())
        .unwrap_or_else(|| "Cricket Match".to_string());
    Some(FixtureDraft {
        match_id,
        team1: clean_team_name(fixture.t1.as_deref().unwrap_or("Team A")),
        team2: clean_team_name(fixture.t2.as_deref().unwrap_or("Team B")),
        match_type: match_type.unwrap_or_else(|| "T20".to_string()).to_uppercase(),
        venue: non_empty(fixture.venue).unwrap_or_else(|| "TBD".to_string()),
        league,
        start_utc,
        date_time_gmt,
        ..Default::default()
    })
}

/// Map a `cricScore` response body to canonical matches inside `window`, capped.
pub fn normalize_cricscore(body: &str, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
    let envelope: CricScoreEnvelope = serde_json::from_str(body)?;
    let fixtures = envelope.data.ok_or(FeedError::MissingField("data"))?;

    let mut matches = Vec::new();
    for fixture in decode_each::<CricScoreFixture>(fixtures, "cricScore fixture") {
        let Some(draft) = draft(fixture) else {
            continue;
        };
        let match_id = draft.match_id.clone();
        match draft.into_match(SportType::Cricket, window) {
            Some(m) => matches.push(m),
            None => debug!("cricScore fixture {} is outside the window", match_id),
        }
        if matches.len() >= window.max_matches {
            break;
        }
    }
    Ok(matches)
}

pub struct CricApiClient {
    client: reqwest::Client,
    api_key: String,
}

impl CricApiClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        CricApiClient { client, api_key }
    }
}

#[async_trait]
impl FixtureSource for CricApiClient {
    fn name(&self) -> &'static str {
        "cricapi"
    }

    fn sport(&self) -> SportType {
        SportType::Cricket
    }

    async fn fetch_fixtures(&self, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
        if self.api_key.is_empty() {
            return Err(FeedError::Disabled("CRICAPI_KEY"));
        }
        let body = get_text(&self.client, CRICSCORE_URL, &[("apikey", self.api_key.as_str())]).await?;
        normalize_cricscore(&body, window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_bracketed_abbreviation() {
        assert_eq!(clean_team_name("Mumbai Indians [MI]"), "Mumbai Indians");
        assert_eq!(clean_team_name("Nepal"), "Nepal");
    }

    #[test]
    fn upcoming_statuses() {
        assert!(is_upcoming_status(""));
        assert!(is_upcoming_status("Match not started"));
        assert!(is_upcoming_status("Match starts at Mar 02, 08:00 GMT"));
        assert!(is_upcoming_status("Fixture"));
        assert!(!is_upcoming_status("India won by 5 wkts"));
    }
}
