use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, warn};
use serde::Deserialize;
use serde_json::Value;

use crate::engine::fixtures::{FixtureDraft, FixtureWindow};
use crate::error::FeedError;
use crate::feeds::{decode_each, get_text, id_string, non_empty, FixtureSource};
use crate::models::fixture::{Match, SportType};

/// Premier League, La Liga, Bundesliga, Serie A, Ligue 1; queried in this order.
pub const DEFAULT_LEAGUES: [&str; 5] = ["4328", "4335", "4331", "4332", "4334"];

const DEFAULT_KICKOFF: &str = "15:00:00";

#[derive(Debug, Deserialize)]
struct EventsEnvelope {
    events: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Event {
    #[serde(default)]
    id_event: Option<Value>,
    #[serde(default)]
    date_event: Option<String>,
    #[serde(default)]
    str_time: Option<String>,
    #[serde(default)]
    str_home_team: Option<String>,
    #[serde(default)]
    str_away_team: Option<String>,
    #[serde(default)]
    str_venue: Option<String>,
    #[serde(default)]
    str_league: Option<String>,
    #[serde(default)]
    int_round: Option<Value>,
    #[serde(default)]
    str_season: Option<String>,
}

/// `strTime` is sometimes `"19:45:00+00:00"`; keep the clock part only.
fn kickoff_time(raw: Option<String>) -> String {
    let raw = non_empty(raw).unwrap_or_else(|| DEFAULT_KICKOFF.to_string());
    raw.split(['+', 'Z']).next().unwrap_or(DEFAULT_KICKOFF).trim().to_string()
}

fn draft(event: Event) -> Option<FixtureDraft> {
    let date = non_empty(event.date_event)?;
    let time = kickoff_time(event.str_time);
    let start_utc = NaiveDateTime::parse_from_str(&format!("{} {}", date, time), "%Y-%m-%d %H:%M:%S").ok()?;
    let match_id = event.id_event.as_ref().and_then(id_string)?;

    let league = non_empty(event.str_league).unwrap_or_else(|| "Football League".to_string());
    Some(FixtureDraft {
        match_id,
        team1: non_empty(event.str_home_team).unwrap_or_else(|| "Team A".to_string()),
        team2: non_empty(event.str_away_team).unwrap_or_else(|| "Team B".to_string()),
        match_type: league.clone(),
        venue: non_empty(event.str_venue).unwrap_or_else(|| "TBD".to_string()),
        league,
        season: event.str_season.unwrap_or_default(),
        round: event.int_round.as_ref().and_then(id_string).unwrap_or_default(),
        start_utc,
        date_time_gmt: format!("{}T{}", date, time),
    })
}

/// Map one league's `eventsnextleague` response to at most `limit` canonical matches.
pub fn normalize_events(
    body: &str,
    window: &FixtureWindow,
    limit: usize,
) -> Result<Vec<Match>, FeedError> {
    let envelope: EventsEnvelope = serde_json::from_str(body)?;
    let events = envelope.events.ok_or(FeedError::MissingField("events"))?;

    let mut matches = Vec::new();
    for event in decode_each::<Event>(events, "sportsdb event") {
        if matches.len() >= limit {
            break;
        }
        if let Some(m) = draft(event).and_then(|d| d.into_match(SportType::Football, window)) {
            matches.push(m);
        }
    }
    Ok(matches)
}

pub struct SportsDbClient {
    client: reqwest::Client,
    api_key: String,
    leagues: Vec<String>,
}

impl SportsDbClient {
    pub fn new(client: reqwest::Client, api_key: String) -> Self {
        SportsDbClient {
            client,
            api_key,
            leagues: DEFAULT_LEAGUES.iter().map(|l| l.to_string()).collect(),
        }
    }

    async fn league_events(
        &self,
        league: &str,
        window: &FixtureWindow,
        limit: usize,
    ) -> Result<Vec<Match>, FeedError> {
        let url = format!(
            "https://www.thesportsdb.com/api/v1/json/{}/eventsnextleague.php",
            self.api_key
        );
        let body = get_text(&self.client, &url, &[("id", league)]).await?;
        normalize_events(&body, window, limit)
    }
}

#[async_trait]
impl FixtureSource for SportsDbClient {
    fn name(&self) -> &'static str {
        "thesportsdb"
    }

    fn sport(&self) -> SportType {
        SportType::Football
    }

    /// Leagues are walked in order until the cap is reached; a failing league is skipped.
    async fn fetch_fixtures(&self, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
        let mut matches = Vec::new();
        for league in &self.leagues {
            let remaining = window.max_matches.saturating_sub(matches.len());
            if remaining == 0 {
                break;
            }
            match self.league_events(league, window, remaining).await {
                Ok(found) => {
                    debug!("league {} contributed {} fixtures", league, found.len());
                    matches.extend(found);
                }
                Err(e) => warn!("skipping league {}: {}", league, e),
            }
        }
        Ok(matches)
    }
}
