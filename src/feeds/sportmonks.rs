use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDateTime};
use log::debug;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::fixtures::{FixtureDraft, FixtureWindow};
use crate::error::FeedError;
use crate::feeds::{
    decode_each, get_text, id_string, nested_named, non_empty, FixtureSource, Lineup, LineupEntry,
    LineupSource, Named, Nested,
};
use crate::models::fixture::{Match, SportType};

const CRICKET_BASE_URL: &str = "https://cricket.sportmonks.com/api/v2.0";
const SOCCER_BASE_URL: &str = "https://soccer.sportmonks.com/api/v2.0";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct FixtureRecord {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    starting_at: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    round: Option<String>,
    #[serde(default)]
    season_id: Option<Value>,
    #[serde(default)]
    localteam: Option<Nested<Named>>,
    #[serde(default)]
    visitorteam: Option<Nested<Named>>,
    #[serde(default)]
    venue: Option<Nested<Named>>,
    #[serde(default)]
    league: Option<Nested<Named>>,
}

fn parse_starting_at(raw: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_utc())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

fn fixture_draft(record: FixtureRecord) -> Option<FixtureDraft> {
    let status = record.status.as_deref().unwrap_or("").trim();
    if !(status.is_empty() || status.eq_ignore_ascii_case("NS")) {
        return None;
    }
    let match_id = record.id.as_ref().and_then(id_string)?;
    let date_time_gmt = non_empty(record.starting_at)?;
    let start_utc = parse_starting_at(&date_time_gmt)?;

    let team1 = non_empty(nested_named(record.localteam).name).unwrap_or_else(|| "Team A".into());
    let team2 = non_empty(nested_named(record.visitorteam).name).unwrap_or_else(|| "Team B".into());
    let league = non_empty(nested_named(record.league).name).unwrap_or_else(|| "Cricket Match".into());
    Some(FixtureDraft {
        match_id,
        team1,
        team2,
        match_type: non_empty(record.kind).unwrap_or_else(|| "T20".into()).to_uppercase(),
        venue: non_empty(nested_named(record.venue).name).unwrap_or_else(|| "TBD".into()),
        league,
        season: record.season_id.as_ref().and_then(id_string).unwrap_or_default(),
        round: record.round.unwrap_or_default(),
        start_utc,
        date_time_gmt,
    })
}

/// Map a SportMonks cricket `fixtures` response to canonical matches inside `window`, capped.
pub fn normalize_fixtures(body: &str, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
    let envelope: Envelope<Vec<Value>> = serde_json::from_str(body)?;
    let records = envelope.data.ok_or(FeedError::MissingField("data"))?;

    let mut matches = Vec::new();
    for record in decode_each::<FixtureRecord>(records, "sportmonks fixture") {
        if let Some(m) = fixture_draft(record).and_then(|d| d.into_match(SportType::Cricket, window)) {
            matches.push(m);
        }
        if matches.len() >= window.max_matches {
            break;
        }
    }
    Ok(matches)
}

#[derive(Debug, Deserialize)]
struct CricketLineupFixture {
    #[serde(default)]
    lineup: Option<Vec<Value>>,
    #[serde(default)]
    localteam: Option<Nested<Named>>,
    #[serde(default)]
    visitorteam: Option<Nested<Named>>,
}

#[derive(Debug, Deserialize)]
struct CricketLineupItem {
    #[serde(default)]
    team_id: Option<Value>,
    #[serde(default)]
    player: Option<CricketPlayer>,
}

#[derive(Debug, Deserialize)]
struct CricketPlayer {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    fullname: Option<String>,
    #[serde(default)]
    firstname: Option<String>,
    #[serde(default)]
    lastname: Option<String>,
    #[serde(default)]
    position: Option<Named>,
    #[serde(default)]
    country: Option<Named>,
    #[serde(default)]
    dateofbirth: Option<String>,
}

impl CricketPlayer {
    fn display_name(&self) -> Option<String> {
        non_empty(self.fullname.clone()).or_else(|| {
            let joined = format!(
                "{} {}",
                self.firstname.as_deref().unwrap_or(""),
                self.lastname.as_deref().unwrap_or("")
            );
            non_empty(Some(joined.trim().to_string()))
        })
    }
}

/// Which side a lineup entry belongs to, by comparing its team id with the fixture's teams.
fn side_of(team_id: Option<&Value>, local: &Named, visitor: &Named) -> Option<usize> {
    let team_id = team_id.and_then(id_string)?;
    if local.id.as_ref().and_then(id_string).as_deref() == Some(team_id.as_str()) {
        Some(0)
    } else if visitor.id.as_ref().and_then(id_string).as_deref() == Some(team_id.as_str()) {
        Some(1)
    } else {
        None
    }
}

/// `Ok(None)` when the fixture has no lineup, or a lineup without any player details (the usual
/// state before the toss).
pub fn normalize_cricket_lineup(body: &str) -> Result<Option<Lineup>, FeedError> {
    let envelope: Envelope<CricketLineupFixture> = serde_json::from_str(body)?;
    let fixture = envelope.data.ok_or(FeedError::MissingField("data"))?;
    let local = nested_named(fixture.localteam);
    let visitor = nested_named(fixture.visitorteam);

    let items = decode_each::<CricketLineupItem>(fixture.lineup.unwrap_or_default(), "lineup entry");
    let entries: Vec<LineupEntry> = items
        .into_iter()
        .filter_map(|item| {
            let player = item.player?;
            let raw_id = player.id.as_ref().and_then(id_string)?;
            let name = player.display_name()?;
            Some(LineupEntry {
                raw_id,
                name,
                side: side_of(item.team_id.as_ref(), &local, &visitor),
                position: player.position.and_then(|p| p.name).unwrap_or_default(),
                nationality: player.country.and_then(|c| c.name).unwrap_or_default(),
                birth_date: player.dateofbirth.unwrap_or_default(),
            })
        })
        .collect();

    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(Lineup { entries }))
}

#[derive(Debug, Deserialize)]
struct FootballLineupFixture {
    #[serde(default)]
    lineup: Option<Nested<Vec<Value>>>,
    #[serde(default, rename = "localTeam")]
    local_team: Option<Nested<Named>>,
    #[serde(default, rename = "visitorTeam")]
    visitor_team: Option<Nested<Named>>,
}

#[derive(Debug, Deserialize)]
struct FootballLineupItem {
    #[serde(default)]
    team_id: Option<Value>,
    #[serde(default)]
    position: Option<String>,
    #[serde(default)]
    player: Option<FootballPlayer>,
}

#[derive(Debug, Deserialize)]
struct FootballPlayer {
    #[serde(default)]
    player_id: Option<Value>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    fullname: Option<String>,
    #[serde(default)]
    common_name: Option<String>,
    #[serde(default)]
    nationality: Option<String>,
    #[serde(default)]
    birthdate: Option<String>,
    #[serde(default)]
    position: Option<Nested<Named>>,
}

pub fn normalize_football_lineup(body: &str) -> Result<Option<Lineup>, FeedError> {
    let envelope: Envelope<FootballLineupFixture> = serde_json::from_str(body)?;
    let fixture = envelope.data.ok_or(FeedError::MissingField("data"))?;
    let local = nested_named(fixture.local_team);
    let visitor = nested_named(fixture.visitor_team);

    let raw = fixture.lineup.map(Nested::into_inner).unwrap_or_default();
    let entries: Vec<LineupEntry> = decode_each::<FootballLineupItem>(raw, "lineup entry")
        .into_iter()
        .filter_map(|item| {
            let player = item.player?;
            let raw_id = player
                .player_id
                .as_ref()
                .and_then(id_string)
                .or_else(|| player.id.as_ref().and_then(id_string))?;
            let name = non_empty(player.display_name)
                .or_else(|| non_empty(player.fullname))
                .or_else(|| non_empty(player.common_name))?;
            let position = non_empty(item.position)
                .or_else(|| nested_named(player.position).name)
                .unwrap_or_default();
            Some(LineupEntry {
                raw_id,
                name,
                side: side_of(item.team_id.as_ref(), &local, &visitor),
                position,
                nationality: player.nationality.unwrap_or_default(),
                birth_date: player.birthdate.unwrap_or_default(),
            })
        })
        .collect();

    if entries.is_empty() {
        return Ok(None);
    }
    Ok(Some(Lineup { entries }))
}

/// SportMonks cricket fixtures plus cricket and soccer lineups, sharing one API token.
pub struct SportMonksClient {
    client: reqwest::Client,
    api_token: String,
}

impl SportMonksClient {
    pub fn new(client: reqwest::Client, api_token: String) -> Self {
        SportMonksClient { client, api_token }
    }

    fn ensure_enabled(&self) -> Result<(), FeedError> {
        if self.api_token.is_empty() {
            return Err(FeedError::Disabled("SPORTMONKS_API_KEY"));
        }
        Ok(())
    }
}

#[async_trait]
impl FixtureSource for SportMonksClient {
    fn name(&self) -> &'static str {
        "sportmonks"
    }

    fn sport(&self) -> SportType {
        SportType::Cricket
    }

    async fn fetch_fixtures(&self, window: &FixtureWindow) -> Result<Vec<Match>, FeedError> {
        self.ensure_enabled()?;
        let last_day = window.today + Duration::days(window.lookahead_days);
        let between = format!("{},{}", window.today, last_day);
        let url = format!("{}/fixtures", CRICKET_BASE_URL);
        let body = get_text(
            &self.client,
            &url,
            &[
                ("api_token", self.api_token.as_str()),
                ("include", "localteam,visitorteam,venue,league"),
                ("filter[starts_between]", between.as_str()),
                ("sort", "starting_at"),
            ],
        )
        .await?;
        normalize_fixtures(&body, window)
    }
}

#[async_trait]
impl LineupSource for SportMonksClient {
    async fn fetch_lineup(
        &self,
        match_id: &str,
        sport: SportType,
    ) -> Result<Option<Lineup>, FeedError> {
        self.ensure_enabled()?;
        let lineup = match sport {
            SportType::Cricket => {
                let url = format!("{}/fixtures/{}", CRICKET_BASE_URL, match_id);
                let query = [
                    ("api_token", self.api_token.as_str()),
                    ("include", "lineup,localteam,visitorteam"),
                ];
                normalize_cricket_lineup(&get_text(&self.client, &url, &query).await?)?
            }
            SportType::Football => {
                let url = format!("{}/fixtures/{}", SOCCER_BASE_URL, match_id);
                let query = [
                    ("api_token", self.api_token.as_str()),
                    ("include", "lineup,localTeam,visitorTeam"),
                ];
                normalize_football_lineup(&get_text(&self.client, &url, &query).await?)?
            }
        };
        debug!(
            "sportmonks lineup for {}: {} entries",
            match_id,
            lineup.as_ref().map_or(0, |l| l.entries.len())
        );
        Ok(lineup)
    }
}
