use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::util::time::parse_stored_time;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SportType {
    Cricket,
    Football,
}

impl SportType {
    pub const ALL: [SportType; 2] = [SportType::Cricket, SportType::Football];

    pub fn as_str(&self) -> &'static str {
        match self {
            SportType::Cricket => "cricket",
            SportType::Football => "football",
        }
    }
}

impl fmt::Display for SportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cricket" => Ok(SportType::Cricket),
            "football" => Ok(SportType::Football),
            other => Err(format!("unknown sport type {other:?}")),
        }
    }
}

/// End time of a stored match. Rows written by the fetcher are always typed; documents imported
/// from older deployments may carry the timestamp as text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndTime {
    At(NaiveDateTime),
    Raw(String),
}

impl EndTime {
    pub fn resolve(&self) -> Option<NaiveDateTime> {
        match self {
            EndTime::At(dt) => Some(*dt),
            EndTime::Raw(raw) => parse_stored_time(raw),
        }
    }
}

/// Canonical, provider-independent match record. Times are in the reference timezone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub match_id: String,
    pub name: String,
    pub match_type: String,
    pub status: String,
    pub venue: String,
    pub date: String,
    #[serde(rename = "dateTimeGMT")]
    pub date_time_gmt: String,
    pub match_start_time: NaiveDateTime,
    pub match_end_time: Option<EndTime>,
    pub teams: Vec<String>,
    pub sport_type: SportType,
    pub league: String,
    pub season: String,
    pub round: String,
    pub created_at: NaiveDateTime,
    pub fetched_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::models::schema::matches)]
#[diesel(treat_none_as_null = true)]
pub struct MatchRow {
    pub match_id: String,
    pub name: String,
    pub match_type: String,
    pub status: String,
    pub venue: String,
    pub date: String,
    pub date_time_gmt: String,
    pub match_start_time: NaiveDateTime,
    pub match_end_time: Option<NaiveDateTime>,
    pub teams: Vec<String>,
    pub sport_type: String,
    pub league: String,
    pub season: String,
    pub round: String,
    pub created_at: NaiveDateTime,
    pub fetched_at: NaiveDateTime,
}

impl From<&Match> for MatchRow {
    fn from(m: &Match) -> Self {
        MatchRow {
            match_id: m.match_id.clone(),
            name: m.name.clone(),
            match_type: m.match_type.clone(),
            status: m.status.clone(),
            venue: m.venue.clone(),
            date: m.date.clone(),
            date_time_gmt: m.date_time_gmt.clone(),
            match_start_time: m.match_start_time,
            match_end_time: m.match_end_time.as_ref().and_then(EndTime::resolve),
            teams: m.teams.clone(),
            sport_type: m.sport_type.as_str().to_string(),
            league: m.league.clone(),
            season: m.season.clone(),
            round: m.round.clone(),
            created_at: m.created_at,
            fetched_at: m.fetched_at,
        }
    }
}

impl TryFrom<MatchRow> for Match {
    type Error = StoreError;

    fn try_from(row: MatchRow) -> Result<Self, Self::Error> {
        let sport_type = row.sport_type.parse().map_err(StoreError::Inconsistent)?;
        Ok(Match {
            match_id: row.match_id,
            name: row.name,
            match_type: row.match_type,
            status: row.status,
            venue: row.venue,
            date: row.date,
            date_time_gmt: row.date_time_gmt,
            match_start_time: row.match_start_time,
            match_end_time: row.match_end_time.map(EndTime::At),
            teams: row.teams,
            sport_type,
            league: row.league,
            season: row.season,
            round: row.round,
            created_at: row.created_at,
            fetched_at: row.fetched_at,
        })
    }
}
