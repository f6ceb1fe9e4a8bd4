use chrono::NaiveDateTime;
use diesel::{AsChangeset, Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::fixture::SportType;

pub const CONTEST_STATUS_OPEN: &str = "open";

/// One fantasy entry pool per match. Match metadata is copied in at creation time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contest {
    pub match_id: String,
    pub match_name: String,
    pub title: String,
    pub badge: String,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_spots: i32,
    pub filled_spots: i32,
    pub sport_type: SportType,
    pub status: String,
    pub match_date: Option<String>,
    pub match_start_time: Option<NaiveDateTime>,
    pub match_end_time: Option<NaiveDateTime>,
    pub venue: Option<String>,
    pub teams: Vec<String>,
    pub league: Option<String>,
    pub created_at: NaiveDateTime,
}

impl Contest {
    pub fn is_full(&self) -> bool {
        self.filled_spots >= self.max_spots
    }
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = crate::models::schema::contests)]
#[diesel(treat_none_as_null = true)]
pub struct ContestRow {
    pub match_id: String,
    pub match_name: String,
    pub title: String,
    pub badge: String,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_spots: i32,
    pub filled_spots: i32,
    pub sport_type: String,
    pub status: String,
    pub match_date: Option<String>,
    pub match_start_time: Option<NaiveDateTime>,
    pub match_end_time: Option<NaiveDateTime>,
    pub venue: Option<String>,
    pub teams: Vec<String>,
    pub league: Option<String>,
    pub created_at: NaiveDateTime,
}

impl From<&Contest> for ContestRow {
    fn from(c: &Contest) -> Self {
        ContestRow {
            match_id: c.match_id.clone(),
            match_name: c.match_name.clone(),
            title: c.title.clone(),
            badge: c.badge.clone(),
            entry_fee: c.entry_fee,
            prize_pool: c.prize_pool,
            max_spots: c.max_spots,
            filled_spots: c.filled_spots,
            sport_type: c.sport_type.as_str().to_string(),
            status: c.status.clone(),
            match_date: c.match_date.clone(),
            match_start_time: c.match_start_time,
            match_end_time: c.match_end_time,
            venue: c.venue.clone(),
            teams: c.teams.clone(),
            league: c.league.clone(),
            created_at: c.created_at,
        }
    }
}

impl TryFrom<ContestRow> for Contest {
    type Error = StoreError;

    fn try_from(row: ContestRow) -> Result<Self, Self::Error> {
        let sport_type = row.sport_type.parse().map_err(StoreError::Inconsistent)?;
        Ok(Contest {
            match_id: row.match_id,
            match_name: row.match_name,
            title: row.title,
            badge: row.badge,
            entry_fee: row.entry_fee,
            prize_pool: row.prize_pool,
            max_spots: row.max_spots,
            filled_spots: row.filled_spots,
            sport_type,
            status: row.status,
            match_date: row.match_date,
            match_start_time: row.match_start_time,
            match_end_time: row.match_end_time,
            venue: row.venue,
            teams: row.teams,
            league: row.league,
            created_at: row.created_at,
        })
    }
}
