use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use diesel::{Insertable, Queryable, Selectable};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::fixture::SportType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Batsman,
    Bowler,
    #[serde(rename = "All-Rounder")]
    AllRounder,
    #[serde(rename = "Wicket-Keeper")]
    WicketKeeper,
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Batsman => "Batsman",
            Role::Bowler => "Bowler",
            Role::AllRounder => "All-Rounder",
            Role::WicketKeeper => "Wicket-Keeper",
            Role::Goalkeeper => "Goalkeeper",
            Role::Defender => "Defender",
            Role::Midfielder => "Midfielder",
            Role::Forward => "Forward",
        }
    }

    pub fn sport(&self) -> SportType {
        match self {
            Role::Batsman | Role::Bowler | Role::AllRounder | Role::WicketKeeper => {
                SportType::Cricket
            }
            Role::Goalkeeper | Role::Defender | Role::Midfielder | Role::Forward => {
                SportType::Football
            }
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphabetic())
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "batsman" | "batter" => Ok(Role::Batsman),
            "bowler" => Ok(Role::Bowler),
            "allrounder" => Ok(Role::AllRounder),
            "wicketkeeper" => Ok(Role::WicketKeeper),
            "goalkeeper" => Ok(Role::Goalkeeper),
            "defender" => Ok(Role::Defender),
            "midfielder" => Ok(Role::Midfielder),
            "forward" => Ok(Role::Forward),
            _ => Err(format!("unknown role {s:?}")),
        }
    }
}

/// One roster slot for a match, keyed by `(match_id, player_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub player_id: String,
    pub original_player_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub nationality: String,
    pub birth_date: String,
    pub role: Role,
    pub match_id: String,
    pub sport_type: SportType,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crate::models::schema::players)]
pub struct PlayerRow {
    pub match_id: String,
    pub player_id: String,
    pub original_player_id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub nationality: String,
    pub birth_date: String,
    pub role: String,
    pub sport_type: String,
    pub created_at: NaiveDateTime,
}

impl From<&Player> for PlayerRow {
    fn from(p: &Player) -> Self {
        PlayerRow {
            match_id: p.match_id.clone(),
            player_id: p.player_id.clone(),
            original_player_id: p.original_player_id.clone(),
            name: p.name.clone(),
            team: p.team.clone(),
            position: p.position.clone(),
            nationality: p.nationality.clone(),
            birth_date: p.birth_date.clone(),
            role: p.role.as_str().to_string(),
            sport_type: p.sport_type.as_str().to_string(),
            created_at: p.created_at,
        }
    }
}

impl TryFrom<PlayerRow> for Player {
    type Error = StoreError;

    fn try_from(row: PlayerRow) -> Result<Self, Self::Error> {
        let role = row.role.parse().map_err(StoreError::Inconsistent)?;
        let sport_type = row.sport_type.parse().map_err(StoreError::Inconsistent)?;
        Ok(Player {
            player_id: row.player_id,
            original_player_id: row.original_player_id,
            name: row.name,
            team: row.team,
            position: row.position,
            nationality: row.nationality,
            birth_date: row.birth_date,
            role,
            match_id: row.match_id,
            sport_type,
            created_at: row.created_at,
        })
    }
}
