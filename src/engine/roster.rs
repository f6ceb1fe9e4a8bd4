//! Lazily produced 22-player rosters.
//!
//! A [`RosterProvider`] walks an ordered list of [`RosterStrategy`] values and returns the first
//! roster one of them yields. The standard chain is: rows already stored for the match, the
//! provider's announced lineup, then generated text topped up with placeholders. The last step
//! cannot fail, so a standard provider always answers with 11 players per side.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use serde::Serialize;

use crate::engine::roles::{classify, recognise, redistribute, shuffled_template};
use crate::feeds::{Lineup, LineupSource, TextGenerator};
use crate::models::fixture::SportType;
use crate::models::player::{Player, Role};
use crate::repository::store::Store;

pub const PLAYERS_PER_SIDE: usize = 11;
pub const ROSTER_SIZE: usize = 2 * PLAYERS_PER_SIDE;

/// Only this many lines of generated text are read.
const GENERATED_LINE_LIMIT: usize = 22;

#[derive(Debug, Clone)]
pub struct RosterRequest {
    pub match_id: String,
    pub team1: String,
    pub team2: String,
    pub sport: SportType,
    pub match_date: Option<String>,
    pub now: NaiveDateTime,
}

impl RosterRequest {
    fn team(&self, side: usize) -> &str {
        if side == 0 {
            &self.team1
        } else {
            &self.team2
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RosterSource {
    Stored,
    Lineup,
    Generated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Roster {
    pub source: Option<RosterSource>,
    pub players: Vec<Player>,
}

impl Roster {
    /// Whether the players still have to be written to the store.
    pub fn is_fresh(&self) -> bool {
        matches!(self.source, Some(RosterSource::Lineup | RosterSource::Generated))
    }
}

#[async_trait]
pub trait RosterStrategy: Send + Sync {
    fn source(&self) -> RosterSource;
    /// `None` hands the request to the next strategy.
    async fn attempt(&self, request: &RosterRequest) -> Option<Vec<Player>>;
}

/// Try `strategies` in order and return the first roster produced.
pub async fn first_success(
    strategies: &[Box<dyn RosterStrategy>],
    request: &RosterRequest,
) -> Option<(RosterSource, Vec<Player>)> {
    for strategy in strategies {
        if let Some(players) = strategy.attempt(request).await {
            return Some((strategy.source(), players));
        }
        debug!("{:?} roster unavailable for {}", strategy.source(), request.match_id);
    }
    None
}

pub struct RosterProvider {
    strategies: Vec<Box<dyn RosterStrategy>>,
}

impl RosterProvider {
    pub fn new(strategies: Vec<Box<dyn RosterStrategy>>) -> Self {
        RosterProvider { strategies }
    }

    /// Stored rows, then the lineup feed when there is one, then generated text and placeholders.
    pub fn standard(
        store: Arc<dyn Store>,
        lineups: Option<Arc<dyn LineupSource>>,
        generator: Option<Arc<dyn TextGenerator>>,
    ) -> Self {
        let mut strategies: Vec<Box<dyn RosterStrategy>> = vec![Box::new(StoredRoster { store })];
        if let Some(source) = lineups {
            strategies.push(Box::new(LineupRoster { source }));
        }
        strategies.push(Box::new(GeneratedRoster::new(generator)));
        RosterProvider::new(strategies)
    }

    pub async fn provide(&self, request: &RosterRequest) -> Roster {
        match first_success(&self.strategies, request).await {
            Some((source, players)) => {
                info!(
                    "{} players for match {} from {:?}",
                    players.len(),
                    request.match_id,
                    source
                );
                Roster {
                    source: Some(source),
                    players,
                }
            }
            None => {
                warn!("no roster could be produced for match {}", request.match_id);
                Roster {
                    source: None,
                    players: Vec::new(),
                }
            }
        }
    }
}

pub struct StoredRoster {
    store: Arc<dyn Store>,
}

#[async_trait]
impl RosterStrategy for StoredRoster {
    fn source(&self) -> RosterSource {
        RosterSource::Stored
    }

    async fn attempt(&self, request: &RosterRequest) -> Option<Vec<Player>> {
        match self.store.players_for_match(&request.match_id).await {
            Ok(players) if players.len() >= ROSTER_SIZE => Some(players),
            Ok(_) => None,
            Err(e) => {
                warn!("Error reading stored players for {}: {}", request.match_id, e);
                None
            }
        }
    }
}

pub struct LineupRoster {
    source: Arc<dyn LineupSource>,
}

#[async_trait]
impl RosterStrategy for LineupRoster {
    fn source(&self) -> RosterSource {
        RosterSource::Lineup
    }

    async fn attempt(&self, request: &RosterRequest) -> Option<Vec<Player>> {
        match self.source.fetch_lineup(&request.match_id, request.sport).await {
            Ok(Some(lineup)) => players_from_lineup(request, &lineup),
            Ok(None) => None,
            Err(e) => {
                warn!("Error fetching lineup for {}: {}", request.match_id, e);
                None
            }
        }
    }
}

/// `raw`, or `raw_T{side}` when `raw` is taken, with a counter on further collisions.
fn unique_id(seen: &mut HashSet<String>, raw: &str, side: usize) -> String {
    let mut candidate = raw.to_string();
    if seen.contains(&candidate) {
        candidate = format!("{}_T{}", raw, side);
        let mut n = 2;
        while seen.contains(&candidate) {
            candidate = format!("{}_T{}_{}", raw, side, n);
            n += 1;
        }
        debug!("duplicate player id {}, stored as {}", raw, candidate);
    }
    seen.insert(candidate.clone());
    candidate
}

/// Map an announced lineup onto the two sides. `None` unless both sides get eleven players.
pub fn players_from_lineup(request: &RosterRequest, lineup: &Lineup) -> Option<Vec<Player>> {
    let mut seen = HashSet::new();
    let mut sides: [Vec<Player>; 2] = [Vec::new(), Vec::new()];

    for (index, entry) in lineup.entries.iter().enumerate() {
        let side = match entry.side {
            Some(side) if side < 2 => side,
            _ if index < PLAYERS_PER_SIDE => 0,
            _ => 1,
        };
        let player_id = unique_id(&mut seen, &entry.raw_id, side);
        sides[side].push(Player {
            player_id,
            original_player_id: entry.raw_id.clone(),
            name: entry.name.clone(),
            team: request.team(side).to_string(),
            position: entry.position.clone(),
            nationality: entry.nationality.clone(),
            birth_date: entry.birth_date.clone(),
            role: classify(request.sport, &entry.position),
            match_id: request.match_id.clone(),
            sport_type: request.sport,
            created_at: request.now,
        });
    }

    if sides.iter().any(|side| side.len() < PLAYERS_PER_SIDE) {
        debug!(
            "lineup for {} is incomplete ({} + {} players)",
            request.match_id,
            sides[0].len(),
            sides[1].len()
        );
        return None;
    }

    let mut players = Vec::with_capacity(ROSTER_SIZE);
    for mut side in sides {
        side.truncate(PLAYERS_PER_SIDE);
        if request.sport == SportType::Cricket {
            let mut roles: Vec<Role> = side.iter().map(|p| p.role).collect();
            if redistribute(&mut roles) {
                for (player, role) in side.iter_mut().zip(roles) {
                    player.role = role;
                }
            }
        }
        players.extend(side);
    }
    Some(players)
}

pub struct GeneratedRoster {
    generator: Option<Arc<dyn TextGenerator>>,
}

impl GeneratedRoster {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        GeneratedRoster { generator }
    }
}

#[async_trait]
impl RosterStrategy for GeneratedRoster {
    fn source(&self) -> RosterSource {
        RosterSource::Generated
    }

    async fn attempt(&self, request: &RosterRequest) -> Option<Vec<Player>> {
        let mut named: [Vec<GeneratedPlayer>; 2] = [Vec::new(), Vec::new()];
        if let Some(generator) = &self.generator {
            match generator.generate(&lineup_prompt(request)).await {
                Ok(text) => named = parse_generated(&text, request),
                Err(e) => warn!("Error generating players for {}: {}", request.match_id, e),
            }
        }
        Some(fill_roster(request, named))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedPlayer {
    pub name: String,
    pub role: Option<Role>,
}

pub fn lineup_prompt(request: &RosterRequest) -> String {
    let on_date = request
        .match_date
        .as_deref()
        .map(|d| format!(" on {}", d))
        .unwrap_or_default();
    let (t1, t2) = (&request.team1, &request.team2);
    match request.sport {
        SportType::Football => format!(
            "List exactly 11 starting players (NO substitutes) from {t1} and 11 starting players (NO substitutes) from {t2} football teams for their match{on_date}.\n\n\
             IMPORTANT:\n\
             - Provide the starting XI lineup for the match{on_date} if available\n\
             - If lineup for this specific match is not available, use the starting XI from their most recent previous match\n\
             - DO NOT include substitute players, only the 11 starting players\n\
             - Format each line as: TeamName|PlayerName|Position\n\
             - Position must be one of: Goalkeeper, Defender, Midfielder, Forward\n\n\
             Example:\n{t1}|Player Name|Goalkeeper\n\n\
             Keep response minimal, exactly 22 lines total (11 per team)."
        ),
        SportType::Cricket => format!(
            "List exactly 11 players from {t1} and 11 players from {t2} cricket teams for their match{on_date}.\n\n\
             IMPORTANT:\n\
             - Provide the playing XI for the match{on_date} if available\n\
             - If lineup for this specific match is not available, use the playing XI from their most recent previous match\n\
             - Format each line as: TeamName|PlayerName|Role\n\
             - Role must be one of: Batsman, Bowler, All-Rounder, Wicket-Keeper\n\n\
             Example:\n{t1}|Player Name|Batsman\n\n\
             Keep response minimal, exactly 22 lines total (11 per team)."
        ),
    }
}

fn matches_team(written: &str, team: &str) -> bool {
    let written = written.to_lowercase();
    let team = team.to_lowercase();
    team.contains(&written) || written.contains(&team)
}

/// Read `Team|Name|Role` lines from generated text, grouped by side.
pub fn parse_generated(text: &str, request: &RosterRequest) -> [Vec<GeneratedPlayer>; 2] {
    let mut sides: [Vec<GeneratedPlayer>; 2] = [Vec::new(), Vec::new()];
    for line in text.trim().lines().take(GENERATED_LINE_LIMIT) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('*') {
            continue;
        }
        let line = line
            .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
            .trim()
            .trim_start_matches(|c: char| c == '*' || c == '-' || c == '•')
            .trim();

        let fields: Vec<&str> = line.split('|').map(str::trim).collect();
        if fields.len() < 3 {
            continue;
        }
        let (team, name, role) = (fields[0], fields[1], fields[2]);
        if team.is_empty() || name.is_empty() {
            continue;
        }
        let Some(side) = (0..2).find(|side| matches_team(team, request.team(*side))) else {
            debug!("generated line names an unknown team: {}", team);
            continue;
        };
        sides[side].push(GeneratedPlayer {
            name: name.to_string(),
            role: recognise(request.sport, role),
        });
    }
    sides
}

/// Eleven players per side: generated names where available, `Player {n}` otherwise. Roles not
/// recovered from the text come from a per-side shuffled template.
pub fn fill_roster(request: &RosterRequest, named: [Vec<GeneratedPlayer>; 2]) -> Vec<Player> {
    let mut players = Vec::with_capacity(ROSTER_SIZE);
    for (side, generated) in named.iter().enumerate() {
        let template = shuffled_template(request.sport);
        for (slot, fallback_role) in template.into_iter().enumerate().take(PLAYERS_PER_SIDE) {
            let (name, role) = match generated.get(slot) {
                Some(p) => (p.name.clone(), p.role.unwrap_or(fallback_role)),
                None => (format!("Player {}", slot + 1), fallback_role),
            };
            let player_id = format!("{}_T{}_P{}", request.match_id, side, slot);
            players.push(Player {
                original_player_id: player_id.clone(),
                player_id,
                name,
                team: request.team(side).to_string(),
                position: role.as_str().to_string(),
                nationality: String::new(),
                birth_date: String::new(),
                role,
                match_id: request.match_id.clone(),
                sport_type: request.sport,
                created_at: request.now,
            });
        }
    }
    players
}
