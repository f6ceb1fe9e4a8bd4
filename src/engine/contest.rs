use chrono::NaiveDateTime;
use log::{debug, info};

use crate::models::contest::{Contest, CONTEST_STATUS_OPEN};
use crate::models::fixture::{Match, SportType};
use crate::repository::store::{Result, Store};
use crate::util::random::choose;

/// One tier of the contest catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContestTemplate {
    pub badge: &'static str,
    pub entry_fee: i32,
    pub prize_pool: i32,
    pub max_spots: i32,
}

pub const CONTEST_TEMPLATES: [ContestTemplate; 4] = [
    ContestTemplate {
        badge: "Featured",
        entry_fee: 49,
        prize_pool: 1_000_000,
        max_spots: 10_000,
    },
    ContestTemplate {
        badge: "Mega",
        entry_fee: 99,
        prize_pool: 2_500_000,
        max_spots: 15_000,
    },
    ContestTemplate {
        badge: "Premium",
        entry_fee: 149,
        prize_pool: 5_000_000,
        max_spots: 20_000,
    },
    ContestTemplate {
        badge: "Hot",
        entry_fee: 29,
        prize_pool: 500_000,
        max_spots: 8_000,
    },
];

/// What a contest is created from: the match identity plus whatever metadata the caller has.
#[derive(Debug, Clone)]
pub struct ContestSeed {
    pub match_id: String,
    pub match_name: String,
    pub sport_type: SportType,
    pub details: Option<Match>,
}

impl From<&Match> for ContestSeed {
    fn from(m: &Match) -> Self {
        ContestSeed {
            match_id: m.match_id.clone(),
            match_name: m.name.clone(),
            sport_type: m.sport_type,
            details: Some(m.clone()),
        }
    }
}

/// Build a contest from `template`, copying match metadata as it is at this instant.
pub fn build_contest(seed: &ContestSeed, template: &ContestTemplate, now: NaiveDateTime) -> Contest {
    let details = seed.details.as_ref();
    Contest {
        match_id: seed.match_id.clone(),
        match_name: seed.match_name.clone(),
        title: seed.match_name.clone(),
        badge: template.badge.to_string(),
        entry_fee: template.entry_fee,
        prize_pool: template.prize_pool,
        max_spots: template.max_spots,
        filled_spots: 0,
        sport_type: seed.sport_type,
        status: CONTEST_STATUS_OPEN.to_string(),
        match_date: details.map(|m| m.date.clone()),
        match_start_time: details.map(|m| m.match_start_time),
        match_end_time: details.and_then(|m| m.match_end_time.as_ref()).and_then(|e| e.resolve()),
        venue: details.map(|m| m.venue.clone()),
        teams: details.map(|m| m.teams.clone()).unwrap_or_default(),
        league: details.map(|m| m.league.clone()),
        created_at: now,
    }
}

/// Create the match's contest unless one already exists. Returns `true` when a row was inserted.
///
/// When the seed carries no match metadata the stored match is read to fill it in.
pub async fn create_if_absent(
    store: &dyn Store,
    mut seed: ContestSeed,
    now: NaiveDateTime,
) -> Result<bool> {
    if store.find_contest(&seed.match_id).await?.is_some() {
        debug!("contest for {} already exists", seed.match_id);
        return Ok(false);
    }
    if seed.details.is_none() {
        seed.details = store.find_match(&seed.match_id).await?;
    }
    let template = choose(&CONTEST_TEMPLATES).unwrap_or(CONTEST_TEMPLATES[0]);
    let contest = build_contest(&seed, &template, now);
    store.insert_contest(&contest).await?;
    info!("created {} contest for {}", template.badge, seed.match_name);
    Ok(true)
}
