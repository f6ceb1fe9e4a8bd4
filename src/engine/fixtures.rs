use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use futures::future::join_all;
use log::{debug, info, warn};

use crate::feeds::FixtureSource;
use crate::models::fixture::{EndTime, Match, SportType};
use crate::util::time::{utc_to_reference, DATE_FORMAT};

pub const MATCH_STATUS_UPCOMING: &str = "upcoming";

/// Estimated playing time. Providers give no reliable end time for unplayed fixtures, so the end
/// of every stored match is its start plus this.
pub fn estimated_duration(sport: SportType, match_type: &str) -> Duration {
    match sport {
        SportType::Football => Duration::hours(2),
        SportType::Cricket => {
            let format = match_type.to_ascii_lowercase();
            if format.contains("test") {
                Duration::hours(6)
            } else if format.contains("odi") {
                Duration::hours(8)
            } else {
                Duration::hours(3) + Duration::minutes(30)
            }
        }
    }
}

/// The upcoming-fixture window a sync run accepts: start dates in `[today, today + days]`.
#[derive(Debug, Clone)]
pub struct FixtureWindow {
    pub today: NaiveDate,
    pub lookahead_days: i64,
    pub max_matches: usize,
    pub fetched_at: NaiveDateTime,
}

impl FixtureWindow {
    pub fn new(now: NaiveDateTime, lookahead_days: i64, max_matches: usize) -> Self {
        FixtureWindow {
            today: now.date(),
            lookahead_days,
            max_matches,
            fetched_at: now,
        }
    }

    pub fn contains(&self, start: NaiveDateTime) -> bool {
        let date = start.date();
        date >= self.today && date <= self.today + Duration::days(self.lookahead_days)
    }
}

/// Provider-neutral fixture as an adapter reads it, before times are normalised.
#[derive(Debug, Clone, Default)]
pub struct FixtureDraft {
    pub match_id: String,
    pub team1: String,
    pub team2: String,
    pub match_type: String,
    pub venue: String,
    pub league: String,
    pub season: String,
    pub round: String,
    pub start_utc: NaiveDateTime,
    pub date_time_gmt: String,
}

impl FixtureDraft {
    /// Build the canonical record, or `None` when the fixture starts outside the window.
    pub fn into_match(self, sport: SportType, window: &FixtureWindow) -> Option<Match> {
        let start = utc_to_reference(self.start_utc);
        if !window.contains(start) {
            return None;
        }
        let end = start + estimated_duration(sport, &self.match_type);
        Some(Match {
            name: format!("{} vs {}", self.team1, self.team2),
            match_id: self.match_id,
            match_type: self.match_type,
            status: MATCH_STATUS_UPCOMING.to_string(),
            venue: self.venue,
            date: start.format(DATE_FORMAT).to_string(),
            date_time_gmt: self.date_time_gmt,
            match_start_time: start,
            match_end_time: Some(EndTime::At(end)),
            teams: vec![self.team1, self.team2],
            sport_type: sport,
            league: self.league,
            season: self.season,
            round: self.round,
            created_at: window.fetched_at,
            fetched_at: window.fetched_at,
        })
    }
}

/// Pulls upcoming fixtures from every configured source. Never fails: a source error degrades
/// that source to no fixtures.
pub struct FixtureFetcher {
    sources: Vec<Arc<dyn FixtureSource>>,
    lookahead_days: i64,
    max_matches: usize,
}

impl FixtureFetcher {
    pub fn new(sources: Vec<Arc<dyn FixtureSource>>, lookahead_days: i64, max_matches: usize) -> Self {
        FixtureFetcher {
            sources,
            lookahead_days,
            max_matches,
        }
    }

    pub fn window(&self, now: NaiveDateTime) -> FixtureWindow {
        FixtureWindow::new(now, self.lookahead_days, self.max_matches)
    }

    pub async fn fetch(&self, sport: SportType, now: NaiveDateTime) -> Vec<Match> {
        let window = self.window(now);
        let mut collected: Vec<Match> = Vec::new();
        for source in self.sources.iter().filter(|s| s.sport() == sport) {
            if collected.len() >= window.max_matches {
                break;
            }
            match source.fetch_fixtures(&window).await {
                Ok(found) => {
                    debug!("{} returned {} fixtures", source.name(), found.len());
                    collected.extend(found);
                }
                Err(e) => warn!("{} fixture fetch failed: {}", source.name(), e),
            }
        }
        collected.truncate(window.max_matches);
        info!("Fetched {} upcoming {} fixtures", collected.len(), sport);
        collected
    }

    /// Fetch every sport concurrently, cricket first in the returned list.
    pub async fn fetch_all(&self, now: NaiveDateTime) -> Vec<Match> {
        let per_sport = join_all(SportType::ALL.iter().map(|sport| self.fetch(*sport, now))).await;
        per_sport.into_iter().flatten().collect()
    }
}
