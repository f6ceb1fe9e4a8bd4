mod common;

use chrono::NaiveDate;

use fantasyiq_engine::engine::fixtures::FixtureWindow;
use fantasyiq_engine::engine::roster::{players_from_lineup, RosterRequest};
use fantasyiq_engine::error::FeedError;
use fantasyiq_engine::feeds::cricapi::normalize_cricscore;
use fantasyiq_engine::feeds::gemini::normalize_completion;
use fantasyiq_engine::feeds::sportmonks::normalize_cricket_lineup;
use fantasyiq_engine::feeds::sportsdb::normalize_events;
use fantasyiq_engine::models::fixture::{EndTime, SportType};
use fantasyiq_engine::models::player::Role;

use common::{at, load_sample};

fn window() -> FixtureWindow {
    FixtureWindow::new(at(2025, 3, 1, 0, 0), 7, 6)
}

#[test]
fn cricscore_keeps_only_unstarted_fixtures_in_window() {
    let matches = normalize_cricscore(&load_sample("cricscore.json"), &window()).expect("parses");

    let ids: Vec<&str> = matches.iter().map(|m| m.match_id.as_str()).collect();
    assert_eq!(ids, vec!["c1a7b0e2-0001", "c1a7b0e2-0003"]);

    let odi = &matches[0];
    assert_eq!(odi.name, "India vs Australia");
    assert_eq!(odi.teams, vec!["India".to_string(), "Australia".to_string()]);
    assert_eq!(odi.match_type, "ODI");
    assert_eq!(odi.league, "Australia tour of India");
    assert_eq!(odi.venue, "TBD");
    assert_eq!(odi.sport_type, SportType::Cricket);
    // 08:00 GMT is 13:30 IST, and an ODI runs eight hours.
    assert_eq!(odi.match_start_time, at(2025, 3, 2, 13, 30));
    assert_eq!(odi.match_end_time, Some(EndTime::At(at(2025, 3, 2, 21, 30))));
    assert_eq!(odi.date, "2025-03-02");

    let t20 = &matches[1];
    assert_eq!(t20.name, "Mumbai Indians vs Chennai Super Kings");
    assert_eq!(t20.match_end_time, Some(EndTime::At(at(2025, 3, 4, 23, 0))));
}

#[test]
fn cricscore_respects_the_cap() {
    let window = FixtureWindow::new(at(2025, 3, 1, 0, 0), 7, 1);
    let matches = normalize_cricscore(&load_sample("cricscore.json"), &window).expect("parses");
    assert_eq!(matches.len(), 1);
}

#[test]
fn cricscore_without_data_is_an_error() {
    let err = normalize_cricscore(r#"{"status":"failure","reason":"Invalid API Key"}"#, &window());
    assert!(matches!(err, Err(FeedError::MissingField("data"))));
}

#[test]
fn sportsdb_events_map_to_football_matches() {
    let matches = normalize_events(&load_sample("sportsdb_events.json"), &window(), 6).expect("parses");
    assert_eq!(matches.len(), 2);

    let first = &matches[0];
    assert_eq!(first.match_id, "2070001");
    assert_eq!(first.name, "Arsenal vs Chelsea");
    assert_eq!(first.round, "28");
    assert_eq!(first.season, "2024-2025");
    assert_eq!(first.venue, "Emirates Stadium");
    assert_eq!(first.match_start_time, at(2025, 3, 2, 22, 0));
    assert_eq!(first.match_end_time, Some(EndTime::At(at(2025, 3, 3, 0, 0))));

    // Missing kickoff defaults to 15:00 GMT, a numeric id is kept as text.
    let second = &matches[1];
    assert_eq!(second.match_id, "2070002");
    assert_eq!(second.match_start_time, at(2025, 3, 3, 20, 30));
    assert_eq!(second.venue, "TBD");
}

#[test]
fn sportsdb_limit_and_null_events() {
    let one = normalize_events(&load_sample("sportsdb_events.json"), &window(), 1).expect("parses");
    assert_eq!(one.len(), 1);
    assert!(matches!(
        normalize_events(r#"{"events": null}"#, &window(), 6),
        Err(FeedError::MissingField("events"))
    ));
}

#[test]
fn sportmonks_cricket_lineup_builds_a_full_roster() {
    let lineup = normalize_cricket_lineup(&load_sample("sportmonks_cricket_lineup.json"))
        .expect("parses")
        .expect("has players");
    assert_eq!(lineup.entries.len(), 22);
    assert_eq!(lineup.entries[0].side, Some(0));
    assert_eq!(lineup.entries[11].side, Some(1));
    assert_eq!(lineup.entries[0].nationality, "India");

    let request = RosterRequest {
        match_id: "55001".into(),
        team1: "India".into(),
        team2: "Australia".into(),
        sport: SportType::Cricket,
        match_date: None,
        now: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap().and_hms_opt(9, 0, 0).unwrap(),
    };
    let players = players_from_lineup(&request, &lineup).expect("both sides complete");
    assert_eq!(players.len(), 22);
    assert_eq!(players[0].player_id, "1000");
    assert_eq!(players[11].player_id, "1000_T1");
    assert_eq!(players[11].original_player_id, "1000");
    assert_eq!(players[11].team, "Australia");
    assert_eq!(players[4].role, Role::WicketKeeper);
    assert_eq!(players[5].role, Role::AllRounder);
    assert_eq!(players[10].role, Role::Bowler);
}

#[test]
fn sportmonks_lineup_without_players_is_none() {
    let body = r#"{"data": {"id": 1, "lineup": [{"id": 5, "team_id": 10}]}}"#;
    assert_eq!(normalize_cricket_lineup(body).expect("parses"), None);
}

#[test]
fn gemini_parts_are_concatenated() {
    let text = normalize_completion(&load_sample("gemini_completion.json")).expect("parses");
    assert_eq!(
        text,
        "India|Rohit Sharma|Batsman\nIndia|Virat Kohli|Batsman\nAustralia|Pat Cummins|Bowler\n"
    );
    assert!(normalize_completion(r#"{"candidates": []}"#).is_err());
}
