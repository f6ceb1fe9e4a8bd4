use actix_web::web::{Data, Json, Path, Query};
use actix_web::{HttpResponse, Responder};
use log::error;
use serde_json::json;
use validator::Validate;

use crate::error::EntryError;
use crate::models::fixture::SportType;
use crate::models::response::{JoinContestRequest, Response, RosterRequestBody, SportQuery};
use crate::util::time::reference_now;
use crate::AppState;

const ALL_CONTESTS_LIMIT: i64 = 50;
const SPORT_CONTESTS_LIMIT: i64 = 20;
const MATCHES_LIMIT: i64 = 10;

/// `None` for "all"/absent, `Err` for an unknown sport.
fn sport_filter(query: &SportQuery) -> Result<Option<SportType>, HttpResponse> {
    match query.sport.as_deref().map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(raw) => raw
            .parse::<SportType>()
            .map(Some)
            .map_err(|e| HttpResponse::BadRequest().json(Response::failed(e))),
    }
}

pub fn entry_error_response(e: &EntryError) -> HttpResponse {
    let body = Response::failed(e.to_string());
    match e {
        EntryError::ContestNotFound | EntryError::UserNotFound => HttpResponse::NotFound().json(body),
        EntryError::AlreadyJoined | EntryError::ContestFull => HttpResponse::Conflict().json(body),
        EntryError::MatchStarted
        | EntryError::TeamLocked
        | EntryError::InsufficientBalance { .. }
        | EntryError::InvalidTeam(_) => HttpResponse::BadRequest().json(body),
        EntryError::Store(store_error) => {
            error!("storage error while handling an entry: {}", store_error);
            HttpResponse::InternalServerError().json(Response::failed("An error occurred"))
        }
    }
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> HttpResponse {
    error!("An error occurred in {}. The error: {}", context, e);
    HttpResponse::InternalServerError().json(Response::failed("An error occurred"))
}

pub async fn list_matches_service(data: Data<AppState>, query: Query<SportQuery>) -> impl Responder {
    let sport = match sport_filter(&query) {
        Ok(sport) => sport.unwrap_or(SportType::Cricket),
        Err(response) => return response,
    };
    match data
        .lifecycle
        .store()
        .matches_by_sport(sport, MATCHES_LIMIT)
        .await
    {
        Ok(matches) => HttpResponse::Ok().json(json!({
            "status": "success",
            "count": matches.len(),
            "matches": matches,
        })),
        Err(e) => internal_error("list_matches_service", e),
    }
}

pub async fn list_contests_service(data: Data<AppState>, query: Query<SportQuery>) -> impl Responder {
    let sport = match sport_filter(&query) {
        Ok(sport) => sport,
        Err(response) => return response,
    };
    let limit = if sport.is_some() {
        SPORT_CONTESTS_LIMIT
    } else {
        ALL_CONTESTS_LIMIT
    };
    match data.lifecycle.store().open_contests(sport, limit).await {
        Ok(contests) => HttpResponse::Ok().json(json!({
            "status": "success",
            "count": contests.len(),
            "sport": sport.map_or("all", |s| s.as_str()),
            "contests": contests,
        })),
        Err(e) => internal_error("list_contests_service", e),
    }
}

pub async fn contest_detail_service(data: Data<AppState>, contest_id: Path<String>) -> impl Responder {
    match data.lifecycle.store().find_contest(&contest_id).await {
        Ok(Some(contest)) => HttpResponse::Ok().json(json!({
            "status": "success",
            "contest": contest,
        })),
        Ok(None) => HttpResponse::NotFound().json(Response::failed("Contest not found")),
        Err(e) => internal_error("contest_detail_service", e),
    }
}

/// Stored players only; rosters are produced when a user joins.
pub async fn contest_players_service(data: Data<AppState>, contest_id: Path<String>) -> impl Responder {
    let store = data.lifecycle.store();
    let contest = match store.find_contest(&contest_id).await {
        Ok(Some(contest)) => contest,
        Ok(None) => return HttpResponse::NotFound().json(Response::failed("Contest not found")),
        Err(e) => return internal_error("contest_players_service", e),
    };
    match store.players_for_match(&contest_id).await {
        Ok(players) if players.is_empty() => HttpResponse::NotFound().json(Response::failed(
            "Players not available yet. Please try joining the contest again.",
        )),
        Ok(players) => HttpResponse::Ok().json(json!({
            "status": "success",
            "players": players,
            "contest": contest,
        })),
        Err(e) => internal_error("contest_players_service", e),
    }
}

pub async fn contest_roster_service(
    data: Data<AppState>,
    contest_id: Path<String>,
    body: Json<RosterRequestBody>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(Response::failed(e.to_string()));
    }
    if data.lifecycle.match_context(&contest_id).await.is_none() {
        return HttpResponse::NotFound().json(Response::failed("Contest not found"));
    }
    let roster = data
        .lifecycle
        .get_roster(&contest_id, &body.team1, &body.team2)
        .await;
    HttpResponse::Ok().json(json!({
        "status": "success",
        "source": roster.source,
        "count": roster.players.len(),
        "players": roster.players,
    }))
}

pub async fn join_contest_service(
    data: Data<AppState>,
    contest_id: Path<String>,
    body: Json<JoinContestRequest>,
) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(Response::failed(e.to_string()));
    }
    match data
        .lifecycle
        .join_contest(&body.username, &contest_id, reference_now())
        .await
    {
        Ok(receipt) => HttpResponse::Ok().json(json!({
            "status": "success",
            "message": "Payment successful",
            "new_balance": receipt.new_balance,
            "roster_size": receipt.roster_size,
            "entry": receipt.entry,
        })),
        Err(e) => entry_error_response(&e),
    }
}

pub async fn joined_contests_service(data: Data<AppState>, username: Path<String>) -> impl Responder {
    match data.lifecycle.joined_history(&username).await {
        Ok(history) => HttpResponse::Ok().json(json!({
            "status": "success",
            "contests": history.contests,
            "stats": history.stats,
        })),
        Err(e) => internal_error("joined_contests_service", e),
    }
}
