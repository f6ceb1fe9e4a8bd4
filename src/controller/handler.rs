use crate::models::response::{
    JoinContestRequest, Response, RosterRequestBody, SaveTeamRequest, SportQuery,
};
use crate::service::admin::{cleanup_service, sync_service};
use crate::service::contest::{
    contest_detail_service, contest_players_service, contest_roster_service, join_contest_service,
    joined_contests_service, list_contests_service, list_matches_service,
};
use crate::service::team::save_team_service;
use crate::AppState;
use actix_web::web::{Data, Json, Path, Query};
use actix_web::{get, post, web, HttpResponse, Responder, Result};

#[get("/health")]
pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(Response::success("Everything is working as expected"))
}

pub async fn not_found() -> Result<HttpResponse> {
    Ok(HttpResponse::NotFound().json(Response::failed("Resource not found")))
}

#[get("/matches")]
async fn list_matches_handler(data: Data<AppState>, query: Query<SportQuery>) -> impl Responder {
    list_matches_service(data, query).await
}

#[get("/contests")]
async fn list_contests_handler(data: Data<AppState>, query: Query<SportQuery>) -> impl Responder {
    list_contests_service(data, query).await
}

#[get("/contests/{contest_id}")]
async fn contest_detail_handler(data: Data<AppState>, contest_id: Path<String>) -> impl Responder {
    contest_detail_service(data, contest_id).await
}

#[get("/contests/{contest_id}/players")]
async fn contest_players_handler(data: Data<AppState>, contest_id: Path<String>) -> impl Responder {
    contest_players_service(data, contest_id).await
}

#[post("/contests/{contest_id}/roster")]
async fn contest_roster_handler(
    data: Data<AppState>,
    contest_id: Path<String>,
    body: Json<RosterRequestBody>,
) -> impl Responder {
    contest_roster_service(data, contest_id, body).await
}

#[post("/contests/{contest_id}/join")]
async fn join_contest_handler(
    data: Data<AppState>,
    contest_id: Path<String>,
    body: Json<JoinContestRequest>,
) -> impl Responder {
    join_contest_service(data, contest_id, body).await
}

#[post("/teams")]
async fn save_team_handler(data: Data<AppState>, body: Json<SaveTeamRequest>) -> impl Responder {
    save_team_service(data, body).await
}

#[get("/users/{username}/joined")]
async fn joined_contests_handler(data: Data<AppState>, username: Path<String>) -> impl Responder {
    joined_contests_service(data, username).await
}

#[post("/admin/sync")]
async fn sync_handler(data: Data<AppState>) -> impl Responder {
    sync_service(data).await
}

#[post("/admin/cleanup")]
async fn cleanup_handler(data: Data<AppState>) -> impl Responder {
    cleanup_service(data).await
}

pub fn config(conf: &mut web::ServiceConfig) {
    let scope = web::scope("/api/v1")
        .service(list_matches_handler)
        .service(list_contests_handler)
        .service(contest_detail_handler)
        .service(contest_players_handler)
        .service(contest_roster_handler)
        .service(join_contest_handler)
        .service(save_team_handler)
        .service(joined_contests_handler)
        .service(sync_handler)
        .service(cleanup_handler);

    conf.service(scope);
}
