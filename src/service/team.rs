use actix_web::web::{Data, Json};
use actix_web::{HttpResponse, Responder};
use validator::Validate;

use crate::engine::lifecycle::TeamSaved;
use crate::models::response::{Response, SaveTeamRequest};
use crate::service::contest::entry_error_response;
use crate::util::time::reference_now;
use crate::AppState;

pub async fn save_team_service(data: Data<AppState>, body: Json<SaveTeamRequest>) -> impl Responder {
    if let Err(e) = body.validate() {
        return HttpResponse::BadRequest().json(Response::failed(e.to_string()));
    }
    let body = body.into_inner();
    let saved = data
        .lifecycle
        .save_team(
            &body.username,
            &body.contest_id,
            body.selected_players,
            &body.captain_id,
            &body.vice_captain_id,
            reference_now(),
        )
        .await;
    match saved {
        Ok(TeamSaved::Created) => HttpResponse::Ok().json(Response::success("Team created successfully!")),
        Ok(TeamSaved::Updated) => HttpResponse::Ok().json(Response::success("Team updated successfully!")),
        Err(e) => entry_error_response(&e),
    }
}
