use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use serde_json::json;

use crate::AppState;

pub async fn sync_service(data: Data<AppState>) -> impl Responder {
    let report = data.lifecycle.sync().await;
    if report.success {
        HttpResponse::Ok().json(json!({"status": "success", "report": report}))
    } else {
        HttpResponse::InternalServerError().json(json!({"status": "failed", "report": report}))
    }
}

pub async fn cleanup_service(data: Data<AppState>) -> impl Responder {
    let report = data.lifecycle.cleanup().await;
    HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Cleanup triggered successfully",
        "report": report,
    }))
}
