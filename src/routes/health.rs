use actix_web::{get, web, HttpResponse, Responder};
use chrono::Utc;
use serde_json::json;

use crate::db::DocumentStore;

/// Liveness text the frontend and uptime checks look for.
#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("AirCNC Server is running..")
}

/// Health check endpoint
///
/// Pings the document store and reports the result with a timestamp.
/// Answers `503` while the database is unreachable.
#[get("/health")]
pub async fn health(store: web::Data<dyn DocumentStore>) -> impl Responder {
    match store.ping().await {
        Ok(()) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "database": "up",
            "timestamp": Utc::now()
        })),
        Err(e) => {
            log::error!("health check ping failed: {}", e);
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "degraded",
                "database": "down",
                "timestamp": Utc::now()
            }))
        }
    }
}
