use crate::{
    auth::{AccessGuard, AuthenticatedClaims},
    db::{Collection, DocumentId, DocumentStore, Filter},
    error::AppError,
    models::{RoomInput, StatusPatch},
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Lists every room, in insertion order.
#[get("/rooms")]
pub async fn list_rooms(store: web::Data<dyn DocumentStore>) -> Result<impl Responder, AppError> {
    let rooms = store.find(Collection::Rooms, Filter::All).await?;
    Ok(HttpResponse::Ok().json(rooms))
}

/// Creates a listing.
///
/// ## Responses:
/// - `200 OK`: `{acknowledged, insertedId}`.
/// - `400 Bad Request`: Missing or invalid `host.email`, negative `price`.
#[post("/rooms")]
pub async fn create_room(
    store: web::Data<dyn DocumentStore>,
    room: web::Json<RoomInput>,
) -> Result<impl Responder, AppError> {
    room.validate()?;

    let document = room.into_inner().into_new_document()?;
    let result = store.insert_one(Collection::Rooms, document).await?;
    log::info!("room {} created", result.inserted_id);

    Ok(HttpResponse::Ok().json(result))
}

/// Returns one room, or `null` when the id matches nothing.
#[get("/room/{id}")]
pub async fn get_room(
    store: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = DocumentId::parse(&id)?;
    let room = store.find_one(Collection::Rooms, Filter::Id(id)).await?;
    Ok(HttpResponse::Ok().json(room))
}

/// Lists the rooms hosted by `email`.
///
/// Requires a bearer token issued for that same email.
///
/// ## Responses:
/// - `200 OK`: JSON array of rooms.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `403 Forbidden`: The token belongs to a different email.
#[get("/rooms/{email}", wrap = "AccessGuard")]
pub async fn host_rooms(
    store: web::Data<dyn DocumentStore>,
    email: web::Path<String>,
    claims: AuthenticatedClaims,
) -> Result<impl Responder, AppError> {
    let email = email.into_inner();
    claims.0.ensure_email(&email)?;

    let rooms = store
        .find(Collection::Rooms, Filter::eq("host.email", email))
        .await?;
    Ok(HttpResponse::Ok().json(rooms))
}

/// Replaces a listing's fields, creating it under `id` if it does not exist.
#[put("/rooms/{id}", wrap = "AccessGuard")]
pub async fn update_room(
    store: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
    room: web::Json<RoomInput>,
) -> Result<impl Responder, AppError> {
    let id = DocumentId::parse(&id)?;
    room.validate()?;

    let update = room.into_inner().into_update()?;
    let result = store
        .update_one(Collection::Rooms, Filter::Id(id), update, true)
        .await?;
    log::debug!("room {} updated: {:?}", id, result);

    Ok(HttpResponse::Ok().json(result))
}

#[delete("/rooms/{id}")]
pub async fn delete_room(
    store: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = DocumentId::parse(&id)?;
    let result = store.delete_one(Collection::Rooms, Filter::Id(id)).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Sets only the `booked` flag of a room.
#[patch("/rooms/status/{id}")]
pub async fn set_room_status(
    store: web::Data<dyn DocumentStore>,
    id: web::Path<String>,
    patch: web::Json<StatusPatch>,
) -> Result<impl Responder, AppError> {
    let id = DocumentId::parse(&id)?;
    let result = store
        .update_one(
            Collection::Rooms,
            Filter::Id(id),
            patch.into_inner().into_update(),
            false,
        )
        .await?;
    Ok(HttpResponse::Ok().json(result))
}
