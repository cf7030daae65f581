use crate::{
    db::{Collection, DocumentStore, Filter},
    error::AppError,
    models::UserInput,
};
use actix_web::{get, put, web, HttpResponse, Responder};
use validator::{validate_email, Validate};

/// Saves a user on sign-in.
///
/// Upserts the document keyed by the path email with the body's fields, so
/// repeated sign-ins update one document instead of piling up duplicates.
///
/// ## Responses:
/// - `200 OK`: `{acknowledged, matchedCount, modifiedCount, upsertedCount, upsertedId}`.
/// - `400 Bad Request`: Invalid email or body.
#[put("/users/{email}")]
pub async fn save_user(
    store: web::Data<dyn DocumentStore>,
    email: web::Path<String>,
    user: web::Json<UserInput>,
) -> Result<impl Responder, AppError> {
    let email = email.into_inner();
    if !validate_email(&email) {
        return Err(AppError::ValidationError(format!("Invalid email: {}", email)));
    }
    user.validate()?;

    let update = user.into_inner().into_update(&email)?;
    let result = store
        .update_one(Collection::Users, Filter::eq("email", email), update, true)
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Returns the stored user for `email`, or `null` when there is none.
#[get("/users/{email}")]
pub async fn get_user(
    store: web::Data<dyn DocumentStore>,
    email: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let user = store
        .find_one(Collection::Users, Filter::eq("email", email.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(user))
}
