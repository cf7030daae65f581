use crate::{
    auth::{TokenRequest, TokenResponse, TokenService},
    error::AppError,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Issue an access token
///
/// Called by the frontend right after it signs a user in with its identity
/// provider. The body must carry the user's `email`; everything else in it is
/// signed into the token as extra claims. Tokens expire after seven days.
#[post("/jwt")]
pub async fn issue_token(
    tokens: web::Data<TokenService>,
    request: web::Json<TokenRequest>,
) -> Result<impl Responder, AppError> {
    request.validate()?;

    let TokenRequest { email, extra } = request.into_inner();
    let token = tokens.issue(&email, extra)?;

    Ok(HttpResponse::Ok().json(TokenResponse { token }))
}
