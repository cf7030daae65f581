use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};

use crate::auth::token::Claims;
use crate::error::AppError;

/// Extracts the decoded token claims from request extensions.
///
/// Only meaningful on resources wrapped in `AccessGuard`, which verifies the bearer
/// token and inserts the `Claims`. Without them the request is treated as
/// unauthenticated.
#[derive(Debug, Clone)]
pub struct AuthenticatedClaims(pub Claims);

impl FromRequest for AuthenticatedClaims {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Claims>().cloned() {
            Some(claims) => ready(Ok(AuthenticatedClaims(claims))),
            None => {
                log::warn!("{} reached a claims extractor without AccessGuard", req.path());
                ready(Err(AppError::unauthorized().into()))
            }
        }
    }
}
