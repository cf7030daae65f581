use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::{Claims, TokenService};
use crate::error::AppError;

/// Gate for resources that require a bearer token.
///
/// Wrapped per resource (`#[put("/rooms/{id}", wrap = "AccessGuard")]`) rather than
/// per scope, since guarded and open routes share path prefixes. The verifying
/// `TokenService` is looked up from app data on every call.
pub struct AccessGuard;

impl<S, B> Transform<S, ServiceRequest> for AccessGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AccessGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AccessGuardService { service }))
    }
}

pub struct AccessGuardService<S> {
    service: S,
}

fn authenticate(req: &ServiceRequest) -> Result<Claims, AppError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::InternalServerError("TokenService is not registered".into()))?;

    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(AppError::unauthorized)?;

    tokens.verify(token.trim())
}

impl<S, B> Service<ServiceRequest> for AccessGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        match authenticate(&req) {
            Ok(claims) => {
                req.extensions_mut().insert(claims);
                let fut = self.service.call(req);
                Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
            }
            Err(app_err) => {
                log::debug!("{} {} rejected: {}", req.method(), req.path(), app_err);
                // Answer here instead of returning Err so the envelope is rendered
                // the same way regardless of what wraps this resource.
                let response = req.error_response(app_err).map_into_right_body();
                Box::pin(async move { Ok(response) })
            }
        }
    }
}
