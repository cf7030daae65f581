use crate::{
    auth::AccessGuard,
    error::AppError,
    payments::{PaymentIntentAdapter, PaymentIntentRequest, PaymentIntentResponse},
};
use actix_web::{post, web, HttpResponse, Responder};

/// Mints a card PaymentIntent for `price` (in dollars) and returns its client
/// secret for the checkout form.
///
/// ## Responses:
/// - `200 OK`: `{clientSecret}`.
/// - `400 Bad Request`: `price` missing or below one dollar.
/// - `401 Unauthorized`: Missing or invalid token.
/// - `502 Bad Gateway`: The payment processor rejected the request.
#[post("/create-payment-intent", wrap = "AccessGuard")]
pub async fn create_payment_intent(
    payments: web::Data<PaymentIntentAdapter>,
    request: web::Json<PaymentIntentRequest>,
) -> Result<impl Responder, AppError> {
    let client_secret = payments.create_intent(request.price).await?;
    Ok(HttpResponse::Ok().json(PaymentIntentResponse { client_secret }))
}
